//! Attribute parsing for `#[derive(Describe)]`.
//!
//! `#[describe(..)]` attributes are parsed strictly. `#[serde(..)]` attributes
//! are read for the handful of keys that change the wire shape and everything
//! else in them is skipped.

use syn::{
    meta::ParseNestedMeta, parse_quote, Attribute, Expr, LitStr, Path, Token,
};

/// Container-level options.
pub struct ContainerAttrs {
    /// Path to the crate exporting `Describe` and `Shape`.
    pub crate_path: Path,
    /// `rename_all` rule from serde or describe.
    pub rename_all: Option<RenameRule>,
}

impl ContainerAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut crate_path = None;
        let mut rename_all = None;

        for attr in attrs {
            if attr.path().is_ident("describe") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("crate") {
                        let lit: LitStr = meta.value()?.parse()?;
                        crate_path = Some(lit.parse::<Path>()?);
                        Ok(())
                    } else if meta.path.is_ident("rename_all") {
                        rename_all = Some(parse_rule(&meta)?);
                        Ok(())
                    } else {
                        Err(meta.error("unknown describe attribute"))
                    }
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename_all") && meta.input.peek(Token![=]) {
                        let rule = parse_rule(&meta)?;
                        rename_all.get_or_insert(rule);
                        Ok(())
                    } else {
                        skip_value(&meta)
                    }
                })?;
            }
        }

        Ok(Self {
            crate_path: crate_path.unwrap_or_else(|| parse_quote!(::hestia::__private)),
            rename_all,
        })
    }
}

/// Field-level options.
#[derive(Default)]
pub struct MemberAttrs {
    pub rename: Option<String>,
    pub optional: bool,
    pub skip: bool,
    pub flatten: bool,
}

impl MemberAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        let mut describe_rename = None;
        let mut serde_rename = None;

        for attr in attrs {
            if attr.path().is_ident("describe") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        let lit: LitStr = meta.value()?.parse()?;
                        describe_rename = Some(lit.value());
                    } else if meta.path.is_ident("optional") {
                        out.optional = true;
                    } else if meta.path.is_ident("skip") {
                        out.skip = true;
                    } else if meta.path.is_ident("flatten") {
                        out.flatten = true;
                    } else {
                        return Err(meta.error("unknown describe attribute"));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                        let lit: LitStr = meta.value()?.parse()?;
                        serde_rename = Some(lit.value());
                        Ok(())
                    } else if meta.path.is_ident("default") {
                        out.optional = true;
                        skip_value(&meta)
                    } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_deserializing") {
                        out.skip = true;
                        Ok(())
                    } else if meta.path.is_ident("flatten") {
                        out.flatten = true;
                        Ok(())
                    } else {
                        skip_value(&meta)
                    }
                })?;
            }
        }

        out.rename = describe_rename.or(serde_rename);
        Ok(out)
    }
}

/// Consumes `= value` or `(..)` after a nested meta key, if present.
fn skip_value(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_value(&nested))?;
    }
    Ok(())
}

fn parse_rule(meta: &ParseNestedMeta<'_>) -> syn::Result<RenameRule> {
    let lit: LitStr = meta.value()?.parse()?;
    RenameRule::from_str(&lit.value())
        .ok_or_else(|| syn::Error::new(lit.span(), "unsupported rename_all rule"))
}

/// Case conversion applied to field names.
#[derive(Clone, Copy)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn from_str(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            _ => return None,
        })
    }

    /// Renames a snake_case struct field.
    pub fn apply_to_field(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => pascal(field),
            Self::Camel => {
                let pascal = pascal(field);
                let mut chars = pascal.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_ascii_lowercase().to_string() + chars.as_str()
                })
            }
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}

fn pascal(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}
