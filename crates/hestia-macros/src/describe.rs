//! `#[derive(Describe)]` expansion.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{ext::IdentExt, parse_quote, Data, DataEnum, DeriveInput, Fields, Path};

use crate::attrs::{ContainerAttrs, MemberAttrs};

/// Expands `#[derive(Describe)]`.
///
/// | Input | Shape |
/// |-------|-------|
/// | struct with named fields | object, one field per member |
/// | newtype struct | the inner type's shape |
/// | unit struct | null |
/// | enum with only unit variants | string |
pub fn expand_describe(input: DeriveInput) -> syn::Result<TokenStream> {
    let container = ContainerAttrs::parse(&input.attrs)?;
    let krate = &container.crate_path;

    let body = match &input.data {
        Data::Struct(data) => struct_body(&data.fields, &container)?,
        Data::Enum(data) => enum_body(data, krate)?,
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span,
                "Describe cannot be derived for unions",
            ))
        }
    };

    let name = &input.ident;
    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(#krate::Describe));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::Describe for #name #ty_generics #where_clause {
            fn shape() -> #krate::Shape {
                #body
            }
        }
    })
}

fn struct_body(fields: &Fields, container: &ContainerAttrs) -> syn::Result<TokenStream> {
    let krate = &container.crate_path;

    match fields {
        Fields::Named(named) => {
            let mut steps = Vec::with_capacity(named.named.len());

            for field in &named.named {
                let attrs = MemberAttrs::parse(&field.attrs)?;
                if attrs.skip {
                    continue;
                }
                let ty = &field.ty;

                if attrs.flatten {
                    steps.push(quote! {
                        let shape = shape.merge(&<#ty as #krate::Describe>::shape());
                    });
                    continue;
                }

                let key = match (attrs.rename, field.ident.as_ref()) {
                    (Some(rename), _) => rename,
                    (None, Some(ident)) => {
                        let raw = ident.unraw().to_string();
                        match container.rename_all {
                            Some(rule) => rule.apply_to_field(&raw),
                            None => raw,
                        }
                    }
                    (None, None) => continue,
                };
                steps.push(if attrs.optional {
                    quote! {
                        let shape = shape.optional(#key, <#ty as #krate::Describe>::shape());
                    }
                } else {
                    quote! {
                        let shape = if <#ty as #krate::Describe>::optional() {
                            shape.optional(#key, <#ty as #krate::Describe>::shape())
                        } else {
                            shape.field(#key, <#ty as #krate::Describe>::shape())
                        };
                    }
                });
            }

            Ok(quote! {
                let shape = #krate::Shape::object();
                #(#steps)*
                shape
            })
        }
        Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
            let ty = &unnamed.unnamed[0].ty;
            Ok(quote! { <#ty as #krate::Describe>::shape() })
        }
        Fields::Unnamed(unnamed) => Err(syn::Error::new_spanned(
            unnamed,
            "Describe can only be derived for tuple structs with exactly one field",
        )),
        Fields::Unit => Ok(quote! { #krate::Shape::Null }),
    }
}

fn enum_body(data: &DataEnum, krate: &Path) -> syn::Result<TokenStream> {
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Describe can only be derived for enums whose variants are all unit variants",
            ));
        }
    }
    Ok(quote! { #krate::Shape::String })
}
