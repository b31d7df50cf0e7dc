//! Per-source decoding.
//!
//! Every source decodes to a JSON object so that one [`Shape`] machinery can
//! validate all of them:
//!
//! | Source | Decoded from | Repeated names |
//! |--------|--------------|----------------|
//! | `param` | matched path parameters | n/a |
//! | `query` | URL query string | array of strings |
//! | `form` | `application/x-www-form-urlencoded` body | array of strings |
//! | `json` | `application/json` body, must be an object | n/a |
//! | `header` | headers, lowercase names | array of strings |
//! | `cookie` | `cookie` headers | last wins |
//!
//! [`Shape`]: hestia_core::Shape

use hestia_core::{InputSource, ValidationError};
use http::header;
use serde_json::{Map, Value};

use crate::raw::RawRequest;

/// Decodes one source of `request` into a JSON object.
///
/// # Errors
///
/// Returns a [`ValidationError`] rooted at `$` when a body source is larger
/// than `max_body_bytes`, has the wrong content type, or is malformed.
pub fn decode(
    source: InputSource,
    request: &RawRequest,
    max_body_bytes: usize,
) -> Result<Map<String, Value>, ValidationError> {
    match source {
        InputSource::Param => Ok(request
            .params()
            .iter()
            .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
            .collect()),
        InputSource::Query => Ok(request
            .query_string()
            .map(|q| decode_pairs(source, q))
            .transpose()?
            .unwrap_or_default()),
        InputSource::Form => {
            check_body(source, request, max_body_bytes, is_form)?;
            let body = std::str::from_utf8(request.body()).map_err(|e| {
                ValidationError::decode(source, format!("invalid UTF-8: {e}"))
            })?;
            decode_pairs(source, body)
        }
        InputSource::Json => {
            check_body(source, request, max_body_bytes, is_json)?;
            if request.body().is_empty() {
                return Err(ValidationError::decode(source, "empty request body"));
            }
            match serde_json::from_slice::<Value>(request.body()) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(other) => Err(ValidationError::decode(
                    source,
                    format!("expected object, got {}", json_type(&other)),
                )),
                Err(e) => Err(ValidationError::decode(source, format!("malformed JSON: {e}"))),
            }
        }
        InputSource::Header => {
            let mut map = Map::new();
            for (name, value) in request.headers() {
                if let Ok(value) = value.to_str() {
                    insert_repeated(&mut map, name.as_str(), value);
                }
            }
            Ok(map)
        }
        InputSource::Cookie => Ok(decode_cookies(request)),
    }
}

fn decode_pairs(source: InputSource, input: &str) -> Result<Map<String, Value>, ValidationError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(input)
        .map_err(|e| ValidationError::decode(source, format!("malformed {source}: {e}")))?;

    let mut map = Map::new();
    for (name, value) in &pairs {
        insert_repeated(&mut map, name, value);
    }
    Ok(map)
}

fn insert_repeated(map: &mut Map<String, Value>, name: &str, value: &str) {
    let value = Value::String(value.to_string());
    match map.get_mut(name) {
        None => {
            map.insert(name.to_string(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

fn decode_cookies(request: &RawRequest) -> Map<String, Value> {
    let mut map = Map::new();
    for header_value in request.headers().get_all(header::COOKIE) {
        let Ok(header_value) = header_value.to_str() else {
            continue;
        };
        for cookie in header_value.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let value = value.trim().trim_matches('"');
                map.insert(name.to_string(), Value::String(value.to_string()));
            }
        }
    }
    map
}

fn check_body(
    source: InputSource,
    request: &RawRequest,
    max_body_bytes: usize,
    accepts: fn(&mime::Mime) -> bool,
) -> Result<(), ValidationError> {
    let content_type = request
        .content_type()
        .and_then(|ct| ct.parse::<mime::Mime>().ok());

    match content_type {
        Some(ref mime) if accepts(mime) => {}
        Some(mime) => {
            return Err(ValidationError::decode(
                source,
                format!("unsupported content type '{}'", mime.essence_str()),
            ));
        }
        None => {
            return Err(ValidationError::decode(source, "missing content type"));
        }
    }

    let len = request.body().len();
    if len > max_body_bytes {
        return Err(ValidationError::decode(
            source,
            format!("body of {len} bytes exceeds the {max_body_bytes} byte limit"),
        ));
    }
    Ok(())
}

fn is_json(mime: &mime::Mime) -> bool {
    mime.type_() == mime::APPLICATION
        && (mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON))
}

fn is_form(mime: &mime::Mime) -> bool {
    mime.type_() == mime::APPLICATION && mime.subtype() == mime::WWW_FORM_URLENCODED
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
