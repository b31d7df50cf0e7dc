//! Integration tests for `#[derive(Describe)]`.

use hestia_core::{Describe, Shape};
use hestia_macros::Describe;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize, Deserialize, Describe)]
#[describe(crate = "hestia_core")]
struct CreatePost {
    title: String,
    #[serde(rename = "body")]
    content: String,
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Describe)]
#[describe(crate = "hestia_core")]
#[serde(rename_all = "camelCase")]
struct Pagination {
    page_number: u32,
    #[serde(default)]
    page_size: u32,
    #[describe(rename = "q")]
    search_query: Option<String>,
    #[serde(skip)]
    #[allow(dead_code)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize, Describe)]
#[describe(crate = "hestia_core")]
#[serde(rename_all = "lowercase")]
enum Status {
    Draft,
    Published,
}

#[derive(Debug, Deserialize, Describe)]
#[describe(crate = "hestia_core")]
struct PostId(u64);

#[derive(Debug, Deserialize, Describe)]
#[describe(crate = "hestia_core")]
struct Article {
    status: Status,
    id: PostId,
    #[serde(flatten)]
    meta: Meta,
    author: Author,
}

#[derive(Debug, Deserialize, Describe)]
#[describe(crate = "hestia_core")]
struct Meta {
    created: String,
}

#[derive(Debug, Deserialize, Describe)]
#[describe(crate = "hestia_core")]
struct Author {
    name: String,
    #[describe(optional)]
    email: String,
}

#[derive(Debug, Serialize, Describe)]
#[describe(crate = "hestia_core")]
struct Page<T> {
    items: Vec<T>,
    total: u64,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
#[describe(crate = "hestia_core")]
#[serde(deny_unknown_fields, rename_all(serialize = "UPPERCASE"))]
struct Audit {
    #[serde(rename(serialize = "who"), alias = "user")]
    actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

#[test]
fn test_named_struct_fields_in_order() {
    let shape = CreatePost::shape();
    assert_eq!(shape.field_names(), vec!["title", "body", "tags"]);
    assert_eq!(
        shape.to_string(),
        "{ title: string; body: string; tags?: string[] }"
    );
}

#[test]
fn test_shape_validates_what_serde_accepts() {
    let value = json!({"title": "Hello", "body": "World"});
    assert!(CreatePost::shape().validate(&value).is_ok());

    let post: CreatePost = serde_json::from_value(value).unwrap();
    assert_eq!(post.content, "World");
    assert!(post.tags.is_none());
}

#[test]
fn test_rename_all_default_skip_and_describe_rename() {
    let shape = Pagination::shape();
    assert_eq!(shape.field_names(), vec!["pageNumber", "pageSize", "q"]);

    let object = shape.as_object().unwrap();
    assert!(!object.get("pageNumber").unwrap().is_optional());
    assert!(object.get("pageSize").unwrap().is_optional());
    assert!(object.get("q").unwrap().is_optional());
}

#[test]
fn test_unit_enum_and_newtype() {
    assert_eq!(Status::shape(), Shape::String);
    assert_eq!(PostId::shape(), Shape::Integer);
}

#[test]
fn test_nested_and_flattened_fields() {
    let shape = Article::shape();
    assert_eq!(shape.field_names(), vec!["status", "id", "created", "author"]);
    assert_eq!(
        serde_json::to_value(&shape).unwrap(),
        json!({
            "status": "string",
            "id": "integer",
            "created": "string",
            "author": {"name": "string", "email?": "string"},
        })
    );
}

#[test]
fn test_generic_struct() {
    assert_eq!(
        Page::<CreatePost>::shape()
            .as_object()
            .unwrap()
            .get("items")
            .unwrap()
            .shape(),
        &Shape::array(CreatePost::shape())
    );
    assert_eq!(Page::<u8>::shape().to_string(), "{ items: integer[]; total: integer }");
}

#[test]
fn test_parenthesized_serde_attributes_are_skipped() {
    let shape = Audit::shape();
    assert_eq!(shape.field_names(), vec!["actor", "note"]);
    assert!(shape.as_object().unwrap().get("note").unwrap().is_optional());

    let audit: Audit = serde_json::from_value(json!({"user": "ada"})).unwrap();
    assert_eq!(audit.actor, "ada");
    assert!(shape.validate(&json!({"actor": "ada"})).is_ok());
}
