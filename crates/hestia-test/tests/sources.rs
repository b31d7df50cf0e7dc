//! Every input source driven through the test client.

use hestia::prelude::*;
use hestia_test::TestClient;
use serde_json::json;

#[derive(Deserialize, Describe)]
struct Login {
    user: String,
    remember: Option<bool>,
}

fn app() -> App {
    let mut app = App::new();

    app.post("/login")
        .input_typed::<Login>(InputSource::Form)
        .input(InputContract::header(
            Shape::object().field("x-api-key", Shape::string()),
        ))
        .handler(|ctx: Context| async move {
            let login: Login = ctx.validated_data()?.deserialize_source(InputSource::Form)?;
            Ok(ctx.json(json!({
                "user": login.user,
                "remember": login.remember.unwrap_or(false),
            })))
        })
        .unwrap();

    app.get("/me")
        .input(InputContract::cookie(
            Shape::object().field("session", Shape::string()),
        ))
        .handler(|ctx: Context| async move {
            let session = ctx.validated_data()?.get("session").cloned();
            Ok(ctx.json(json!({ "session": session })))
        })
        .unwrap();

    app.get("/whoami")
        .input(InputContract::header(
            Shape::object().field("X-User-Id", Shape::integer()),
        ))
        .handler(|ctx: Context| async move {
            let id = ctx.validated_data()?.get("x-user-id").cloned();
            Ok(ctx.json(json!({ "id": id })))
        })
        .unwrap();

    app
}

#[tokio::test]
async fn test_form_and_header_sources() {
    let client = TestClient::new(app());

    client
        .post("/login")
        .header("X-Api-Key", "k1")
        .form(&[("user", "ada"), ("remember", "true")])
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"user": "ada", "remember": true}));
}

#[tokio::test]
async fn test_missing_header_is_rejected() {
    let client = TestClient::new(app());

    let response = client
        .post("/login")
        .form(&[("user", "ada")])
        .send()
        .await;

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("VALIDATION_ERROR");
    let body = response.json_value().unwrap();
    assert_eq!(body["error"]["details"]["source"], "header");
}

#[tokio::test]
async fn test_json_body_where_form_is_declared() {
    let client = TestClient::new(app());

    let response = client
        .post("/login")
        .header("x-api-key", "k1")
        .json(&json!({"user": "ada"}))
        .send()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json_value().unwrap();
    assert_eq!(body["error"]["details"]["source"], "form");
}

#[tokio::test]
async fn test_cookie_source() {
    let client = TestClient::new(app());

    client
        .get("/me")
        .cookie("session", "abc123")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"session": "abc123"}));

    client
        .get("/me")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route() {
    let client = TestClient::new(app());

    client
        .delete("/login")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_code("NOT_FOUND");
}

#[tokio::test]
async fn test_header_contract_names_ignore_case() {
    let client = TestClient::new(app());

    client
        .get("/whoami")
        .header("x-USER-id", "7")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"id": 7}));

    let manifest = client.app().build();
    let input = serde_json::to_value(&manifest.get("get", "/whoami").unwrap().input).unwrap();
    assert_eq!(input, json!({"header": {"x-user-id": "integer"}}));
}
