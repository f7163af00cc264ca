mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{data, error_code, TestApp};

fn anisur() -> serde_json::Value {
    json!({
        "userName": "anisur",
        "email": "anisur@example.com",
        "phone": "01700000000",
        "role": "student",
        "bio": { "address": "Dhaka", "phone": "01700000000", "postalCode": 1207 }
    })
}

#[tokio::test]
async fn register_and_fetch_user() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.post("/user", anisur()).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, body) = app.get("/user/anisur").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)["email"], "anisur@example.com");
    assert_eq!(data(&body)["role"], "student");
    Ok(())
}

#[tokio::test]
async fn registration_enforces_unique_fields() -> Result<()> {
    let app = TestApp::new();
    app.post("/user", anisur()).await?;

    let cases = [
        json!({ "userName": "anisur", "email": "new@example.com", "phone": "1" }),
        json!({ "userName": "other", "email": "anisur@example.com", "phone": "2" }),
        json!({ "userName": "other", "email": "other@example.com", "phone": "01700000000" }),
    ];
    for case in cases {
        let (status, body) = app.post("/user", case.clone()).await?;
        assert_eq!(status, StatusCode::CONFLICT, "{} -> {}", case, body);
        assert_eq!(error_code(&body), "CONFLICT");
    }
    Ok(())
}

#[tokio::test]
async fn registration_requires_user_name() -> Result<()> {
    let app = TestApp::new();
    let (status, _) = app.post("/user", json!({ "email": "x@example.com" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn update_merges_nested_bio() -> Result<()> {
    let app = TestApp::new();
    app.post("/user", anisur()).await?;

    let (status, body) = app
        .put(
            "/user/anisur",
            json!({ "role": "moderator", "bio": { "address": "Chattogram" } }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let user = data(&body);
    assert_eq!(user["role"], "moderator");
    assert_eq!(user["email"], "anisur@example.com");
    assert_eq!(user["bio"]["address"], "Chattogram");
    assert_eq!(user["bio"]["postalCode"], 1207);
    Ok(())
}

#[tokio::test]
async fn delete_user_then_missing() -> Result<()> {
    let app = TestApp::new();
    app.post("/user", anisur()).await?;

    let (status, _) = app.delete("/user/anisur").await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.delete("/user/anisur").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/user").await?;
    assert_eq!(data(&body), &json!([]));
    Ok(())
}

#[tokio::test]
async fn update_cannot_take_another_users_email_or_phone() -> Result<()> {
    let app = TestApp::new();
    app.post("/user", anisur()).await?;
    let (status, _) = app
        .post(
            "/user",
            json!({ "userName": "rahim", "email": "rahim@example.com", "phone": "01800000000" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    for change in [
        json!({ "email": "anisur@example.com" }),
        json!({ "phone": "01700000000" }),
    ] {
        let (status, body) = app.put("/user/rahim", change.clone()).await?;
        assert_eq!(status, StatusCode::CONFLICT, "{} -> {}", change, body);
        assert_eq!(error_code(&body), "CONFLICT");
    }

    let (_, body) = app.get("/user/rahim").await?;
    assert_eq!(data(&body)["email"], "rahim@example.com");
    assert_eq!(data(&body)["phone"], "01800000000");

    // Resending your own values is not a collision
    let (status, body) = app
        .put(
            "/user/anisur",
            json!({ "email": "anisur@example.com", "phone": "01700000000", "role": "admin" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(data(&body)["role"], "admin");
    Ok(())
}
