// ABOUTME: Route-level integration tests driving the assembled axum router
// ABOUTME: Status codes, permissions, viewer flags and the export endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use axum::body::Body;
use axum::response::Response;
use http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn response_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn response_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Register a user over HTTP and return their JWT via login
async fn register_and_login(app: &axum::Router, email: &str, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            None,
            Some(json!({
                "email": email,
                "username": username,
                "first_name": "Test",
                "last_name": "User",
                "password": "correct horse battery",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": email, "password": "correct horse battery"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    body["jwt_token"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_register_login_me_flow() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);

    let token = register_and_login(&app, "cook@example.com", "cook").await;

    let response = app
        .clone()
        .oneshot(json_request("GET", "/api/users/me", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["email"], "cook@example.com");
    assert_eq!(body["username"], "cook");
    assert_eq!(body["is_subscribed"], false);

    // Without credentials the same endpoint rejects
    let response = app
        .oneshot(json_request("GET", "/api/users/me", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);

    register_and_login(&app, "cook@example.com", "cook").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "cook@example.com", "password": "wrong"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);

    register_and_login(&app, "cook@example.com", "cook").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/users",
            None,
            Some(json!({
                "email": "cook@example.com",
                "username": "othername",
                "first_name": "Test",
                "last_name": "User",
                "password": "pw",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_password_verifies_current() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);

    let token = register_and_login(&app, "cook@example.com", "cook").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users/set_password",
            Some(&token),
            Some(json!({"new_password": "new", "current_password": "bogus"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users/set_password",
            Some(&token),
            Some(json!({
                "new_password": "even more correct horse",
                "current_password": "correct horse battery",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The new password now logs in
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "cook@example.com", "password": "even more correct horse"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_recipe_crud_and_ownership() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);
    let (tags, ingredients) = common::seed_reference_data(&resources.database).await;

    let author_token = register_and_login(&app, "author@example.com", "author").await;
    let other_token = register_and_login(&app, "other@example.com", "other").await;

    let payload = json!({
        "name": "Pancakes",
        "text": "Whisk and fry.",
        "cooking_time": 15,
        "image": common::TEST_IMAGE,
        "tags": [tags[0].id],
        "ingredients": [
            {"id": ingredients[0].id, "amount": 200},
            {"id": ingredients[1].id, "amount": 50},
        ],
    });

    // Anonymous create is rejected before any write happens
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/recipes", None, Some(payload.clone())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            Some(&author_token),
            Some(payload),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let recipe_id = body["id"].as_str().unwrap().to_owned();
    assert_eq!(body["author"]["username"], "author");
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 2);
    assert_eq!(body["tags"][0]["slug"], "breakfast");

    // Anonymous read succeeds with both viewer flags false
    let response = app
        .clone()
        .oneshot(json_request(
            "GET",
            &format!("/api/recipes/{recipe_id}"),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["is_favorited"], false);
    assert_eq!(body["is_in_shopping_cart"], false);

    // A non-author cannot update
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/recipes/{recipe_id}"),
            Some(&other_token),
            Some(json!({
                "name": "Hijacked",
                "text": "x",
                "cooking_time": 1,
                "ingredients": [],
                "tags": [],
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A non-author cannot delete
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/recipes/{recipe_id}"),
            Some(&other_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The author updates; duplicate ingredient ids are rejected with 400
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/recipes/{recipe_id}"),
            Some(&author_token),
            Some(json!({
                "name": "Broken",
                "text": "x",
                "cooking_time": 5,
                "ingredients": [
                    {"id": ingredients[0].id, "amount": 1},
                    {"id": ingredients[0].id, "amount": 2},
                ],
                "tags": [],
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The author deletes
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/recipes/{recipe_id}"),
            Some(&author_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(json_request(
            "GET",
            &format!("/api/recipes/{recipe_id}"),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorite_toggle_status_codes() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);
    let (_, ingredients) = common::seed_reference_data(&resources.database).await;

    let token = register_and_login(&app, "cook@example.com", "cook").await;
    let user = resources
        .database
        .users()
        .get_by_email("cook@example.com")
        .await
        .unwrap()
        .unwrap();
    let recipe = resources
        .database
        .recipes()
        .create(
            user.id,
            &common::recipe_payload("Soup", &[(ingredients[0].id, 100)], &[]),
        )
        .await
        .unwrap();

    // First POST creates and returns the compact shape
    let uri = format!("/api/recipes/{}/favorite", recipe.id);
    let response = app
        .clone()
        .oneshot(json_request("POST", &uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["name"], "Soup");
    assert_eq!(body["cooking_time"], 15);
    assert!(body.get("text").is_none());

    // Second POST conflicts as a validation error
    let response = app
        .clone()
        .oneshot(json_request("POST", &uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // DELETE removes, a second DELETE is 404
    let response = app
        .clone()
        .oneshot(json_request("DELETE", &uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(json_request("DELETE", &uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Unknown recipe id is 404 for both verbs
    let uri = format!("/api/recipes/{}/favorite", uuid::Uuid::new_v4());
    let response = app
        .oneshot(json_request("POST", &uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subscribe_self_and_duplicates() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);

    let token = register_and_login(&app, "cook@example.com", "cook").await;
    register_and_login(&app, "author@example.com", "author").await;

    let me = resources
        .database
        .users()
        .get_by_email("cook@example.com")
        .await
        .unwrap()
        .unwrap();
    let author = resources
        .database
        .users()
        .get_by_email("author@example.com")
        .await
        .unwrap()
        .unwrap();

    // Self-follow always fails
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/users/{}/subscribe", me.id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Following an author succeeds and returns the enriched entry
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/users/{}/subscribe", author.id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["username"], "author");
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(body["recipes_count"], 0);

    // Duplicate follow fails
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/users/{}/subscribe", author.id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The subscription list carries the entry
    let response = app
        .clone()
        .oneshot(json_request(
            "GET",
            "/api/users/subscriptions",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Unsubscribe, then a second attempt is 404
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/users/{}/subscribe", author.id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/users/{}/subscribe", author.id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subscription_recipe_limit_caps_nested_list() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);
    let (_, ingredients) = common::seed_reference_data(&resources.database).await;

    let token = register_and_login(&app, "cook@example.com", "cook").await;
    register_and_login(&app, "author@example.com", "author").await;

    let author = resources
        .database
        .users()
        .get_by_email("author@example.com")
        .await
        .unwrap()
        .unwrap();
    for name in ["One", "Two", "Three"] {
        resources
            .database
            .recipes()
            .create(
                author.id,
                &common::recipe_payload(name, &[(ingredients[0].id, 1)], &[]),
            )
            .await
            .unwrap();
    }

    resources
        .database
        .follows()
        .create(
            resources
                .database
                .users()
                .get_by_email("cook@example.com")
                .await
                .unwrap()
                .unwrap()
                .id,
            author.id,
        )
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "GET",
            "/api/users/subscriptions?recipe_limit=2",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let entry = &body.as_array().unwrap()[0];
    assert_eq!(entry["recipes"].as_array().unwrap().len(), 2);
    assert_eq!(entry["recipes_count"], 3);
}

#[tokio::test]
async fn test_recipe_list_repeatable_tags_query() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);
    let (tags, ingredients) = common::seed_reference_data(&resources.database).await;

    let token = register_and_login(&app, "cook@example.com", "cook").await;
    let user = resources
        .database
        .users()
        .get_by_email("cook@example.com")
        .await
        .unwrap()
        .unwrap();

    resources
        .database
        .recipes()
        .create(
            user.id,
            &common::recipe_payload("Pancakes", &[(ingredients[0].id, 1)], &[tags[0].id]),
        )
        .await
        .unwrap();
    resources
        .database
        .recipes()
        .create(
            user.id,
            &common::recipe_payload("Salad", &[(ingredients[0].id, 1)], &[tags[1].id]),
        )
        .await
        .unwrap();
    resources
        .database
        .recipes()
        .create(
            user.id,
            &common::recipe_payload("Stew", &[(ingredients[0].id, 1)], &[tags[2].id]),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "GET",
            "/api/recipes?tags=breakfast&tags=vegan",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Pancakes"));
    assert!(names.contains(&"Salad"));
}

#[tokio::test]
async fn test_download_shopping_cart_renders_aggregated_document() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);
    let (_, ingredients) = common::seed_reference_data(&resources.database).await;
    let (flour, sugar) = (ingredients[0].id, ingredients[1].id);

    let token = register_and_login(&app, "cook@example.com", "cook").await;
    let user = resources
        .database
        .users()
        .get_by_email("cook@example.com")
        .await
        .unwrap()
        .unwrap();

    let pancakes = resources
        .database
        .recipes()
        .create(
            user.id,
            &common::recipe_payload("Pancakes", &[(flour, 200), (sugar, 50)], &[]),
        )
        .await
        .unwrap();
    let bread = resources
        .database
        .recipes()
        .create(user.id, &common::recipe_payload("Bread", &[(flour, 100)], &[]))
        .await
        .unwrap();
    resources
        .database
        .shopping_list()
        .create(user.id, pancakes.id)
        .await
        .unwrap();
    resources
        .database
        .shopping_list()
        .create(user.id, bread.id)
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "GET",
            "/api/recipes/download_shopping_cart",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment"));

    let text = response_text(response).await;
    assert_eq!(text, "flour (g) - 300\nsugar (g) - 50\n");
}

#[tokio::test]
async fn test_ingredient_prefix_search() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);
    common::seed_reference_data(&resources.database).await;

    let response = app
        .clone()
        .oneshot(json_request("GET", "/api/ingredients?name=fl", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "flour");

    // Substring matches are not prefix matches
    let response = app
        .oneshot(json_request("GET", "/api/ingredients?name=lour", None, None))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_tags_are_read_only_reference_data() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);
    let (tags, _) = common::seed_reference_data(&resources.database).await;

    let response = app
        .clone()
        .oneshot(json_request("GET", "/api/tags", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let response = app
        .clone()
        .oneshot(json_request(
            "GET",
            &format!("/api/tags/{}", tags[0].id),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["slug"], "breakfast");

    // No write verb is routed for tags
    let response = app
        .oneshot(json_request("POST", "/api/tags", None, Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_endpoint() {
    let resources = common::setup_test_environment().await;
    let app = potluck_server::server::router(&resources);

    let response = app
        .oneshot(json_request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
}
