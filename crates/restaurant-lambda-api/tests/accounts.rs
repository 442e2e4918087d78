use std::sync::Arc;

use restaurant_lambda_api::{dispatch, AppContext};
use restaurant_lambda_shared::test_utils::{
    customer_claims, fixture_identity, fixture_stores, fixtures, get, post_json,
};
use restaurant_lib::{Claims, InMemoryStore, UserRole};
use serde_json::json;

fn context() -> (Arc<InMemoryStore>, AppContext) {
    let (store, stores) = fixture_stores();
    (store, AppContext::new(stores, Arc::new(fixture_identity()), 12))
}

#[tokio::test]
async fn seeded_customer_signs_in() {
    let (_, ctx) = context();
    let response = dispatch(
        &ctx,
        &post_json(
            "/auth/sign-in",
            &json!({"email": fixtures::CUSTOMER_EMAIL, "password": fixtures::CUSTOMER_PASSWORD}),
        ),
    )
    .await;

    assert_eq!(response.status, 200);
    let session = response.json_body().unwrap();
    assert_eq!(session["username"], "John Doe");
    assert_eq!(session["role"], "Customer");
    assert_eq!(
        session["accessToken"],
        format!("id-token-{}", fixtures::CUSTOMER_SUB)
    );
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (_, ctx) = context();
    let response = dispatch(
        &ctx,
        &post_json(
            "/auth/sign-in",
            &json!({"email": fixtures::CUSTOMER_EMAIL, "password": "not-it"}),
        ),
    )
    .await;

    assert_eq!(response.status, 401);
    assert_eq!(response.json_body().unwrap()["type"], "/problems/unauthorized");
}

#[tokio::test]
async fn waiter_signs_up_and_signs_in_as_waiter() {
    let (store, ctx) = context();
    let sign_up = json!({
        "email": fixtures::WAITER_EMAIL,
        "password": "Waiter123!",
        "firstName": "Anna",
        "lastName": "Smith",
    });

    let response = dispatch(&ctx, &post_json("/auth/sign-up", &sign_up)).await;
    assert_eq!(response.status, 201);
    assert_eq!(
        response.json_body().unwrap(),
        json!({"message": "User registered successfully"})
    );

    let response = dispatch(
        &ctx,
        &post_json(
            "/auth/sign-in",
            &json!({"email": fixtures::WAITER_EMAIL, "password": "Waiter123!"}),
        ),
    )
    .await;
    assert_eq!(response.status, 200);
    let session = response.json_body().unwrap();
    assert_eq!(session["role"], "Waiter");
    assert_eq!(session["username"], "Anna Smith");

    let token = session["accessToken"].as_str().unwrap();
    let subject = token.trim_start_matches("id-token-");
    assert_eq!(store.user(subject).map(|u| u.role), Some(UserRole::Waiter));
}

#[tokio::test]
async fn sign_up_rejections_are_bad_requests() {
    let (_, ctx) = context();

    let duplicate = json!({
        "email": fixtures::CUSTOMER_EMAIL,
        "password": "Password123!",
        "firstName": "John",
        "lastName": "Doe",
    });
    let response = dispatch(&ctx, &post_json("/auth/sign-up", &duplicate)).await;
    assert_eq!(response.status, 400);
    assert_eq!(response.json_body().unwrap()["detail"], "Email already exists");

    let incomplete = json!({"email": "new@example.com", "password": "Password123!"});
    let response = dispatch(&ctx, &post_json("/auth/sign-up", &incomplete)).await;
    assert_eq!(response.status, 400);
    assert_eq!(
        response.json_body().unwrap()["detail"],
        "Email, password, firstName and lastName are required"
    );
}

#[tokio::test]
async fn profile_uses_authorizer_claims() {
    let (_, ctx) = context();

    let response = dispatch(&ctx, &get("/users/profile").with_claims(customer_claims())).await;
    assert_eq!(response.status, 200);
    assert_eq!(
        response.json_body().unwrap(),
        json!({
            "firstName": "John",
            "lastName": "Doe",
            "role": "Customer",
            "email": fixtures::CUSTOMER_EMAIL,
            "imageUrl": "https://img.example.com/users/john.png",
        })
    );

    let response = dispatch(&ctx, &get("/users/profile")).await;
    assert_eq!(response.status, 401);

    let visitor = Claims::new(fixtures::CUSTOMER_SUB, None, vec![]);
    let response = dispatch(&ctx, &get("/users/profile").with_claims(visitor)).await;
    assert_eq!(response.status, 401);
}
