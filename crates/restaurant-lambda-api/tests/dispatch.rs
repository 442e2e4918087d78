use std::sync::Arc;

use http::Method;
use restaurant_lambda_api::{dispatch, AppContext};
use restaurant_lambda_shared::test_utils::{
    fixture_identity, fixture_stores, fixtures, get, mock_request_id,
};
use restaurant_lambda_shared::ApiRequest;
use serde_json::Value;

fn context() -> AppContext {
    let (_, stores) = fixture_stores();
    AppContext::new(stores, Arc::new(fixture_identity()), 12)
}

fn body(response: &restaurant_lambda_shared::ApiResponse) -> Value {
    response.json_body().expect("JSON body")
}

#[tokio::test]
async fn unknown_route_is_404_with_cors() {
    let ctx = context();
    let response = dispatch(&ctx, &get("/nowhere")).await;

    assert_eq!(response.status, 404);
    assert_eq!(body(&response), serde_json::json!({"message": "Not Found"}));
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(
        response.header("Access-Control-Allow-Headers"),
        Some("Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token")
    );
}

#[tokio::test]
async fn wrong_method_on_known_path_is_404() {
    let ctx = context();
    let request = ApiRequest::new(Method::DELETE, "/locations")
        .with_request_id(mock_request_id("delete"));
    let response = dispatch(&ctx, &request).await;
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn non_numeric_location_id_does_not_route() {
    let ctx = context();
    let response = dispatch(&ctx, &get("/locations/main/feedbacks")).await;
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn lists_locations_and_options() {
    let ctx = context();

    let response = dispatch(&ctx, &get("/locations")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    let locations = body(&response);
    assert_eq!(locations.as_array().unwrap().len(), 2);
    assert_eq!(locations[0]["id"], fixtures::LOCATION_ID);
    assert_eq!(locations[0]["address"], fixtures::LOCATION_ADDRESS);
    assert!(locations[0]["imageUrl"].is_string());

    let response = dispatch(&ctx, &get("/locations/select-options")).await;
    assert_eq!(
        body(&response),
        serde_json::json!([
            {"id": fixtures::LOCATION_ID, "address": fixtures::LOCATION_ADDRESS},
            {"id": fixtures::EMPTY_LOCATION_ID, "address": fixtures::EMPTY_LOCATION_ADDRESS},
        ])
    );
}

#[tokio::test]
async fn speciality_dishes_keep_location_order() {
    let ctx = context();
    let response = dispatch(&ctx, &get("/locations/1/speciality-dishes")).await;

    assert_eq!(response.status, 200);
    let dishes = body(&response);
    let names: Vec<&str> = dishes
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Spring Salad", "Fresh Avocado Salad"]);
    assert_eq!(dishes[0]["weight"], "350 g");
}

#[tokio::test]
async fn speciality_dishes_for_unknown_location_is_problem_404() {
    let ctx = context();
    let response = dispatch(&ctx, &get("/locations/99/speciality-dishes")).await;

    assert_eq!(response.status, 404);
    assert_eq!(
        response.header("Content-Type"),
        Some("application/problem+json")
    );
    assert_eq!(body(&response)["type"], "/problems/not-found");
}

#[tokio::test]
async fn popular_dishes_are_sorted_by_name() {
    let ctx = context();
    let response = dispatch(&ctx, &get("/dishes/popular")).await;

    let names: Vec<String> = body(&response)
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Beef Stroganoff", "Fresh Avocado Salad"]);
}

#[tokio::test]
async fn feedback_pages_expose_page_object_and_cursor() {
    let ctx = context();
    let request = get("/locations/1/feedbacks")
        .with_query("type", "SERVICE")
        .with_query("size", "5");
    let response = dispatch(&ctx, &request).await;

    assert_eq!(response.status, 200);
    let page = body(&response);
    assert_eq!(page["totalElements"], 12);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["numberOfElements"], 5);
    assert_eq!(page["first"], true);
    assert_eq!(page["last"], false);
    assert_eq!(page["empty"], false);
    assert_eq!(page["pageable"]["pageNumber"], 0);
    assert_eq!(page["sort"][0]["property"], "date");
    let cursor = page["nextCursor"].as_str().expect("cursor on first page");

    let request = get("/locations/1/feedbacks")
        .with_query("type", "SERVICE")
        .with_query("size", "5")
        .with_query("page", "1")
        .with_query("cursor", cursor);
    let second = body(&dispatch(&ctx, &request).await);
    assert_eq!(second["number"], 1);
    assert_eq!(second["content"][0]["id"], "fb-05");

    let request = get("/locations/1/feedbacks")
        .with_query("type", "SERVICE")
        .with_query("size", "5")
        .with_query("page", "2");
    let last = body(&dispatch(&ctx, &request).await);
    assert_eq!(last["numberOfElements"], 2);
    assert_eq!(last["last"], true);
    assert!(last.get("nextCursor").is_none());
}

#[tokio::test]
async fn feedback_without_type_is_bad_request() {
    let ctx = context();
    let response = dispatch(&ctx, &get("/locations/1/feedbacks")).await;

    assert_eq!(response.status, 400);
    assert_eq!(body(&response)["detail"], "Feedback type is required");
    assert_eq!(response.header("Access-Control-Allow-Methods"), Some("*"));
}
