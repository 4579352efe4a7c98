use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

#[tokio::test]
async fn admin_curates_catalog_and_students_see_no_correctness() {
    let ctx = test_support::setup_test_context().await;

    let admin = test_support::insert_admin(ctx.state.db(), "curator", "curator-pass").await;
    let admin_token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let student = test_support::insert_user(ctx.state.db(), "student", "student-pass").await;
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/categories",
            Some(&admin_token),
            Some(json!({ "name": "Geography", "description": "Maps" })),
        ))
        .await
        .expect("create category");
    let status = response.status();
    let category = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {category}");
    let category_id = category["id"].as_i64().expect("category id");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/questions",
            Some(&admin_token),
            Some(json!({
                "text": "Capital of France?",
                "category_id": category_id,
                "difficulty": "easy",
                "time_limit_seconds": 30,
                "answers": [
                    { "text": "Paris", "is_correct": true },
                    { "text": "Lyon", "is_correct": false }
                ]
            })),
        ))
        .await
        .expect("create question");
    let status = response.status();
    let question = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {question}");
    assert_eq!(question["answers"].as_array().map(Vec::len), Some(2));
    assert_eq!(question["answers"][0]["is_correct"], true);
    let question_id = question["id"].as_i64().expect("question id");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/catalog/questions?category_id={category_id}&difficulty=easy"),
            Some(&student_token),
            None,
        ))
        .await
        .expect("list questions");
    assert_eq!(response.status(), StatusCode::OK);
    let page = test_support::read_json(response).await;
    assert_eq!(page["total_count"], 1);
    assert_eq!(page["items"][0]["id"], question_id);
    assert!(page["items"][0]["answers"][0].get("is_correct").is_none());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/catalog/questions?difficulty=hard",
            Some(&student_token),
            None,
        ))
        .await
        .expect("list hard questions");
    let page = test_support::read_json(response).await;
    assert_eq!(page["total_count"], 0);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/catalog/questions?difficulty=extreme",
            Some(&student_token),
            None,
        ))
        .await
        .expect("list with unknown difficulty");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert!(body["detail"].as_str().is_some_and(|detail| detail.contains("extreme")));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/catalog/questions/{question_id}/answers"),
            Some(&admin_token),
            Some(json!({ "text": "Marseille" })),
        ))
        .await
        .expect("add answer");
    assert_eq!(response.status(), StatusCode::CREATED);
    let answer = test_support::read_json(response).await;
    assert_eq!(answer["is_correct"], false);
    let answer_id = answer["id"].as_i64().expect("answer id");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/catalog/answers/{answer_id}"),
            Some(&admin_token),
            None,
        ))
        .await
        .expect("delete answer");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/catalog/questions/{question_id}"),
            Some(&student_token),
            None,
        ))
        .await
        .expect("get question");
    let fetched = test_support::read_json(response).await;
    assert_eq!(fetched["answers"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn non_admin_cannot_modify_catalog() {
    let ctx = test_support::setup_test_context().await;

    let student = test_support::insert_user(ctx.state.db(), "student", "student-pass").await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/categories",
            Some(&token),
            Some(json!({ "name": "Forbidden" })),
        ))
        .await
        .expect("create category");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/questions",
            Some(&token),
            Some(json!({ "text": "Sneaky?" })),
        ))
        .await
        .expect("create question");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_category_name_conflicts_and_missing_category_is_404() {
    let ctx = test_support::setup_test_context().await;

    let admin = test_support::insert_admin(ctx.state.db(), "curator", "curator-pass").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    test_support::insert_category(ctx.state.db(), "Science").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/categories",
            Some(&token),
            Some(json!({ "name": "science" })),
        ))
        .await
        .expect("create category");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/catalog/questions",
            Some(&token),
            Some(json!({ "text": "Orphan?", "category_id": 9999 })),
        ))
        .await
        .expect("create question");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
