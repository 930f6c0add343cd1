//! Site integration tests.
//!
//! These drive the full router against a mock database. Every test queues
//! exactly the results its request should consume, so an unexpected write
//! surfaces as a 500.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use codestar_api::{
    AppState, app,
    messages::{Level, MESSAGES_COOKIE, Message},
};
use codestar_common::config::{Config, DatabaseConfig, ServerConfig, SiteConfig};
use codestar_db::entities::{collaborate_request, comment, post, post::PostStatus, user};
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
use tower::ServiceExt;

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            url: "http://localhost:8000".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        site: SiteConfig::default(),
    }
}

fn create_test_app(db: DatabaseConnection) -> Router {
    let state = AppState::new(Arc::new(db), &create_test_config()).unwrap();
    app(state)
}

fn count(n: i64) -> [BTreeMap<&'static str, Value>; 1] {
    [maplit::btreemap! { "num_items" => Value::BigInt(Some(n)) }]
}

fn test_user(id: &str, username: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: username.to_string(),
        username_lower: username.to_lowercase(),
        name: None,
        password: String::new(),
        token: Some(format!("token-{id}")),
        created_at: Utc::now().into(),
    }
}

fn test_post(slug: &str) -> post::Model {
    post::Model {
        id: "post1".to_string(),
        title: "Hello world".to_string(),
        slug: slug.to_string(),
        author_id: "author".to_string(),
        featured_image: "placeholder".to_string(),
        content: "<p>First post</p>".to_string(),
        created_on: Utc::now().into(),
        updated_on: Utc::now().into(),
        status: PostStatus::Published,
        excerpt: "First".to_string(),
    }
}

fn test_comment(author_id: &str, approved: bool) -> comment::Model {
    comment::Model {
        id: "c1".to_string(),
        post_id: "post1".to_string(),
        author_id: author_id.to_string(),
        body: "Nice post".to_string(),
        approved,
        created_on: Utc::now().into(),
    }
}

fn form_request(uri: &str, body: &str, caller: Option<user::Model>) -> Request<Body> {
    let mut request = Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    if let Some(user) = caller {
        request.extensions_mut().insert(user);
    }
    request
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Messages stored for the next page by a redirect.
fn flashed(response: &Response<Body>) -> Vec<Message> {
    let prefix = format!("{MESSAGES_COOKIE}=");
    let cookie = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .expect("messages cookie");
    let value = cookie[prefix.len()..].split(';').next().unwrap();
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(value).unwrap()).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

// ==================== Navigation ====================

#[tokio::test]
async fn test_root_redirects_to_blog() {
    let app = create_test_app(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let response = app.oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/blog/");
}

// ==================== Listing ====================

#[tokio::test]
async fn test_first_page_of_empty_blog() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([count(0)])
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();
    let app = create_test_app(db);

    let response = app.oneshot(get_request("/blog/?page=1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_listing_shows_published_posts() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([count(1)])
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([[test_user("author", "ada")]])
        .into_connection();
    let app = create_test_app(db);

    let response = app.oneshot(get_request("/blog/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("/blog/hello-world/"));
    assert!(body.contains("Author: ada"));
    assert!(!body.contains("page-link"));
}

#[tokio::test]
async fn test_non_numeric_page_is_not_found() {
    let app = create_test_app(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let response = app.oneshot(get_request("/blog/?page=abc")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_past_the_end_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([count(3)])
        .into_connection();
    let app = create_test_app(db);

    let response = app.oneshot(get_request("/blog/?page=2")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_zero_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([count(3)])
        .into_connection();
    let app = create_test_app(db);

    let response = app.oneshot(get_request("/blog/?page=0")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ==================== Post detail ====================

#[tokio::test]
async fn test_unpublished_post_is_not_found() {
    // The published-only lookup finds nothing for a draft slug
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();
    let app = create_test_app(db);

    let response = app.oneshot(get_request("/blog/secret-draft/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_detail_shows_pending_comments_to_visitors() {
    let mut pending = test_comment("u2", false);
    pending.id = "c2".to_string();
    pending.body = "Pending words".to_string();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([vec![test_comment("u1", true), pending]])
        .append_query_results([vec![
            test_user("author", "ada"),
            test_user("u1", "bob"),
            test_user("u2", "cy"),
        ]])
        .append_query_results([count(1)])
        .into_connection();
    let app = create_test_app(db);

    let response = app.oneshot(get_request("/blog/hello-world/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Nice post"));
    assert!(body.contains("Pending words"));
    assert!(body.contains("This comment is awaiting approval"));
    assert!(!body.contains("edit_comment"));
    assert!(body.contains("Log in to leave a comment"));
}

// ==================== Comment creation ====================

#[tokio::test]
async fn test_authenticated_comment_is_created_unapproved() {
    let author = test_user("u1", "bob");
    let created = test_comment("u1", false);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([[created.clone()]])
        .append_query_results([[created]])
        .append_query_results([vec![test_user("author", "ada"), author.clone()]])
        .append_query_results([count(0)])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(form_request(
            "/blog/hello-world/",
            "body=Nice+post",
            Some(author),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Comment submitted and awaiting approval"));
    assert!(body.contains("This comment is awaiting approval"));
    // Form is reset
    assert!(body.contains("<textarea name=\"body\" id=\"id_body\" rows=\"4\" class=\"form-control\"></textarea>"));
}

#[tokio::test]
async fn test_anonymous_comment_is_rejected_without_write() {
    // No insert result is queued
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([Vec::<comment::Model>::new()])
        .append_query_results([[test_user("author", "ada")]])
        .append_query_results([count(0)])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(form_request("/blog/hello-world/", "body=Nice+post", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("You must be logged in to leave a comment."));
    assert!(body.contains("alert-danger"));
}

#[tokio::test]
async fn test_blank_comment_is_not_stored() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([Vec::<comment::Model>::new()])
        .append_query_results([[test_user("author", "ada")]])
        .append_query_results([count(0)])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(form_request(
            "/blog/hello-world/",
            "body=+++",
            Some(test_user("u1", "bob")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("This field is required."));
    assert!(!body.contains("alert-success"));
}

// ==================== Comment editing ====================

#[tokio::test]
async fn test_author_edit_resets_approval() {
    let edited = comment::Model {
        body: "Changed".to_string(),
        approved: false,
        ..test_comment("u1", true)
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([[test_comment("u1", true)]])
        .append_query_results([[edited]])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(form_request(
            "/blog/hello-world/edit_comment/c1/",
            "body=Changed",
            Some(test_user("u1", "bob")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/blog/hello-world/");
    assert_eq!(
        flashed(&response),
        vec![Message {
            level: Level::Success,
            text: "Comment Updated!".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_non_author_edit_changes_nothing() {
    // No update result is queued
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([[test_comment("u1", true)]])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(form_request(
            "/blog/hello-world/edit_comment/c1/",
            "body=Hijacked",
            Some(test_user("u2", "mallory")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/blog/hello-world/");
    let messages = flashed(&response);
    assert_eq!(messages[0].level, Level::Error);
    assert_eq!(messages[0].text, "Error updating comment!");
}

#[tokio::test]
async fn test_blank_edit_reports_same_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([[test_comment("u1", true)]])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(form_request(
            "/blog/hello-world/edit_comment/c1/",
            "body=",
            Some(test_user("u1", "bob")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(flashed(&response)[0].text, "Error updating comment!");
}

#[tokio::test]
async fn test_edit_without_form_body_still_redirects() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([[test_comment("u1", true)]])
        .into_connection();
    let app = create_test_app(db);

    let mut request = Request::builder()
        .uri("/blog/hello-world/edit_comment/c1/")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"body":"Sneaky"}"#))
        .unwrap();
    request.extensions_mut().insert(test_user("u1", "bob"));

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/blog/hello-world/");
    assert_eq!(flashed(&response)[0].text, "Error updating comment!");
}

#[tokio::test]
async fn test_edit_comment_from_other_post_is_not_found() {
    let foreign = comment::Model {
        post_id: "post2".to_string(),
        ..test_comment("u1", true)
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([[foreign]])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(form_request(
            "/blog/hello-world/edit_comment/c1/",
            "body=Changed",
            Some(test_user("u1", "bob")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ==================== Comment deletion ====================

#[tokio::test]
async fn test_author_can_delete() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([[test_comment("u1", false)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(form_request(
            "/blog/hello-world/delete_comment/c1/",
            "",
            Some(test_user("u1", "bob")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(flashed(&response)[0].text, "Comment deleted!");
}

#[tokio::test]
async fn test_non_author_cannot_delete() {
    // No exec result is queued
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([[test_comment("u1", false)]])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(form_request(
            "/blog/hello-world/delete_comment/c1/",
            "",
            Some(test_user("u2", "mallory")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/blog/hello-world/");
    let messages = flashed(&response);
    assert_eq!(messages[0].level, Level::Error);
    assert_eq!(messages[0].text, "You can only delete your own comments!");
}

#[tokio::test]
async fn test_delete_missing_comment_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([Vec::<comment::Model>::new()])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(form_request(
            "/blog/hello-world/delete_comment/nope/",
            "",
            Some(test_user("u1", "bob")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ==================== Cross-site requests ====================

#[tokio::test]
async fn test_cross_origin_post_is_forbidden() {
    // Nothing is queued: the handler must not run
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(db);

    let mut request = form_request(
        "/blog/hello-world/delete_comment/c1/",
        "",
        Some(test_user("u1", "bob")),
    );
    request
        .headers_mut()
        .insert(header::ORIGIN, "https://evil.example".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_same_origin_post_is_handled() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_post("hello-world")]])
        .append_query_results([[test_comment("u1", false)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let app = create_test_app(db);

    let mut request = form_request(
        "/blog/hello-world/delete_comment/c1/",
        "",
        Some(test_user("u1", "bob")),
    );
    request
        .headers_mut()
        .insert(header::ORIGIN, "http://localhost:8000".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(flashed(&response)[0].text, "Comment deleted!");
}

#[tokio::test]
async fn test_cross_site_referer_is_forbidden() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(db);

    let mut request = form_request("/about/", "name=Ada&email=ada@example.com&message=Hi", None);
    request.headers_mut().insert(
        header::REFERER,
        "https://evil.example/attack.html".parse().unwrap(),
    );

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ==================== About ====================

#[tokio::test]
async fn test_invalid_collaboration_is_rerendered() {
    // Only the about lookup is queued
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<codestar_db::entities::about::Model>::new()])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(form_request(
            "/about/",
            "name=Ada&email=not-an-email&message=Hi",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("value=\"Ada\""));
    assert!(body.contains(">Hi</textarea>"));
    assert!(body.contains("Enter a valid email address."));
}

#[tokio::test]
async fn test_valid_collaboration_is_stored() {
    let stored = collaborate_request::Model {
        id: "req1".to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        message: "Hi".to_string(),
        read: false,
        created_at: Utc::now().into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[stored]])
        .append_query_results([Vec::<codestar_db::entities::about::Model>::new()])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(form_request(
            "/about/",
            "name=Ada&email=ada%40example.com&message=Hi",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Collaboration request received!"));
    // Form is reset
    assert!(!body.contains("value=\"Ada\""));
}

// ==================== Sessions and messages ====================

#[tokio::test]
async fn test_session_cookie_identifies_user() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user("u1", "bob")]])
        .append_query_results([count(0)])
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();
    let app = create_test_app(db);

    let request = Request::builder()
        .uri("/blog/")
        .header(header::COOKIE, "codestar_token=token-u1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("You are logged in as bob"));
}

#[tokio::test]
async fn test_flashed_messages_are_shown_once() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([count(0)])
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();
    let app = create_test_app(db);

    let stored = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(&[Message {
            level: Level::Success,
            text: "Comment deleted!".to_string(),
        }])
        .unwrap(),
    );
    let request = Request::builder()
        .uri("/blog/")
        .header(header::COOKIE, format!("{MESSAGES_COOKIE}={stored}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cleared.starts_with(&format!("{MESSAGES_COOKIE}=;")));
    assert!(body_string(response).await.contains("Comment deleted!"));
}

#[tokio::test]
async fn test_login_page_renders() {
    let app = create_test_app(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let response = app.oneshot(get_request("/accounts/login/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Sign In"));
}
