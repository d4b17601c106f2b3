//! End-to-end handler tests against in-memory repositories.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::json;

use quill_core::ports::{PasswordService, TokenService};
use quill_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
use quill_infra::database::InMemoryRepository;
use quill_infra::storage::DiskUploadStore;

use crate::state::AppState;

const BOUNDARY: &str = "----quill-test-boundary";

fn test_state(upload_dir: &std::path::Path) -> AppState {
    let repo = Arc::new(InMemoryRepository::new());
    AppState {
        users: repo.clone(),
        posts: repo,
        uploads: Arc::new(DiskUploadStore::new(upload_dir)),
        db: None,
    }
}

fn test_services() -> (Arc<dyn TokenService>, Arc<dyn PasswordService>) {
    let token_service = JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 1,
        issuer: "test-issuer".to_string(),
    });
    (
        Arc::new(token_service),
        Arc::new(Argon2PasswordService::new()),
    )
}

macro_rules! test_app {
    ($state:expr) => {{
        let (token_service, password_service) = test_services();
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data(web::Data::new(token_service))
                .app_data(web::Data::new(password_service))
                .configure(super::configure_routes),
        )
        .await
    }};
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_content_type() -> (header::HeaderName, String) {
    (
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    )
}

async fn register<S>(app: &S, username: &str, password: &str) -> StatusCode
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    test::call_service(app, req).await.status()
}

/// Login and return the session cookie from the Set-Cookie header.
async fn login<S>(app: &S, username: &str, password: &str) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let header_value = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    Cookie::parse_encoded(header_value).unwrap()
}

#[actix_web::test]
async fn full_blog_scenario() {
    let upload_dir = tempfile::tempdir().unwrap();
    let state = test_state(upload_dir.path());
    let app = test_app!(state);

    // Register and login alice. Short passwords are allowed; the server
    // hashes whatever it is given.
    assert_eq!(register(&app, "alice", "pw1").await, StatusCode::OK);
    let alice = login(&app, "alice", "pw1").await;

    // Create a post with a cover image.
    let body = multipart_body(
        &[("title", "Hi"), ("summary", "short"), ("content", "long form")],
        Some(("cover.png", b"png bytes".as_slice())),
    );
    let req = test::TestRequest::post()
        .uri("/post")
        .cookie(alice.clone())
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: serde_json::Value = test::read_body_json(resp).await;
    let post_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["author"]["username"], "alice");

    // Anyone can read it; author username is joined.
    let req = test::TestRequest::get()
        .uri(&format!("/post/{post_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(fetched["title"], "Hi");
    assert_eq!(fetched["author"]["username"], "alice");

    // Bob may not update alice's post.
    assert_eq!(register(&app, "bob", "pw2").await, StatusCode::OK);
    let bob = login(&app, "bob", "pw2").await;

    let body = multipart_body(
        &[("title", "Hijacked"), ("summary", "s"), ("content", "c")],
        None,
    );
    let req = test::TestRequest::put()
        .uri(&format!("/post/{post_id}"))
        .cookie(bob)
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The post is unmodified.
    let req = test::TestRequest::get()
        .uri(&format!("/post/{post_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let unchanged: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(unchanged["title"], "Hi");

    // Alice updates her own post without replacing the cover.
    let body = multipart_body(
        &[("title", "Updated"), ("summary", "short"), ("content", "long form")],
        None,
    );
    let req = test::TestRequest::put()
        .uri(&format!("/post/{post_id}"))
        .cookie(alice)
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/post/{post_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let updated: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(updated["title"], "Updated");
    assert_eq!(updated["cover"], created["cover"]);

    // The list endpoint returns the post, author joined.
    let req = test::TestRequest::get().uri("/post").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["title"], "Updated");
}

#[actix_web::test]
async fn duplicate_registration_rejected() {
    let upload_dir = tempfile::tempdir().unwrap();
    let state = test_state(upload_dir.path());
    let app = test_app!(state);

    assert_eq!(register(&app, "alice", "password1").await, StatusCode::OK);
    assert_eq!(
        register(&app, "alice", "password1").await,
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn login_failures_are_400() {
    let upload_dir = tempfile::tempdir().unwrap();
    let state = test_state(upload_dir.path());
    let app = test_app!(state);

    assert_eq!(register(&app, "alice", "password1").await, StatusCode::OK);

    // Wrong password.
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": "alice", "password": "nope-nope" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown user.
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": "mallory", "password": "password1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn profile_requires_valid_token() {
    let upload_dir = tempfile::tempdir().unwrap();
    let state = test_state(upload_dir.path());
    let app = test_app!(state);

    // No credential at all.
    let req = test::TestRequest::get().uri("/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Garbage token.
    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(Cookie::new("token", "garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Valid session.
    assert_eq!(register(&app, "alice", "password1").await, StatusCode::OK);
    let alice = login(&app, "alice", "password1").await;
    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(alice)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let identity: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(identity["username"], "alice");
}

#[actix_web::test]
async fn create_post_without_file_is_400() {
    let upload_dir = tempfile::tempdir().unwrap();
    let state = test_state(upload_dir.path());
    let app = test_app!(state);

    assert_eq!(register(&app, "alice", "password1").await, StatusCode::OK);
    let alice = login(&app, "alice", "password1").await;

    let body = multipart_body(&[("title", "Hi"), ("summary", "s"), ("content", "c")], None);
    let req = test::TestRequest::post()
        .uri("/post")
        .cookie(alice)
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn create_post_requires_authentication() {
    let upload_dir = tempfile::tempdir().unwrap();
    let state = test_state(upload_dir.path());
    let app = test_app!(state);

    let body = multipart_body(
        &[("title", "Hi"), ("summary", "s"), ("content", "c")],
        Some(("cover.png", b"png bytes".as_slice())),
    );
    let req = test::TestRequest::post()
        .uri("/post")
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_expires_cookie() {
    let upload_dir = tempfile::tempdir().unwrap();
    let state = test_state(upload_dir.path());
    let app = test_app!(state);

    let req = test::TestRequest::post().uri("/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let header_value = resp
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let cookie = Cookie::parse_encoded(header_value).unwrap();
    assert_eq!(cookie.name(), "token");
    assert_eq!(cookie.value(), "");
}
