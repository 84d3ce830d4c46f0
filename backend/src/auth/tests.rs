use super::*;
use axum::{
    Extension, Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
    response::Response,
    routing::get,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use tower::ServiceExt;

const SECRET: &str = "supersecretjwtsecretforunittesting123";

fn settings() -> Arc<AuthSettings> {
    Arc::new(AuthSettings {
        jwt_secret: SECRET.to_string(),
        admin_emails: vec!["owner@example.com".to_string()],
    })
}

#[derive(Serialize)]
struct TestClaims<'a> {
    sub: &'a str,
    role: &'a str,
    aud: &'a str,
    email: Option<&'a str>,
    exp: usize,
}

fn token(secret: &str, email: Option<&str>, exp: usize) -> String {
    encode(
        &Header::default(),
        &TestClaims {
            sub: "123e4567-e89b-12d3-a456-426614174000",
            role: "authenticated",
            aud: "authenticated",
            email,
            exp,
        },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn app() -> Router {
    Router::new()
        .route("/me", get(|user: AuthUser| async move { user.user_id.to_string() }))
        .route(
            "/admin",
            get(|AdminUser(user): AdminUser| async move { user.email.unwrap_or_default() }),
        )
        .layer(Extension(settings()))
}

async fn call(path: &str, bearer: Option<String>) -> Response {
    let mut request = Request::builder().uri(path);
    if let Some(bearer) = bearer {
        request = request.header("Authorization", format!("Bearer {bearer}"));
    }
    app()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn status_for(path: &str, bearer: Option<String>) -> StatusCode {
    call(path, bearer).await.status()
}

async fn json_body(response: Response) -> serde_json::Value {
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_validate_supabase_jwt_success() {
    let claims = validate_supabase_jwt(&token(SECRET, Some("test@example.com"), 9999999999), SECRET)
        .expect("Valid token should pass");
    assert_eq!(claims.sub, "123e4567-e89b-12d3-a456-426614174000");
    assert_eq!(claims.email.as_deref(), Some("test@example.com"));
}

#[test]
fn test_validate_supabase_jwt_expired() {
    let result = validate_supabase_jwt(&token(SECRET, None, 1), SECRET);
    assert!(result.is_err());
}

#[test]
fn test_validate_supabase_jwt_invalid_signature() {
    let result = validate_supabase_jwt(&token("wrongsecret", None, 9999999999), SECRET);
    assert!(result.is_err());
}

#[test]
fn test_admin_match_is_case_insensitive() {
    let settings = settings();
    assert!(settings.is_admin(Some("Owner@Example.com ")));
    assert!(!settings.is_admin(Some("someone@example.com")));
    assert!(!settings.is_admin(None));
}

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    assert_eq!(status_for("/me", None).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_reaches_handler() {
    let bearer = token(SECRET, Some("test@example.com"), 9999999999);
    assert_eq!(status_for("/me", Some(bearer)).await, StatusCode::OK);
}

#[tokio::test]
async fn test_non_admin_is_forbidden() {
    let bearer = token(SECRET, Some("test@example.com"), 9999999999);
    assert_eq!(status_for("/admin", Some(bearer)).await, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_email_passes() {
    let bearer = token(SECRET, Some("owner@example.com"), 9999999999);
    assert_eq!(status_for("/admin", Some(bearer)).await, StatusCode::OK);
}

#[tokio::test]
async fn test_forbidden_response_is_json() {
    let bearer = token(SECRET, Some("test@example.com"), 9999999999);
    let response = call("/admin", Some(bearer)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = json_body(response).await;
    assert_eq!(body["code"], 403);
    assert_eq!(body["message"], "Admin access required");
}

#[tokio::test]
async fn test_unauthorized_response_is_json() {
    let response = call("/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["code"], 401);
    assert_eq!(body["message"], "Missing Authorization header");
}
