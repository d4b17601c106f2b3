//! Session middleware: the identity extractor.
//!
//! Resolves the bearer credential on an inbound request to a caller
//! identity, or short-circuits with 401 (no credential) / 403 (invalid
//! credential). No state survives between requests.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header};
use std::future::{Ready, ready};
use std::sync::Arc;

use quill_core::ports::{AuthError, TokenClaims, TokenService};

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Authenticated caller identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            // Missing credential vs. a credential that failed to verify.
            AuthError::MissingToken => actix_web::http::StatusCode::UNAUTHORIZED,
            AuthError::Expired | AuthError::BadSignature | AuthError::Malformed(_) => {
                actix_web::http::StatusCode::FORBIDDEN
            }
            AuthError::Hashing(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use quill_shared::ErrorResponse;

        let error = match &self.0 {
            AuthError::MissingToken => ErrorResponse::unauthorized(
                "Provide the session cookie or a Bearer token in the Authorization header.",
            ),
            AuthError::Expired => ErrorResponse::forbidden(
                "Your session token has expired. Please login again.",
            ),
            AuthError::BadSignature => ErrorResponse::forbidden("Token signature mismatch"),
            AuthError::Malformed(msg) => {
                ErrorResponse::forbidden(format!("Malformed token: {}", msg))
            }
            AuthError::Hashing(_) => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

/// Pull the token from the session cookie, falling back to a Bearer
/// Authorization header.
fn extract_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Get token service from app data
        let token_service = match req.app_data::<actix_web::web::Data<Arc<dyn TokenService>>>() {
            Some(service) => service,
            None => {
                tracing::error!("TokenService not found in app data");
                return ready(Err(AuthenticationError(AuthError::Malformed(
                    "Server configuration error".to_string(),
                ))));
            }
        };

        let token = match extract_token(req) {
            Some(t) => t,
            None => return ready(Err(AuthenticationError(AuthError::MissingToken))),
        };

        match token_service.verify(&token) {
            Ok(claims) => ready(Ok(Identity::from(claims))),
            Err(e) => ready(Err(AuthenticationError(e))),
        }
    }
}
