//! Authentication extractors.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header};
use std::future::{Ready, ready};
use std::sync::Arc;

use postline_core::domain::CurrentUser;
use postline_core::ports::{AuthError, IdentityProvider};

/// Authenticated user extractor.
///
/// Use this in handlers to require a signed-in caller:
/// ```ignore
/// async fn create_post(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.0.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub CurrentUser);

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
        actix_web::http::StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use postline_shared::ErrorResponse;

        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your session has expired. Please sign in again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a valid Bearer token in the Authorization header."),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

fn authenticate(req: &HttpRequest) -> Result<CurrentUser, AuthError> {
    let provider = req
        .app_data::<actix_web::web::Data<Arc<dyn IdentityProvider>>>()
        .ok_or_else(|| {
            tracing::error!("IdentityProvider not found in app data");
            AuthError::InvalidToken("Server configuration error".to_string())
        })?;

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    provider.verify(token)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(Identity).map_err(AuthenticationError))
    }
}

/// Optional identity extractor - anonymous when no valid token is present.
pub struct OptionalIdentity(pub Option<CurrentUser>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match authenticate(req) {
            Ok(user) => ready(Ok(OptionalIdentity(Some(user)))),
            Err(AuthError::MissingAuth) => ready(Ok(OptionalIdentity(None))),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable credentials");
                ready(Ok(OptionalIdentity(None)))
            }
        }
    }
}
