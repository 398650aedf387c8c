//! Bearer-token identity resolution.
//!
//! Tokens are provisioned outside this service. The middleware only maps a
//! presented token to a user; handlers decide what an absent caller means.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Role, User};
use crate::state::AppState;

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for Caller {
    fn from(user: User) -> Self {
        Caller {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Hex SHA-256 of a raw token, the form tokens are stored in.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Attaches a `Caller` to the request when the bearer token resolves to a user.
/// Unknown or missing tokens pass through without one.
pub async fn resolve_caller(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = bearer_token(request.headers()) {
        match state.store.find_user_by_token_hash(&hash_token(token)).await? {
            Some(user) => {
                debug!(user_id = %user.id, "Resolved caller");
                request.extensions_mut().insert(Caller::from(user));
            }
            None => debug!("Bearer token did not match any user"),
        }
    }
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
