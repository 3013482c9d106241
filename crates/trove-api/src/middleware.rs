use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use trove_types::api::Claims;

use crate::AppState;

/// Extract and validate the JWT from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = claims_from_request(&req, &state.jwt_secret).ok_or(StatusCode::UNAUTHORIZED)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Claims carried by routes behind [`optional_auth`]; `None` for anonymous
/// callers.
#[derive(Debug, Clone)]
pub struct OptionalClaims(pub Option<Claims>);

/// Like [`require_auth`] but anonymous requests pass through without
/// claims. Used on public pages that show extra detail to signed-in users.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let claims = claims_from_request(&req, &state.jwt_secret);
    req.extensions_mut().insert(OptionalClaims(claims));
    next.run(req).await
}

fn claims_from_request(req: &Request, secret: &str) -> Option<Claims> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;
    let token = auth_header.strip_prefix("Bearer ")?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}
