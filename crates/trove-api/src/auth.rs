use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use trove_types::api::{
    ChangePasswordRequest, Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    UpdateProfileRequest,
};

use crate::{ApiError, AppState, blocking, dto};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.len() < 4 || req.username.len() > 20 {
        return Err(ApiError::bad_request("username must be 4-20 characters"));
    }
    if !req.email.contains('@') {
        return Err(ApiError::bad_request("invalid email address"));
    }
    if req.password.len() < 6 {
        return Err(ApiError::bad_request("password must be at least 6 characters"));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();
    let username = req.username.clone();

    let id = user_id.to_string();
    blocking(&state, move |db| {
        db.create_user(&id, &req.username, &req.email, &password_hash)
    })
    .await?;

    let token = create_token(&state.jwt_secret, user_id, &username)?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.clone();
    let user = blocking(&state, move |db| db.get_user_by_email(&email))
        .await?
        .ok_or(trove_db::Error::InvalidCredentials)?;

    verify_password(&req.password, &user.password)?;

    let user_id = dto::parse_id(&user.id);
    let token = create_token(&state.jwt_secret, user_id, &user.username)?;

    Ok(Json(LoginResponse { user_id, username: user.username, token }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let id = claims.sub.to_string();
    let user = blocking(&state, move |db| db.get_user_by_id(&id))
        .await?
        .ok_or(trove_db::Error::NotFound("user"))?;
    Ok(Json(dto::user_response(&user)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.len() < 4 || req.username.len() > 20 {
        return Err(ApiError::bad_request("username must be 4-20 characters"));
    }
    if !req.email.contains('@') {
        return Err(ApiError::bad_request("invalid email address"));
    }

    let id = claims.sub.to_string();
    blocking(&state, move |db| db.update_profile(&id, &req.username, &req.email)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.new_password.len() < 6 {
        return Err(ApiError::bad_request("password must be at least 6 characters"));
    }

    let id = claims.sub.to_string();
    let lookup = id.clone();
    let user = blocking(&state, move |db| db.get_user_by_id(&lookup))
        .await?
        .ok_or(trove_db::Error::NotFound("user"))?;

    // Current password must check out before anything changes.
    verify_password(&req.current_password, &user.password)
        .map_err(|_| ApiError::bad_request("current password is incorrect"))?;

    let password_hash = hash_password(&req.new_password)?;
    blocking(&state, move |db| db.update_password(&id, &password_hash)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let id = claims.sub.to_string();
    blocking(&state, move |db| db.delete_user(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ApiError::Internal)
}

fn verify_password(password: &str, stored_hash: &str) -> Result<(), ApiError> {
    let parsed_hash = PasswordHash::new(stored_hash).map_err(|_| ApiError::Internal)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| trove_db::Error::InvalidCredentials.into())
}

pub(crate) fn create_token(
    secret: &str,
    user_id: Uuid,
    username: &str,
) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| ApiError::Internal)
}
