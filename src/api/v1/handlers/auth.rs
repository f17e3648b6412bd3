/*
 * Responsibility
 * - POST /users/create (signup), POST /login, POST /logout
 * - 成功時に token を発行し cookie (+ x-auth-token header) で返す
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;

use crate::{
    api::v1::dto::{
        auth::LoginRequest,
        users::{CreateUserRequest, UserResponse},
    },
    error::AppError,
    repos::user_repo::{self, NewUser, UserRow},
    services::password,
    state::AppState,
};

const INCORRECT_DETAILS: &str = "Incorrect details";

fn token_headers(state: &AppState, user: &UserRow) -> Result<HeaderMap, AppError> {
    let issued = state.auth.issue(&user.user_id.to_string(), Utc::now())?;
    state.cookies.deliver(&issued)
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, HeaderMap, Json<UserResponse>), AppError> {
    let signup = req
        .validate(Utc::now().date_naive())
        .map_err(AppError::BadRequest)?;

    if user_repo::exists(&state.db, &signup.email, &signup.username).await? {
        return Err(AppError::bad_request("User already exists"));
    }

    let password_hash = password::hash_password(signup.password).await?;

    // A concurrent signup can still win the race; the unique index turns that into Conflict
    let row = user_repo::create(
        &state.db,
        &NewUser {
            username: &signup.username,
            first_name: &signup.first_name,
            middle_name: signup.middle_name.as_deref(),
            surname: &signup.surname,
            email: &signup.email,
            password_hash: &password_hash,
            dob: signup.dob,
            country: &signup.country,
            gender: &signup.gender,
        },
    )
    .await?;

    let headers = token_headers(&state, &row)?;
    tracing::info!(user_id = %row.user_id, "user created");

    Ok((StatusCode::CREATED, headers, Json(row.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<UserResponse>), AppError> {
    let Some(user) = user_repo::find_by_login(&state.db, &req.login()).await? else {
        return Err(AppError::bad_request(INCORRECT_DETAILS));
    };

    if !password::verify_password(user.password_hash.clone(), req.password).await? {
        tracing::info!(user_id = %user.user_id, "login failed: wrong password");
        return Err(AppError::bad_request(INCORRECT_DETAILS));
    }

    let headers = token_headers(&state, &user)?;
    tracing::info!(user_id = %user.user_id, "user logged in");

    Ok((headers, Json(user.into())))
}

/// Clears the cookie. Tokens are stateless, so nothing is revoked server-side.
pub async fn logout(State(state): State<AppState>) -> Result<(StatusCode, HeaderMap), AppError> {
    Ok((StatusCode::NO_CONTENT, state.cookies.clear()?))
}
