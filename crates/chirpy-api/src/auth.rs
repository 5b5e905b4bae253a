use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};

use chirpy_auth::{issue_refresh_token, verify_password_or_dummy};
use chirpy_db::{StoreError, UserUpdate};
use chirpy_types::api::{
    CreateUserRequest, LoginRequest, LoginResponse, RefreshResponse, UpdateUserRequest,
    UserResponse,
};

use crate::error::ApiError;
use crate::middleware::{AuthUser, BearerToken};
use crate::state::{AppState, run_blocking};

fn check_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if password.is_empty() {
        return Err(ApiError::BadRequest("Password must not be empty".into()));
    }
    Ok(())
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_credentials(&req.email, &req.password)?;

    let user = run_blocking(&state, move |s| s.db.create_user(&req.email, &req.password)).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            email: user.email,
        }),
    ))
}

/// POST /api/login
///
/// An unknown email and a wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = run_blocking(&state, move |s| -> Result<LoginResponse, ApiError> {
        let user = match s.db.get_user_by_email(&req.email) {
            Ok(user) => Some(user),
            Err(StoreError::NotFound(_)) => None,
            Err(e) => return Err(ApiError::from(e)),
        };

        if let Err(e) =
            verify_password_or_dummy(&req.password, user.as_ref().map(|u| u.password_hash.as_str()))
        {
            warn!("Failed login attempt");
            return Err(e.into());
        }
        let Some(user) = user else {
            return Err(ApiError::Unauthorized("Invalid email or password"));
        };

        let token = s.tokens.issue_access_token(user.id)?;
        let session = issue_refresh_token();
        let refresh_token = session.token.clone();

        s.db.start_session(user.id, &user.password_hash, session)?;

        info!("User {} logged in", user.id);
        Ok(LoginResponse {
            id: user.id,
            email: user.email,
            token,
            refresh_token,
        })
    })
    .await?;

    Ok(Json(response))
}

/// PUT /api/users
///
/// Replaces email and password of the caller. The stored session is cleared,
/// so the user has to log in again to get a new refresh token.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_credentials(&req.email, &req.password)?;

    let user = run_blocking(&state, move |s| {
        s.db.replace_user(
            user_id,
            UserUpdate {
                email: req.email,
                password: req.password,
                session: None,
            },
        )
    })
    .await?;

    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
    }))
}

/// POST /api/refresh
///
/// Exchanges a refresh token for a new access token.
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(refresh_token): BearerToken,
) -> Result<impl IntoResponse, ApiError> {
    let token = run_blocking(&state, move |s| -> Result<String, ApiError> {
        let user_id = s.db.authenticate_refresh(&refresh_token)?;
        Ok(s.tokens.issue_access_token(user_id)?)
    })
    .await?;

    Ok(Json(RefreshResponse { token }))
}

/// POST /api/revoke
pub async fn revoke(
    State(state): State<AppState>,
    BearerToken(refresh_token): BearerToken,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(&state, move |s| {
        s.db.revoke_refresh(&refresh_token).map_err(|e| match e {
            StoreError::NotFound(_) => ApiError::Unauthorized("No session found for this token"),
            e => e.into(),
        })
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
