use axum::{
    extract::{FromRef, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
            ResetPasswordRequest,
        },
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::{ResetToken, User},
        services::{
            generate_reset_token, hash_reset_token, is_valid_email, logout_cookie,
            reset_email_body, reset_token_expiry, session_cookie, token_from_cookie_header,
        },
    },
    error::AuthError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/loginstatus", get(login_status))
        .route("/forgotpassword", post(forgot_password))
        .route("/resetpassword/:reset_token", put(reset_password))
}

fn set_cookie_header(cookie: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_str(cookie).map_err(|e| AuthError::Internal(e.into()))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), AuthError> {
    let (Some(name), Some(email), Some(password)) =
        (payload.name, payload.email, payload.password)
    else {
        return Err(AuthError::Validation(
            "Please provide name, email and password".into(),
        ));
    };
    let name = name.trim().to_string();
    let email = email.trim().to_lowercase();

    if name.is_empty() {
        return Err(AuthError::Validation("Please provide your name".into()));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AuthError::Validation(
            "Please provide a valid email".into(),
        ));
    }
    if password.len() < 6 {
        warn!("password too short");
        return Err(AuthError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AuthError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&password)?;

    // Defensive: the store must hand back the record it just created
    let user = User::create(&state.db, &name, &email, &hash)
        .await?
        .ok_or_else(|| {
            AuthError::InvalidState("Account could not be created, please try again".into())
        })?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        set_cookie_header(&session_cookie(&token, keys.ttl))?,
    );

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(AuthError::Validation(
            "Please provide email and password".into(),
        ));
    };
    let email = email.trim().to_lowercase();

    if email.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(
            "Please provide email and password".into(),
        ));
    }

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "login unknown email");
            AuthError::NotFound("No user found with that email".into())
        })?;

    // The cookie is issued and attached before the comparison result is
    // consulted; a failed login still carries the Set-Cookie header.
    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    let cookie = set_cookie_header(&session_cookie(&token, keys.ttl))?;

    let ok = verify_password(&password, &user.password_hash)?;
    if !ok {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        let mut res =
            AuthError::Authentication("Invalid email or password entered.".into()).into_response();
        res.headers_mut().insert(header::SET_COOKIE, cookie);
        return Ok(res);
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    let mut res = Json(AuthResponse {
        token,
        user: user.into(),
    })
    .into_response();
    res.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(res)
}

#[instrument]
pub async fn logout() -> Result<(HeaderMap, Json<MessageResponse>), AuthError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, set_cookie_header(&logout_cookie())?);
    Ok((
        headers,
        Json(MessageResponse {
            message: "Logged out successfully".into(),
        }),
    ))
}

/// Never fails: any missing, malformed or expired cookie is simply `false`.
#[instrument(skip(state, headers))]
pub async fn login_status(State(state): State<AppState>, headers: HeaderMap) -> Json<bool> {
    let keys = JwtKeys::from_ref(&state);
    let logged_in = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header)
        .map(|token| keys.verify(token).is_ok())
        .unwrap_or(false);
    Json(logged_in)
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let Some(email) = payload.email else {
        return Err(AuthError::Validation("Please provide your email".into()));
    };
    let email = email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "forgot password for unknown email");
            AuthError::NotFound("No user found with that email".into())
        })?;

    // One live token per user
    ResetToken::delete_for_user(&state.db, user.id).await?;

    let plaintext = generate_reset_token(user.id);
    let token_hash = hash_reset_token(&plaintext);
    ResetToken::create(&state.db, user.id, &token_hash, reset_token_expiry()).await?;

    let reset_url = format!(
        "{}/resetpassword/{}",
        state.config.frontend_url.trim_end_matches('/'),
        plaintext
    );

    // No rollback on failure: the token stays valid until it expires even if
    // this email never arrives.
    if let Err(e) = state
        .mailer
        .send(
            &user.email,
            "Your password reset link (valid for 30 minutes)",
            &reset_email_body(&reset_url),
        )
        .await
    {
        return Err(AuthError::Delivery(format!(
            "There was an error sending the email: {e}"
        )));
    }

    info!(user_id = %user.id, "password reset email sent");
    Ok(Json(MessageResponse {
        message: "Token sent to email".into(),
    }))
}

#[instrument(skip(state, payload, reset_token))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(reset_token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let Some(password) = payload.password else {
        return Err(AuthError::Validation("Please provide a new password".into()));
    };
    if password.len() < 6 {
        return Err(AuthError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    let token_hash = hash_reset_token(&reset_token);
    let token = ResetToken::find_live_by_hash(&state.db, &token_hash)
        .await?
        .ok_or_else(|| {
            warn!("reset token invalid or expired");
            AuthError::InvalidToken("Token is invalid or has expired".into())
        })?;

    let user = User::find_by_id(&state.db, token.user_id)
        .await?
        .ok_or_else(|| AuthError::NotFound("No user found for this token".into()))?;

    let hash = hash_password(&password)?;
    User::set_password(&state.db, user.id, &hash).await?;
    ResetToken::mark_used(&state.db, token.id).await?;

    info!(user_id = %user.id, "password reset completed");
    Ok(Json(MessageResponse {
        message: "Password has been reset, you can now log in".into(),
    }))
}
