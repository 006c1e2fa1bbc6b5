use axum::{
    extract::State,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{MessageResponse, PublicUser},
        extractors::AuthUser,
        password::{hash_password, verify_password},
        repo_types::User,
    },
    error::AuthError,
    state::AppState,
    users::dto::{ChangePasswordRequest, UpdateProfileRequest},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/getuser", get(get_user))
        .route("/updateuser", patch(update_user).put(update_user))
        .route("/changepassword", patch(change_password))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AuthError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %user_id, "user not found");
            AuthError::NotFound("User not found".into())
        })?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, AuthError> {
    let user = User::update_profile(
        &state.db,
        user_id,
        payload.name.as_deref(),
        payload.photo.as_deref(),
        payload.phone.as_deref(),
        payload.bio.as_deref(),
    )
    .await?
    .ok_or_else(|| AuthError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let (Some(old_password), Some(password)) = (payload.old_password, payload.password) else {
        return Err(AuthError::Validation(
            "Please provide your old and new passwords".into(),
        ));
    };
    if old_password.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(
            "Please provide your old and new passwords".into(),
        ));
    }
    if password.len() < 6 {
        return Err(AuthError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".into()))?;

    if !verify_password(&old_password, &user.password_hash)? {
        warn!(user_id = %user.id, "change password with wrong old password");
        return Err(AuthError::Authentication(
            "Your current password is incorrect".into(),
        ));
    }

    let hash = hash_password(&password)?;
    User::set_password(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(Json(MessageResponse {
        message: "Password updated successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn change_password_rejects_missing_old_password() {
        let state = AppState::fake();
        let err = change_password(
            State(state),
            AuthUser(Uuid::new_v4()),
            Json(ChangePasswordRequest {
                old_password: None,
                password: Some("newpass1".into()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn change_password_rejects_empty_fields() {
        let state = AppState::fake();
        let err = change_password(
            State(state),
            AuthUser(Uuid::new_v4()),
            Json(ChangePasswordRequest {
                old_password: Some("".into()),
                password: Some("newpass1".into()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn change_password_rejects_short_new_password() {
        let state = AppState::fake();
        let err = change_password(
            State(state),
            AuthUser(Uuid::new_v4()),
            Json(ChangePasswordRequest {
                old_password: Some("old-secret".into()),
                password: Some("abc".into()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }
}
