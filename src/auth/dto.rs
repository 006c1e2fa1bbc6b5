use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::User;

/// Request body for user registration. Fields are optional at the wire level
/// so a missing one surfaces as a 400 validation failure, not a decode error.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for requesting a password reset email.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

/// Request body for completing a password reset.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Plain confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Public part of the user returned to the client. The password hash is kept
/// out structurally: there is no field for it to leak through.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            photo: u.photo,
            phone: u.phone,
            bio: u.bio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn make_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ann".into(),
            email: "ann@x.com".into(),
            password_hash: "$argon2id$fake".into(),
            photo: None,
            phone: Some("555-0100".into()),
            bio: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn public_user_never_serializes_password() {
        let public: PublicUser = make_user().into();
        let json = serde_json::to_string(&public).unwrap();
        assert!(json.contains("ann@x.com"));
        assert!(json.contains("555-0100"));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn request_bodies_tolerate_missing_fields() {
        let body: RegisterRequest = serde_json::from_str(r#"{"email":"ann@x.com"}"#).unwrap();
        assert!(body.name.is_none());
        assert_eq!(body.email.as_deref(), Some("ann@x.com"));
        assert!(body.password.is_none());

        let body: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(body.email.is_none());
        assert!(body.password.is_none());
    }

    #[test]
    fn auth_response_contains_token_and_user() {
        let response = AuthResponse {
            token: "jwt-goes-here".into(),
            user: make_user().into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("jwt-goes-here"));
        assert!(json.contains("\"id\""));
        assert!(json.contains("\"name\""));
        assert!(!json.contains("password"));
    }
}
