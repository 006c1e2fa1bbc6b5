use serde::Deserialize;

/// Request body for profile update. Email is deliberately absent: it cannot
/// be changed through this path.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub photo: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}

/// Request body for changing the password while logged in. Optional at the
/// wire level so a missing field surfaces as a 400 validation failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub password: Option<String>,
}
