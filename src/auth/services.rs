use lazy_static::lazy_static;
use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Reset tokens stay valid for 30 minutes.
pub const RESET_TOKEN_TTL: Duration = Duration::minutes(30);

/// Cookie carrying the signed identity token.
pub const TOKEN_COOKIE: &str = "token";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Set-Cookie value for a freshly issued identity token.
/// SameSite=None so the browser sends it on cross-site requests from the
/// frontend origin; that in turn requires Secure.
pub fn session_cookie(token: &str, max_age: std::time::Duration) -> String {
    format!(
        "{TOKEN_COOKIE}={token}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=None",
        max_age.as_secs()
    )
}

/// Set-Cookie value that makes the client discard the identity token.
pub fn logout_cookie() -> String {
    format!(
        "{TOKEN_COOKIE}=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; HttpOnly; Secure; SameSite=None"
    )
}

/// Pull the identity token out of a raw Cookie header value.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(TOKEN_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .filter(|v| !v.is_empty())
    })
}

/// Generate a plaintext reset token: 32 random bytes hex-encoded, with the
/// owning user id appended. The plaintext goes to the user's inbox; only
/// [`hash_reset_token`] of it is persisted.
pub fn generate_reset_token(user_id: Uuid) -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", hex::encode(bytes), user_id)
}

/// One-way hash of a plaintext reset token, as stored and looked up.
pub fn hash_reset_token(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}

pub fn reset_token_expiry() -> OffsetDateTime {
    OffsetDateTime::now_utc() + RESET_TOKEN_TTL
}

pub fn reset_email_body(reset_url: &str) -> String {
    format!(
        "Hello,\n\n\
        A password reset was requested for your account.\n\n\
        To choose a new password, open the link below:\n\n\
        {reset_url}\n\n\
        This link is valid for 30 minutes and can be used once.\n\n\
        If you did not request this reset, you can safely ignore this email."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_and_rejects() {
        assert!(is_valid_email("ann@x.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@x.com"));
        assert!(!is_valid_email("spaces in@x.com"));
    }

    #[test]
    fn session_cookie_carries_required_flags() {
        let cookie = session_cookie("abc.def.ghi", std::time::Duration::from_secs(86400));
        assert!(cookie.starts_with("token=abc.def.ghi;"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
    }

    #[test]
    fn logout_cookie_expires_in_the_past() {
        let cookie = logout_cookie();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970"));
    }

    #[test]
    fn token_is_parsed_out_of_cookie_header() {
        assert_eq!(
            token_from_cookie_header("token=abc123"),
            Some("abc123")
        );
        assert_eq!(
            token_from_cookie_header("theme=dark; token=abc123; lang=en"),
            Some("abc123")
        );
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        // an emptied-out logout cookie is not a token
        assert_eq!(token_from_cookie_header("token="), None);
        // prefix collisions must not match
        assert_eq!(token_from_cookie_header("tokenish=abc"), None);
    }

    #[test]
    fn reset_token_embeds_user_id_and_entropy() {
        let user_id = Uuid::new_v4();
        let a = generate_reset_token(user_id);
        let b = generate_reset_token(user_id);
        assert!(a.ends_with(&user_id.to_string()));
        // 32 bytes hex-encoded, then the uuid
        assert_eq!(a.len(), 64 + user_id.to_string().len());
        assert_ne!(a, b);
    }

    #[test]
    fn reset_token_hash_is_deterministic_and_opaque() {
        let token = generate_reset_token(Uuid::new_v4());
        let h1 = hash_reset_token(&token);
        let h2 = hash_reset_token(&token);
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64); // sha256 hex
        assert!(!h1.contains(&token));
    }

    #[test]
    fn reset_token_expiry_is_thirty_minutes_out() {
        let expiry = reset_token_expiry();
        let delta = expiry - OffsetDateTime::now_utc();
        assert!(delta > Duration::minutes(29));
        assert!(delta <= Duration::minutes(30));
    }
}
