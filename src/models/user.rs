use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of the `users` table as far as profile pictures are concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    /// Once true, `{id}.jpg` exists in the picture bucket.
    pub has_profile_picture: bool,
}

/// Caller resolved from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: Uuid,
    pub user_name: String,
}

/// Claims we expect in the access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// subject / user id
    pub sub: String,
    pub user_name: Option<String>,
    pub exp: usize,
}

static USER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("static regex"));

/// User names are restricted to ASCII letters, digits, `-`, `.` and `_`.
pub fn is_valid_user_name(user_name: &str) -> bool {
    USER_NAME_RE.is_match(user_name)
}
