use serde::{Deserialize, Serialize};

/// Request body for registration. Missing fields deserialize as empty
/// and are rejected by validation like blank ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl RegisterRequest {
    /// Name of the first blank required field, if any.
    pub fn first_blank_field(&self) -> Option<&'static str> {
        [
            ("username", &self.username),
            ("email", &self.email),
            ("password", &self.password),
        ]
        .into_iter()
        .find(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
    }

    /// Blank full names are stored as NULL.
    pub fn full_name(&self) -> Option<String> {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
}
