// src/dtos/profile_picture_dtos.rs
use serde::Serialize;

/// Envelope shared by every JSON response of the API.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub bucket: String,
}
