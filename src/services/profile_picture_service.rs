// src/services/profile_picture_service.rs
use std::sync::Arc;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::{error, info, warn};
use thiserror::Error;

use crate::dtos::profile_picture_dtos::ApiResponse;
use crate::models::upload::UploadedFile;
use crate::models::user::{is_valid_user_name, CallerIdentity};
use crate::repositories::picture_storage_repo::{
    profile_picture_key, ObjectStorage, StorageError, DEFAULT_PICTURE_KEY,
};
use crate::repositories::user_repository::{DirectoryError, UserDirectory};

#[derive(Debug, Error)]
pub enum ProfilePictureError {
    #[error("user not found")]
    NotFound,
    #[error("not authenticated")]
    Unauthorized,
    #[error("no file uploaded")]
    BadRequest,
    #[error("picture storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
    #[error("user directory error: {0}")]
    Internal(#[from] DirectoryError),
}

impl ResponseError for ProfilePictureError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProfilePictureError::NotFound => StatusCode::NOT_FOUND,
            ProfilePictureError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProfilePictureError::BadRequest => StatusCode::BAD_REQUEST,
            ProfilePictureError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProfilePictureError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Backend details stay in the log.
        let message = match self {
            ProfilePictureError::StorageUnavailable(_) => "Failed to store profile picture".to_string(),
            ProfilePictureError::Internal(_) => "Failed to update user".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ApiResponse::error(message))
    }
}

/// Content type the picture is stored with. The bucket is public, so only
/// raster `image/*` types pass through; anything else, SVG included, is
/// stored as `image/jpeg` to match the `.jpg` key.
fn storage_content_type(declared: Option<&str>) -> String {
    declared
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .filter(|m| m.type_() == mime::IMAGE && m.subtype() != mime::SVG)
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| mime::IMAGE_JPEG.essence_str().to_string())
}

/// Resolves where a user's picture lives and stores new uploads.
#[derive(Clone)]
pub struct ProfilePictureService {
    users: Arc<dyn UserDirectory>,
    storage: Arc<dyn ObjectStorage>,
    public_base_url: String,
}

impl ProfilePictureService {
    /// `public_base_url` must end with `/`; keys are appended verbatim.
    pub fn new(
        users: Arc<dyn UserDirectory>,
        storage: Arc<dyn ObjectStorage>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            storage,
            public_base_url: public_base_url.into(),
        }
    }

    /// Public URL of the user's picture, or of the shared default image.
    pub async fn resolve_picture_location(&self, user_name: &str) -> Result<String, ProfilePictureError> {
        if !is_valid_user_name(user_name) {
            return Err(ProfilePictureError::NotFound);
        }

        let user = self
            .users
            .find_by_name(user_name)
            .await?
            .ok_or(ProfilePictureError::NotFound)?;

        let key = if user.has_profile_picture {
            profile_picture_key(user.id)
        } else {
            DEFAULT_PICTURE_KEY.to_string()
        };
        Ok(format!("{}{}", self.public_base_url, key))
    }

    /// Stores the first file part as the caller's picture. Parts after the
    /// first are ignored and no content validation happens.
    ///
    /// The object is written before the user flag, so a failure between the
    /// two never leaves `has_profile_picture` set without a stored picture.
    pub async fn upload_picture(
        &self,
        identity: Option<&CallerIdentity>,
        files: Vec<UploadedFile>,
    ) -> Result<(), ProfilePictureError> {
        let identity = identity.ok_or(ProfilePictureError::Unauthorized)?;
        let file = files.into_iter().next().ok_or(ProfilePictureError::BadRequest)?;

        let mut user = self
            .users
            .find_by_name(&identity.user_name)
            .await?
            .ok_or_else(|| {
                warn!("authenticated caller {} has no user record", identity.user_name);
                ProfilePictureError::Unauthorized
            })?;

        let key = profile_picture_key(user.id);
        let content_type = storage_content_type(file.content_type.as_deref());
        info!(
            "user {} ({}) uploading {:?} ({} bytes) as {}",
            user.user_name,
            identity.user_id,
            file.file_name.as_deref().unwrap_or(""),
            file.bytes.len(),
            key
        );

        if let Err(e) = self.storage.upload(&key, file.bytes, &content_type).await {
            error!("upload of {} failed: {}", key, e);
            return Err(e.into());
        }

        user.has_profile_picture = true;
        self.users.update(&user).await?;
        Ok(())
    }
}
