// In-memory stand-ins for the user directory and picture bucket.
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use actix_web::web::Bytes;
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::upload::UploadedFile;
use crate::models::user::{JwtClaims, User};
use crate::repositories::picture_storage_repo::{ObjectStorage, StorageError};
use crate::repositories::user_repository::{DirectoryError, UserDirectory};

pub const BASE_URL: &str = "https://storage.test/profile-pictures/";

pub fn alice(has_profile_picture: bool) -> User {
    User {
        id: Uuid::parse_str("00000000-0000-0000-0000-000000000042").unwrap(),
        user_name: "alice".to_string(),
        has_profile_picture,
    }
}

/// HS256 token valid for an hour.
pub fn issue_token(secret: &str, sub: &str, user_name: Option<&str>) -> String {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
        + 3600;
    let claims = JwtClaims {
        sub: sub.to_string(),
        user_name: user_name.map(str::to_string),
        exp,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

pub fn file_part(name: &str, bytes: &'static [u8]) -> UploadedFile {
    typed_file_part(name, Some("image/jpeg"), bytes)
}

pub fn typed_file_part(name: &str, content_type: Option<&str>, bytes: &'static [u8]) -> UploadedFile {
    UploadedFile {
        file_name: Some(name.to_string()),
        content_type: content_type.map(str::to_string),
        bytes: Bytes::from_static(bytes),
    }
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<String, User>>,
    updates: Mutex<usize>,
}

impl InMemoryUserDirectory {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let dir = Self::default();
        dir.users
            .lock()
            .unwrap()
            .extend(users.into_iter().map(|u| (u.user_name.clone(), u)));
        dir
    }

    pub fn get(&self, user_name: &str) -> Option<User> {
        self.users.lock().unwrap().get(user_name).cloned()
    }

    pub fn update_count(&self) -> usize {
        *self.updates.lock().unwrap()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_name(&self, user_name: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self.get(user_name))
    }

    async fn update(&self, user: &User) -> Result<(), DirectoryError> {
        let mut users = self.users.lock().unwrap();
        let existing = users
            .values_mut()
            .find(|u| u.id == user.id)
            .ok_or(DirectoryError::NotFound)?;
        *existing = user.clone();
        *self.updates.lock().unwrap() += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingStorage {
    objects: Mutex<BTreeMap<String, (Bytes, String)>>,
    fail: bool,
}

impl RecordingStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).map(|(bytes, _)| bytes.clone())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.lock().unwrap().get(key).map(|(_, ct)| ct.clone())
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn upload(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Rejected(503, "bucket offline".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }
}

pub const BOUNDARY: &str = "----picture-test-boundary";

/// `multipart/form-data` body; parts without a filename are plain form fields.
/// File parts are declared as `image/jpeg`.
pub fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
    let mut body = String::new();
    for (name, file_name, content) in parts {
        match file_name {
            Some(file_name) => push_part(&mut body, name, Some((*file_name, "image/jpeg")), content),
            None => push_part(&mut body, name, None, content),
        }
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body.into_bytes()
}

/// File parts as `(name, filename, content type, content)`.
pub fn multipart_body_typed(parts: &[(&str, &str, &str, &str)]) -> Vec<u8> {
    let mut body = String::new();
    for (name, file_name, content_type, content) in parts {
        push_part(&mut body, name, Some((*file_name, *content_type)), content);
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body.into_bytes()
}

fn push_part(body: &mut String, name: &str, file: Option<(&str, &str)>, content: &str) {
    body.push_str(&format!("--{BOUNDARY}\r\n"));
    match file {
        Some((file_name, content_type)) => {
            body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
            ));
            body.push_str(&format!("Content-Type: {content_type}\r\n"));
        }
        None => {
            body.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n"));
        }
    }
    body.push_str("\r\n");
    body.push_str(content);
    body.push_str("\r\n");
}

pub fn test_config() -> AppConfig {
    AppConfig {
        port: "0".to_string(),
        allowed_origins: String::new(),
        supabase_url: "https://supabase.test".to_string(),
        supabase_service_role_key: "service-role-key".to_string(),
        bucket: "profile-pictures".to_string(),
        picture_base_url: BASE_URL.to_string(),
        change_picture_redirect: "/auth/change-profile-picture".to_string(),
        jwt_secret: "unused".to_string(),
    }
}
