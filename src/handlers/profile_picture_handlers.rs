// src/handlers/profile_picture_handlers.rs
use actix_multipart::Multipart;
use actix_web::{get, http::header, post, web, HttpResponse, Responder};
use futures::TryStreamExt;
use log::debug;

use crate::config::AppConfig;
use crate::dtos::profile_picture_dtos::{ApiResponse, HealthOut};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::upload::UploadedFile;
use crate::services::profile_picture_service::ProfilePictureService;

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// GET /image/profilepicture/{user_name}
/// Redirects to the user's picture in the public bucket.
#[get("/image/profilepicture/{user_name}")]
pub async fn profile_picture(
    svc: web::Data<ProfilePictureService>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    let user_name = path.into_inner();
    let location = svc.resolve_picture_location(&user_name).await?;
    debug!("profile picture of {} -> {}", user_name, location);
    Ok(redirect(&location))
}

/// POST /image/profilepicture
/// Multipart upload of the caller's new picture (authenticated endpoint).
#[post("/image/profilepicture")]
pub async fn upload_profile_picture(
    auth_user: Option<AuthenticatedUser>,
    svc: web::Data<ProfilePictureService>,
    cfg: web::Data<AppConfig>,
    payload: Multipart,
) -> actix_web::Result<HttpResponse> {
    let identity = auth_user.map(|AuthenticatedUser(identity)| identity);
    // Without an identity the body is never read.
    let files = match identity {
        Some(_) => collect_file_parts(payload).await?,
        None => Vec::new(),
    };

    svc.upload_picture(identity.as_ref(), files).await?;
    Ok(redirect(&cfg.change_picture_redirect))
}

/// Collects parts that declare a non-empty filename, in arrival order.
/// Browsers send `filename=""` for an empty file input; such parts count as
/// plain form fields. Only the first file part is kept in memory, later
/// parts are read and discarded.
async fn collect_file_parts(mut payload: Multipart) -> actix_web::Result<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(mut field) = payload.try_next().await? {
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|name| name.trim_matches('"'))
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        if file_name.is_none() || !files.is_empty() {
            while field.try_next().await?.is_some() {}
            continue;
        }

        let content_type = field.content_type().map(|m| m.to_string());
        let mut buf = web::BytesMut::new();
        while let Some(chunk) = field.try_next().await? {
            buf.extend_from_slice(&chunk);
        }
        files.push(UploadedFile {
            file_name,
            content_type,
            bytes: buf.freeze(),
        });
    }

    Ok(files)
}

/// GET /health
#[get("/health")]
pub async fn health(cfg: web::Data<AppConfig>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(
        "ok",
        HealthOut {
            bucket: cfg.bucket.clone(),
        },
    ))
}
