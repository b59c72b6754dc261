// src/main.rs
mod dtos;
mod services;
mod handlers;
mod repositories;
mod models;
mod middleware;
mod config;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use actix_web::{App, HttpServer, web, middleware::Logger};
use actix_cors::Cors;
use reqwest::Client;
use log::{info, error};

use crate::config::{get_pg_pool, mask_key, AppConfig};
use crate::handlers::profile_picture_handlers::{health, profile_picture, upload_profile_picture};
use crate::middleware::auth_extractor::JwtVerifier;
use crate::repositories::picture_storage_repo::SupabaseStorage;
use crate::repositories::user_repository::PgUserDirectory;
use crate::services::profile_picture_service::ProfilePictureService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Supabase URL: {}", cfg.supabase_url);
    info!("Supabase Key: {}", mask_key(&cfg.supabase_service_role_key));
    info!("Profile pictures served from {}", cfg.picture_base_url);

    let pg_pool = match get_pg_pool() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create PG pool: {:#}", e);
            std::process::exit(1);
        }
    };

    let http_client = match Client::builder().user_agent("profile-pictures-be/0.1").build() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to build http client: {}", e);
            std::process::exit(1);
        }
    };

    let storage = SupabaseStorage::new(
        http_client,
        &cfg.supabase_url,
        &cfg.bucket,
        &cfg.supabase_service_role_key,
    );
    let pictures = web::Data::new(ProfilePictureService::new(
        Arc::new(PgUserDirectory::new(pg_pool)),
        Arc::new(storage),
        cfg.picture_base_url.clone(),
    ));
    let verifier = web::Data::new(JwtVerifier::new(&cfg.jwt_secret));

    let bind_address = cfg.bind_address();
    let cfg = web::Data::new(cfg);

    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                "authorization",
                "content-type",
                "accept",
                "x-requested-with"
            ])
            .supports_credentials()
            .max_age(3600);

        for origin in cfg.origins() {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(pictures.clone())
            .app_data(verifier.clone())
            .app_data(cfg.clone())
            .service(profile_picture)        // GET /image/profilepicture/{user_name}
            .service(upload_profile_picture) // POST /image/profilepicture
            .service(health)                 // GET /health
    })
    .bind(&bind_address)?
    .run()
    .await
}
