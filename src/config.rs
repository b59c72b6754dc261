// src/config.rs
use std::env;
use anyhow::{Context, Result};
use deadpool_postgres::{Config, Pool, Runtime, PoolConfig};
use tokio_postgres::NoTls;

const DEFAULT_BUCKET: &str = "profile-pictures";
const DEFAULT_CHANGE_PICTURE_REDIRECT: &str = "/auth/change-profile-picture";

/// Everything the server reads from the environment at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: String,
    pub allowed_origins: String,
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    pub bucket: String,
    /// Public URL prefix of the bucket, always ending in `/`.
    pub picture_base_url: String,
    pub change_picture_redirect: String,
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let supabase_url = env::var("SUPABASE_URL")
            .context("SUPABASE_URL not set")?
            .trim()
            .trim_end_matches('/')
            .to_string();
        let supabase_service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .context("SUPABASE_SERVICE_ROLE_KEY not set")?
            .trim()
            .to_string();
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;

        let bucket = env::var("PROFILE_PICTURE_BUCKET")
            .unwrap_or_else(|_| DEFAULT_BUCKET.to_string());
        let picture_base_url = env::var("PROFILE_PICTURE_BASE_URL").ok();

        Ok(Self {
            port: env::var("PORT").unwrap_or_else(|_| "8080".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".into()),
            picture_base_url: public_base_url(&supabase_url, &bucket, picture_base_url.as_deref()),
            supabase_url,
            supabase_service_role_key,
            bucket,
            change_picture_redirect: env::var("CHANGE_PICTURE_REDIRECT")
                .unwrap_or_else(|_| DEFAULT_CHANGE_PICTURE_REDIRECT.to_string()),
            jwt_secret,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Supabase serves public buckets under `/storage/v1/object/public/{bucket}/`.
pub fn public_base_url(supabase_url: &str, bucket: &str, explicit: Option<&str>) -> String {
    let base = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(url) => url.to_string(),
        None => format!(
            "{}/storage/v1/object/public/{}",
            supabase_url.trim_end_matches('/'),
            bucket
        ),
    };
    format!("{}/", base.trim_end_matches('/'))
}

pub fn mask_key(k: &str) -> String {
    let chars: Vec<char> = k.chars().collect();
    if chars.len() <= 8 { return "[REDACTED]".to_string(); }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

pub fn get_pg_pool() -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(env::var("PG_HOST").context("PG_HOST not set")?);
    cfg.user = Some(env::var("PG_USER").context("PG_USER not set")?);
    cfg.password = env::var("PG_PASS").ok();
    cfg.dbname = Some(env::var("PG_DB").context("PG_DB not set")?);

    let pool_cfg = cfg.pool.get_or_insert_with(PoolConfig::default);
    pool_cfg.max_size = 16;

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
       .context("failed to create postgres pool")
}
