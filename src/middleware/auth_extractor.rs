// src/middleware/auth_extractor.rs
use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use log::{debug, error};
use uuid::Uuid;

use crate::models::user::{CallerIdentity, JwtClaims};

/// HS256 verifier for bearer tokens, registered as app data.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<CallerIdentity, String> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| format!("token rejected: {}", e))?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|e| format!("invalid sub: {}", e))?;
        let user_name = data
            .claims
            .user_name
            .filter(|n| !n.is_empty())
            .ok_or("missing 'user_name' claim")?;

        Ok(CallerIdentity { user_id, user_name })
    }
}

/// Caller authenticated by `Authorization: Bearer <jwt>`.
pub struct AuthenticatedUser(pub CallerIdentity);

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<AuthenticatedUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(verifier) = req.app_data::<web::Data<JwtVerifier>>() else {
            error!("JwtVerifier is not registered");
            return ready(Err(ErrorInternalServerError("auth not configured")));
        };

        let auth_header = match req.headers().get("Authorization") {
            Some(header) => match header.to_str() {
                Ok(h) => h,
                Err(_) => return ready(Err(ErrorUnauthorized("Invalid header format"))),
            },
            None => return ready(Err(ErrorUnauthorized("Missing Authorization header"))),
        };

        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            return ready(Err(ErrorUnauthorized("Invalid auth header format")));
        };

        match verifier.verify(token.trim()) {
            Ok(identity) => ready(Ok(AuthenticatedUser(identity))),
            Err(e) => {
                debug!("auth failed: {}", e);
                ready(Err(ErrorUnauthorized("Invalid token")))
            }
        }
    }
}
