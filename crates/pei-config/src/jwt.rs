use std::env;

/// JWT settings shared with the identity provider that issues the tokens.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            access_token_expiry: crate::env_or("JWT_ACCESS_EXPIRY", 3600), // 1 hour
        }
    }
}
