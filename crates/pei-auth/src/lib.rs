//! # PEI Auth
//!
//! Bearer-token handling for the permission service.
//!
//! Tokens are issued by the platform's identity provider and only identify the
//! caller. Roles and school scope are *not* trusted from the token: they are
//! resolved from the profile store on every check so that a role change takes
//! effect as soon as the scope cache is invalidated.
//!
//! - [`claims`]: the access token claim set
//! - [`jwt`]: token creation (tests, tooling) and verification
//!
//! # Example
//!
//! ```ignore
//! use pei_auth::{create_access_token, verify_token};
//! use pei_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "teacher@escola.gov.br", &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
