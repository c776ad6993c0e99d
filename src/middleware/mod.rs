//! Request extractors.
//!
//! - [`auth`]: bearer JWT authentication ([`auth::AuthUser`])
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn me(auth_user: AuthUser) -> Result<impl IntoResponse, AppError> {
//!     let user_id = auth_user.user_id()?;
//!     // ...
//! }
//! ```

pub mod auth;
