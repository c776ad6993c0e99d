//! JWT claim structures.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access token claims.
///
/// - `sub`: user id (UUID string)
/// - `email`: user's email address
/// - `exp` / `iat`: expiry and issued-at Unix timestamps
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}
