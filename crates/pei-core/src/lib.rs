//! # PEI Core
//!
//! Core types shared by every crate of the PEI access service.
//!
//! - [`errors`]: the HTTP-facing [`AppError`] and its JSON body
//! - [`serde`]: small serde helpers for request payloads
//!
//! # Example
//!
//! ```ignore
//! use pei_core::AppError;
//!
//! let error = AppError::forbidden("Access denied");
//! ```

pub mod errors;
pub mod serde;

pub use errors::{AppError, ErrorResponse};
