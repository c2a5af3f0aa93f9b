//! # docwiki-core
//!
//! Core crate for DocWiki. Contains configuration schemas, pagination and
//! sorting types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DocWiki crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
