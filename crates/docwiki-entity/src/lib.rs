//! # docwiki-entity
//!
//! Domain entity models for DocWiki. Database entities derive `Debug`,
//! `Clone`, `Serialize`, `Deserialize`, and `sqlx::FromRow`. The
//! `directory` module additionally carries the pure tree logic: name
//! sanitization rules, materialized-path algebra, and flat-list tree
//! assembly. Nothing in this crate performs I/O.

pub mod directory;
