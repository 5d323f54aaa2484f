//! # Picstream Shared Library
//!
//! This crate contains the persistence layer, the identity and upload
//! collaborators, and feed assembly used by the Picstream API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and embedded migrations
//! - `models`: Database models and their queries
//! - `feed`: Batched feed assembly
//! - `auth`: Tokens, password hashing and authorization checks
//! - `media`: Upload collaborator (ImageKit client and test double)

pub mod auth;
pub mod db;
pub mod feed;
pub mod media;
pub mod models;

/// Current version of the Picstream shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
