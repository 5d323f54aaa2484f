//! # Picstream API Server Library
//!
//! HTTP surface of Picstream: authentication, media upload, the feed,
//! likes and comments.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Form extraction for urlencoded and multipart bodies
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
