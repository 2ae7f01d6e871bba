//! Core types and the attendance directory service for Rollcall.
//!
//! This crate is free of HTTP and database dependencies.
//! Storage and biometric matching are injected through the
//! [`store::SnapshotStore`] and [`face::FaceMatcher`] traits.

// Native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod attendance;
pub mod clock;
pub mod config;
pub mod directory;
pub mod error;
pub mod face;
pub mod identity;
pub mod memory;
pub mod report;
pub mod seed;
pub mod store;
pub mod summary;

pub use directory::AttendanceDirectory;
pub use error::{Error, Result};
