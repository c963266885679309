//! REST client for the fintrack backend.
//!
//! Implements the [`fintrack_core::sync::RemoteStore`] trait over HTTP so the
//! sync engine never sees transport concerns.

pub mod client;
pub mod error;
pub mod types;

pub use client::RemoteClient;
pub use error::{RemoteError, Result};
