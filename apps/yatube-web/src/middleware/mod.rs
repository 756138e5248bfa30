//! Session extractors and the error pages.

pub mod auth;
pub mod error;
