//! # Yatube Shared
//!
//! Form payloads and validation messages shared between the web app and the
//! domain services.

pub mod dto;
pub mod errors;

pub use errors::FormErrors;
