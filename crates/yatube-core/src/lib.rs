//! # Yatube Core
//!
//! The domain layer of Yatube: entities, pagination, ports and the services
//! that drive feeds, posts, follows and accounts.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
pub use pagination::{PAGE_SIZE, Page, PageRequest, Paginator};
