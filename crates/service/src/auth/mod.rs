//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and token issuing live here, independent of the HTTP layer.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod repo;
pub mod service;
pub mod token;

pub use service::{AuthConfig, AuthService};
