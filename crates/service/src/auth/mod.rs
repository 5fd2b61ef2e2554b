//! Account workflows in three layers: domain types, a repository seam, and
//! the service that orchestrates sign-up, verification and login.

pub mod domain;
pub mod errors;
pub mod policy;
pub mod repo;
pub mod repository;
pub mod service;
pub mod token;
pub mod validation;

pub use service::{AuthConfig, AuthService};
