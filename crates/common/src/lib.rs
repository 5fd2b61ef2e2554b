//! Pieces shared by every crate in the workspace: logging setup and the
//! small response bodies that do not belong to a domain.

pub mod types;
pub mod utils;
