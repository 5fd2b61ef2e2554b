//! Business layer for Comparte Ride accounts.
//! - `auth`: sign-up, account verification and login on top of the `models` entities.
//! - `mail`: outbound email used to deliver verification tokens.

pub mod auth;
pub mod mail;
