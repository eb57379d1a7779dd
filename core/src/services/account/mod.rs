//! Account service module
//!
//! Compound account operations: registration with initial token issuance
//! inside one transaction unit, and credential login.

mod hasher;
mod service;

#[cfg(test)]
mod tests;

pub use hasher::PasswordHasher;
pub use service::AccountService;
