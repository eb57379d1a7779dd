//! Business services orchestrating the domain layer.

pub mod account;
pub mod signer;
pub mod token;

pub use account::{AccountService, PasswordHasher};
pub use signer::CredentialSigner;
pub use token::{TokenService, TokenServiceConfig};
