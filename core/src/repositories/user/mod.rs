//! User repository module for account persistence.

mod r#trait;

pub use r#trait::UserRepository;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockUserRepository;

#[cfg(test)]
mod tests;
