//! Session store module for refresh session persistence.

mod r#trait;

pub use r#trait::SessionStore;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockSessionStore;

#[cfg(test)]
mod tests;
