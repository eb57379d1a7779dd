//! Database infrastructure: connection pool, transaction units, and the
//! MySQL implementations of the core persistence traits.

pub mod connection;
pub mod mysql;
pub mod tx;
