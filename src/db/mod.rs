//! Persistence backends

pub mod sqlite;
