//! SQLite persistence for projects, task sessions and notes.

mod connection;
mod helpers;
pub mod models;
mod repositories;
mod schema;

pub use connection::Database;
