pub mod connection;
pub mod matches;
pub mod models;
pub mod players;
pub mod ratings;
pub mod setup;
pub mod tournaments;

pub use connection::{DbConn, DbPool, create_pool, get_connection};
pub use models::*;
