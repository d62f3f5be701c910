pub mod rankings;
pub mod recorder;
pub mod server;
pub mod statistics;
pub mod tournaments;
