//! Core: configuration, state assembly, error handling, server bootstrap

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{AppError, ok};
pub use server::Server;
pub use state::ServerState;
