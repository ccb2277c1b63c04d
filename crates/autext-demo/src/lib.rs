//! Command-line detector and demo web page for autext

pub mod cli;
pub mod config;
pub mod models;
pub mod render;
pub mod server;
pub mod state;

pub use cli::*;
pub use models::*;
pub use server::*;
pub use state::*;
