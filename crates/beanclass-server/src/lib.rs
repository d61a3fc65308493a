//! beanclass server
//!
//! CLI, configuration, HTTP API, and embedded web form for the dry bean
//! classifier.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod service;
pub mod source;
pub mod state;

pub use cli::*;
pub use config::*;
pub use error::AppError;
pub use models::*;
pub use server::*;
pub use source::BatchSource;
pub use state::*;
