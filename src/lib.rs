pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod services;
pub mod utils;

pub use error::CooccurError;
