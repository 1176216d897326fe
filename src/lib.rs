pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod response;
pub mod server;
pub mod services;
pub mod state;
pub mod types;
