pub mod api;
pub mod clients;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod utils;
