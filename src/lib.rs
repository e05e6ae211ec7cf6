pub mod backdrop;
pub mod client;
pub mod config;
pub mod errors;
pub mod server;
pub mod storage;
