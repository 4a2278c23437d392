pub mod config;
pub mod dev;
