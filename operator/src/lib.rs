pub mod config;
pub mod flows;
