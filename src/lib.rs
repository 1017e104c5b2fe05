pub mod app;
pub mod cli;
pub mod config;
pub mod journal;
pub mod render;
pub mod storage;
pub mod toast;
pub mod ui;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
