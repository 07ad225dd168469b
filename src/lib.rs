pub mod cli;
pub mod commands;
pub mod config;
pub mod datasheet;
pub mod error;
pub mod gateway;
pub mod progress;
pub mod render;
pub mod shell;
pub mod storage;
