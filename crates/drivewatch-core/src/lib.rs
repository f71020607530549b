pub mod config;
pub mod logging;

pub mod downloader;
pub mod link;
pub mod monitor;
pub mod transfer;
