pub mod app;
pub mod chart;
pub mod config;
pub mod export;
pub mod feed;
pub mod label;
pub mod logging;
pub mod snapshot;
