pub mod anonymize;
pub mod charts;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod mock;
pub mod output;
pub mod pipeline;
pub mod ranking;
pub mod records;
