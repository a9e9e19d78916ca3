pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod logging;
pub mod query;
pub mod sanitize;
pub mod storage;
