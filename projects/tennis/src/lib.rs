//! Tennis odds and player statistics collector
//!
//! - RapidAPI feeds behind the traits in `sources/`
//! - Collection and merge pipelines in `pipelines/`
//! - CSV and JSON files on disk in `storage/`
//! - Dashboard routes in `endpoints/`
//! - Requires RAPIDAPI_KEY (plus RAPIDAPI_HOST for odds) env vars

pub mod config;
pub mod endpoints;
pub mod models;
pub mod pipelines;
pub mod sources;
pub mod storage;
pub mod utils;
