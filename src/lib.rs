pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod web;
