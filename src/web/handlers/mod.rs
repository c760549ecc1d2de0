//! HTTP request handlers organized by endpoint

pub mod diagnostics;
pub mod health;
pub mod playlist;
