//! Data models for source descriptors and the sources file
//!
//! The sources file is a JSON document listing the source units to
//! aggregate. It is re-read on every pass so edits take effect without a
//! restart; a missing or malformed file is a fatal configuration error for
//! that request.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// One configured source unit
///
/// Immutable once read; owned by the aggregation engine for the duration of
/// a single pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Display label used in logs, reports, and failure markers
    pub name: String,
    /// Locator of the unit's executable, optionally `file://`-prefixed
    pub api: String,
    /// Arbitrary extra configuration, forwarded opaquely to the unit's
    /// initializer as serialized JSON
    #[serde(default)]
    pub ext: serde_json::Value,
}

/// The parsed sources file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Source descriptors in aggregation order
    #[serde(default)]
    pub lives: Vec<SourceDescriptor>,
}

impl SourcesConfig {
    /// Read and parse the sources file
    ///
    /// All failures map to [`AppError::Config`] since a request cannot
    /// proceed without a source list.
    pub async fn load_from_file(path: &Path) -> AppResult<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::config(format!("cannot read sources file {}: {e}", path.display()))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            AppError::config(format!("malformed sources file {}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_ext_defaults_to_null() {
        let config: SourcesConfig =
            serde_json::from_str(r#"{"lives":[{"name":"A","api":"a.src"}]}"#).unwrap();
        assert_eq!(config.lives.len(), 1);
        assert!(config.lives[0].ext.is_null());
    }

    #[test]
    fn empty_document_yields_empty_source_list() {
        let config: SourcesConfig = serde_json::from_str("{}").unwrap();
        assert!(config.lives.is_empty());
    }

    #[tokio::test]
    async fn missing_sources_file_is_a_config_error() {
        let err = SourcesConfig::load_from_file(Path::new("/nonexistent/iptv.json"))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
