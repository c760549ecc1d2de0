//! Source descriptor locator resolution
//!
//! Resolution is purely syntactic: strip a recognized scheme prefix, then
//! make the path absolute against the current working directory. Existence
//! checks belong to the loader.

use std::path::{Path, PathBuf};

use crate::errors::LocatorError;
use crate::models::SourceDescriptor;

/// Scheme prefix stripped from locators before path resolution
const FILE_SCHEME_PREFIX: &str = "file://";

/// An absolute, filesystem-normalized locator for one source unit
///
/// Invariant: the wrapped path is always absolute after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocator(PathBuf);

impl ResolvedLocator {
    /// The absolute path of the unit's executable
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Diagnostic label derived from the unit's file name
    pub fn file_label(&self) -> String {
        self.0
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl std::fmt::Display for ResolvedLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Resolve a descriptor's locator into an absolute path
pub fn resolve(descriptor: &SourceDescriptor) -> Result<ResolvedLocator, LocatorError> {
    let raw = descriptor.api.trim();
    if raw.is_empty() {
        return Err(LocatorError::Empty {
            name: descriptor.name.clone(),
        });
    }

    let stripped = raw.strip_prefix(FILE_SCHEME_PREFIX).unwrap_or(raw);
    let path = PathBuf::from(stripped);

    let absolute = if path.is_absolute() {
        path
    } else {
        let cwd = std::env::current_dir().map_err(|e| LocatorError::Unresolvable {
            name: descriptor.name.clone(),
            locator: raw.to_string(),
            message: format!("cannot determine working directory: {e}"),
        })?;
        cwd.join(path)
    };

    Ok(ResolvedLocator(absolute))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(api: &str) -> SourceDescriptor {
        SourceDescriptor {
            name: "test".to_string(),
            api: api.to_string(),
            ext: serde_json::Value::Null,
        }
    }

    #[test]
    fn absolute_locator_is_taken_literally() {
        let resolved = resolve(&descriptor("/opt/units/cctv.src")).unwrap();
        assert_eq!(resolved.path(), Path::new("/opt/units/cctv.src"));
    }

    #[test]
    fn file_scheme_prefix_is_stripped() {
        let resolved = resolve(&descriptor("file:///opt/units/cctv.src")).unwrap();
        assert_eq!(resolved.path(), Path::new("/opt/units/cctv.src"));
    }

    #[test]
    fn relative_locator_is_joined_against_cwd() {
        let resolved = resolve(&descriptor("units/cctv.src")).unwrap();
        assert!(resolved.path().is_absolute());
        assert!(resolved.path().ends_with("units/cctv.src"));
    }

    #[test]
    fn relative_locator_with_scheme_prefix_is_joined_against_cwd() {
        let resolved = resolve(&descriptor("file://units/cctv.src")).unwrap();
        assert!(resolved.path().is_absolute());
        assert!(resolved.path().ends_with("units/cctv.src"));
    }

    #[test]
    fn empty_locator_is_rejected() {
        assert!(matches!(
            resolve(&descriptor("   ")),
            Err(LocatorError::Empty { .. })
        ));
    }

    #[test]
    fn file_label_uses_the_stem() {
        let resolved = resolve(&descriptor("/opt/units/cctv.src")).unwrap();
        assert_eq!(resolved.file_label(), "cctv");
    }
}
