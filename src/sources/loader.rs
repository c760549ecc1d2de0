//! Source unit loader
//!
//! Loads one source unit by spawning its executable in a child process and
//! performing the capability handshake. One process per load: every load
//! gets a fresh, isolated namespace, nothing is shared between units, and a
//! unit is never reused across loads. The child is killed when the handle
//! drops.
//!
//! The [`UnitLoader`] trait is the seam the aggregation engine and the
//! diagnostic probe depend on; tests substitute in-memory loaders through it.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use uuid::Uuid;

use crate::errors::{AppError, AppResult, LoadError};
use crate::sources::locator::ResolvedLocator;
use crate::sources::protocol::{UnitReply, UnitRequest};
use crate::sources::traits::{
    CAPABILITY_FETCH_CONTENT, CAPABILITY_INITIALIZE, SourceUnit,
};

/// Loader abstraction over how units are brought to life
#[async_trait]
pub trait UnitLoader: Send + Sync {
    /// Load the unit behind a resolved locator, or report a typed failure
    async fn load(&self, locator: &ResolvedLocator) -> Result<Box<dyn SourceUnit>, LoadError>;
}

/// Loads units as child processes speaking the JSON line protocol
#[derive(Debug, Default, Clone)]
pub struct ProcessUnitLoader;

impl ProcessUnitLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UnitLoader for ProcessUnitLoader {
    async fn load(&self, locator: &ResolvedLocator) -> Result<Box<dyn SourceUnit>, LoadError> {
        let path = locator.path();

        let metadata = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => LoadError::NotFound {
                path: locator.to_string(),
            },
            _ => LoadError::Unreadable {
                path: locator.to_string(),
                message: e.to_string(),
            },
        })?;
        if !metadata.is_file() {
            return Err(LoadError::NotFound {
                path: locator.to_string(),
            });
        }

        // Unique per load so two units sharing a base name never clash.
        let unit_id = format!("{}-{}", locator.file_label(), short_suffix());

        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::PermissionDenied => LoadError::Unreadable {
                    path: locator.to_string(),
                    message: e.to_string(),
                },
                ErrorKind::NotFound => LoadError::NotFound {
                    path: locator.to_string(),
                },
                _ => LoadError::LoadFailed {
                    unit: unit_id.clone(),
                    message: format!("spawn failed: {e}"),
                },
            })?;

        let stdin = child.stdin.take().ok_or_else(|| LoadError::LoadFailed {
            unit: unit_id.clone(),
            message: "unit stdin unavailable".to_string(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| LoadError::LoadFailed {
            unit: unit_id.clone(),
            message: "unit stdout unavailable".to_string(),
        })?;

        let mut unit = ProcessUnit {
            unit_id: unit_id.clone(),
            _child: child,
            stdin,
            lines: BufReader::new(stdout).lines(),
        };

        // Capability handshake, the process equivalent of inspecting the
        // loaded module for the required symbols.
        let reply = unit
            .request(&UnitRequest::Capabilities)
            .await
            .map_err(|e| LoadError::LoadFailed {
                unit: unit_id.clone(),
                message: e.to_string(),
            })?;
        if !reply.ok {
            return Err(LoadError::LoadFailed {
                unit: unit_id,
                message: reply.error_message(),
            });
        }
        for required in [CAPABILITY_INITIALIZE, CAPABILITY_FETCH_CONTENT] {
            if !reply.capabilities.iter().any(|c| c == required) {
                return Err(LoadError::MissingCapability {
                    unit: unit_id,
                    capability: required.to_string(),
                });
            }
        }

        tracing::debug!(unit = %unit.unit_id, path = %locator, "source unit loaded");
        Ok(Box::new(unit))
    }
}

/// A loaded unit backed by a running child process
#[derive(Debug)]
pub struct ProcessUnit {
    unit_id: String,
    /// Held for its kill-on-drop behavior
    _child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

impl ProcessUnit {
    /// Send one request line and read one reply line
    async fn request(&mut self, request: &UnitRequest<'_>) -> AppResult<UnitReply> {
        let mut line = serde_json::to_string(request)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        match self.lines.next_line().await? {
            Some(reply) => Ok(serde_json::from_str(&reply)?),
            None => Err(AppError::internal(format!(
                "unit '{}' exited before replying",
                self.unit_id
            ))),
        }
    }

    /// Run one operation, converting protocol-level failure replies to errors
    async fn call(&mut self, request: &UnitRequest<'_>) -> AppResult<UnitReply> {
        let reply = self.request(request).await?;
        if reply.ok {
            Ok(reply)
        } else {
            Err(AppError::internal(reply.error_message()))
        }
    }
}

#[async_trait]
impl SourceUnit for ProcessUnit {
    fn unit_id(&self) -> &str {
        &self.unit_id
    }

    async fn initialize(&mut self, config_json: &str) -> AppResult<()> {
        self.call(&UnitRequest::Initialize {
            config: config_json,
        })
        .await?;
        Ok(())
    }

    async fn fetch_content(&mut self, channel_id: Option<&str>) -> AppResult<Option<String>> {
        let reply = self.call(&UnitRequest::FetchContent { channel_id }).await?;
        Ok(reply.content)
    }
}

fn short_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
