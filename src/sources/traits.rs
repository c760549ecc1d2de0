//! Capability interface for source units
//!
//! Every source unit, whatever its transport, exposes exactly two
//! operations: an initializer taking opaque configuration text, and a
//! content fetch returning playlist text. The aggregation engine and the
//! diagnostic probe program against this trait only, which also keeps the
//! pipeline testable with in-memory units.

use async_trait::async_trait;

use crate::errors::AppResult;

/// Capability names a unit must report during the load handshake
pub const CAPABILITY_INITIALIZE: &str = "initialize";
pub const CAPABILITY_FETCH_CONTENT: &str = "fetchContent";

/// The two-operation capability interface
///
/// Units are single-use: one instance serves one aggregation pass and is
/// discarded afterwards. `Send + 'static` lets the isolator drive a unit
/// from a spawned task so panics stay contained.
#[async_trait]
pub trait SourceUnit: Send + std::fmt::Debug + 'static {
    /// Stable diagnostic label for this loaded instance
    fn unit_id(&self) -> &str;

    /// Pass the serialized extra configuration to the unit
    ///
    /// The configuration is opaque JSON text; callers forward it verbatim.
    async fn initialize(&mut self, config_json: &str) -> AppResult<()>;

    /// Fetch playlist content, optionally scoped to one channel
    ///
    /// `None` or an empty string is a valid outcome meaning the unit has
    /// nothing to contribute.
    async fn fetch_content(&mut self, channel_id: Option<&str>) -> AppResult<Option<String>>;
}
