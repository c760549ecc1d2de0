//! Source unit handling
//!
//! A source unit is an independently authored executable implementing the
//! two-operation capability interface (`initialize`, `fetchContent`). This
//! module covers the whole unit lifecycle:
//!
//! - **locator**: turning a descriptor's locator into an absolute path
//! - **traits**: the capability interface the rest of the system programs to
//! - **protocol**: the JSON line protocol spoken to unit processes
//! - **loader**: spawning a unit in its own process and verifying capabilities
//! - **isolator**: running a loaded unit under fault containment

pub mod isolator;
pub mod loader;
pub mod locator;
pub mod protocol;
pub mod traits;

pub use isolator::{ExecutionIsolator, ExecutionOutcome};
pub use loader::{ProcessUnitLoader, UnitLoader};
pub use locator::{ResolvedLocator, resolve};
pub use traits::SourceUnit;
