//! Health checking and endpoint failover subsystem.
//!
//! # Data Flow
//! ```text
//! Startup, then every interval (monitor.rs):
//!     → selector.rs evaluation cycle (skipped while busy)
//!     → probe.rs against each candidate, primary first
//!     → first healthy candidate becomes active
//!     → state.rs SelectionState published to subscribers
//!
//! Consumer (upload workflow):
//!     set_processing(true) → long request → set_processing(false)
//! ```
//!
//! # Design Decisions
//! - Probe failures are values, never errors
//! - Short-circuit: lower-priority candidates are only probed when needed
//! - One cycle at a time; overlapping timer ticks are dropped

pub mod endpoint;
pub mod monitor;
pub mod probe;
pub mod selector;
pub mod state;

pub use endpoint::{candidates_from_config, Endpoint, Role};
pub use monitor::{Monitor, MonitorHandle};
pub use probe::{ErrorKind, HttpProbe, Probe, ProbeResult};
pub use selector::{EndpointSelector, ProcessingGuard, SelectorError, Trigger};
pub use state::{SelectionState, Status, StatusSnapshot};
