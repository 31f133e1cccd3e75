//! HTTP status surface.
//!
//! # Data Flow
//! ```text
//! UI layer
//!     → GET /status         → selector snapshot
//!     → PUT /processing     → selector.set_processing
//!     → POST /recheck       → manual evaluation cycle
//! ```

pub mod server;

pub use server::StatusServer;
