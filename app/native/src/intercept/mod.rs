//! Event interception.
//!
//! A single filtering tap sees every pointer-moved event before the window
//! server's own edge-trigger logic does. Events headed into the trigger zone
//! of any display other than the anchor are dropped; everything else passes.
//!
//! ```text
//! window server ──► tap callback ──► decide(event, suppressing, snapshot)
//!                        │                      ▲
//!                        │ try_send             │ publish (RwLock<Arc<_>>)
//!                        ▼                      │
//!                   notifier thread        reactor / facade
//! ```

pub mod decision;
pub mod engine;
pub mod state;
pub mod watchdog;

pub use decision::{TapEvent, TapEventKind, Verdict, decide};
pub use engine::{EngineContext, EngineOptions, InterceptionEngine, TapLease};
pub use state::{AnchorState, BlockedZone, InterceptState, Phase, Snapshot};
