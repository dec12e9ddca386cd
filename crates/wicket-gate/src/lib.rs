//! Wicket Invitation Gate
//!
//! A visitor enters a full name and an activation code. The code is checked
//! against a fixed whitelist, bound on first use to the entered name, and on
//! success the invitation view is revealed. Everything persists in a small
//! string key-value store (the browser's `localStorage` in production).
//!
//! # Components
//!
//! - **Codes**: deterministic whitelist generation
//! - **Store**: four named string slots, fail-open on corrupt data
//! - **Registry**: code → bound guest, saved as one JSON blob
//! - **Redemption**: the pure accept/reconnect/reject decision
//! - **Session**: what to show at load time (strict, sticky, prefill)
//! - **Gate**: the controller that turns events into [`DisplayCommand`]s
//!
//! # Not a security boundary
//!
//! Codes ship with the client and are trivially enumerable. The lockout is a
//! UX deterrent, nothing more.
//!
//! # Example
//!
//! ```
//! use wicket_gate::{Gate, GateConfig, MemoryStore};
//!
//! let mut gate = Gate::new(GateConfig::default(), MemoryStore::new());
//! let _ = gate.on_load();
//! let commands = gate.on_submit("Jane Doe", "pfm-2025-003");
//! assert!(!commands.is_empty());
//! ```

mod codes;
mod config;
mod display;
mod error;
mod gate;
mod redemption;
mod registry;
mod session;
mod store;

pub use codes::{generate_codes, ActivationCode, Whitelist};
pub use config::{GateConfig, SessionPolicy, StoreKeys};
pub use display::{messages, DisplayCommand, Presenter, StatusKind, Ticket};
pub use error::{ConfigError, Rejection, StoreError};
pub use gate::Gate;
pub use redemption::{
    normalize_code, normalize_name, redeem, Acceptance, Decision, Effects, GateState, Submission,
    Verdict, MIN_NAME_LEN,
};
pub use registry::{Registry, RegistryEntry};
pub use session::{initial_screen, InitialScreen};
pub use store::{KeyValueStore, LastCredentials, MemoryStore, SlotStore};
