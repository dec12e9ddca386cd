//! Browser bindings for the Wicket invitation gate.
//!
//! The host page constructs an `InviteGate`, forwards its load, submit,
//! switch-guest and unload events, and applies the returned JSON command
//! arrays. `schedule` commands are run with `setTimeout` and answered with
//! `fire(ticket)`.

mod bridge;

pub use bridge::{commands_to_json, config_from_options};

#[cfg(target_arch = "wasm32")]
mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::*;

/// Native builds only get the JSON bridge; `InviteGate` and the
/// `localStorage` backend exist on wasm32-unknown-unknown.
#[cfg(not(target_arch = "wasm32"))]
pub fn build_target_hint() -> &'static str {
    "InviteGate needs --target wasm32-unknown-unknown; native builds carry only the JSON bridge"
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn native_build_points_at_wasm_target() {
        assert!(build_target_hint().contains("wasm32-unknown-unknown"));
    }
}
