//! `localStorage` backend and the `InviteGate` JS class.

use crate::bridge::{commands_to_json, config_from_options};
use wasm_bindgen::prelude::*;
use wicket_gate::{Gate, KeyValueStore, MemoryStore, StoreError, Ticket};

fn js_error(e: JsValue) -> StoreError {
    StoreError::Backend(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

/// `window.localStorage`, or memory when the browser refuses it.
pub enum BrowserStore {
    Local(web_sys::Storage),
    Memory(MemoryStore),
}

impl BrowserStore {
    /// Open `localStorage`, falling back to an in-memory store.
    pub fn open() -> Self {
        match web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            Some(storage) => Self::Local(storage),
            None => {
                web_sys::console::warn_1(&JsValue::from_str(
                    "wicket: localStorage unavailable, state will not persist",
                ));
                Self::Memory(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::Local(storage) => storage.get_item(key).map_err(js_error),
            Self::Memory(memory) => memory.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            Self::Local(storage) => storage.set_item(key, value).map_err(js_error),
            Self::Memory(memory) => memory.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::Local(storage) => storage.remove_item(key).map_err(js_error),
            Self::Memory(memory) => memory.remove(key),
        }
    }
}

/// The gate as seen from JavaScript. Every event returns a JSON array of
/// display commands.
#[wasm_bindgen]
pub struct InviteGate {
    gate: Gate<BrowserStore>,
}

#[wasm_bindgen]
impl InviteGate {
    /// `new InviteGate(policy?, remember?, maxAttempts?)`
    #[wasm_bindgen(constructor)]
    pub fn new(
        policy: Option<String>,
        remember: Option<bool>,
        max_attempts: Option<u32>,
    ) -> Result<InviteGate, JsValue> {
        let config = config_from_options(policy, remember, max_attempts)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            gate: Gate::new(config, BrowserStore::open()),
        })
    }

    #[wasm_bindgen(js_name = onLoad)]
    pub fn on_load(&mut self) -> String {
        commands_to_json(&self.gate.on_load())
    }

    #[wasm_bindgen(js_name = onSubmit)]
    pub fn on_submit(&mut self, name_raw: &str, code_raw: &str) -> String {
        commands_to_json(&self.gate.on_submit(name_raw, code_raw))
    }

    #[wasm_bindgen(js_name = onSwitchGuest)]
    pub fn on_switch_guest(&mut self) -> String {
        commands_to_json(&self.gate.on_switch_guest())
    }

    #[wasm_bindgen(js_name = onUnload)]
    pub fn on_unload(&mut self) {
        self.gate.on_unload();
    }

    /// Called by the page when a `schedule` timer elapses.
    pub fn fire(&mut self, ticket: u32) -> String {
        commands_to_json(&self.gate.fire(Ticket(u64::from(ticket))))
    }

    #[wasm_bindgen(getter, js_name = attemptsLeft)]
    pub fn attempts_left(&self) -> u32 {
        self.gate.state().attempts_left
    }

    #[wasm_bindgen(getter)]
    pub fn locked(&self) -> bool {
        self.gate.state().locked
    }
}
