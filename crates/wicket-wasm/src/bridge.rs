//! Target-independent glue between page options, the gate and JSON.

use wicket_gate::{ConfigError, DisplayCommand, GateConfig};

/// Serialize commands as a JSON array for the host page.
pub fn commands_to_json(commands: &[DisplayCommand]) -> String {
    serde_json::to_string(commands).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to serialize display commands");
        "[]".to_string()
    })
}

/// Build a config from page options. Unset options keep the defaults.
pub fn config_from_options(
    policy: Option<String>,
    remember: Option<bool>,
    max_attempts: Option<u32>,
) -> Result<GateConfig, ConfigError> {
    GateConfig::from_lookup(|key: &str| match key {
        "WICKET_POLICY" => policy.clone(),
        "WICKET_REMEMBER" => remember.map(|r| r.to_string()),
        "WICKET_MAX_ATTEMPTS" => max_attempts.map(|n| n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wicket_gate::{Gate, MemoryStore, SessionPolicy};

    #[test]
    fn load_commands_as_json() {
        let mut gate = Gate::new(GateConfig::default(), MemoryStore::new());
        let json: serde_json::Value = serde_json::from_str(&commands_to_json(&gate.on_load())).unwrap();
        let cmds: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["cmd"].as_str().unwrap())
            .collect();
        assert_eq!(
            cmds,
            vec!["show_lock_form", "enable_form", "render_attempts_remaining", "render_status"]
        );
    }

    #[test]
    fn schedule_carries_numeric_ticket() {
        let mut gate = Gate::new(GateConfig::default(), MemoryStore::new());
        gate.on_load();
        let json: serde_json::Value =
            serde_json::from_str(&commands_to_json(&gate.on_submit("Alice Smith", "PFM-2025-003"))).unwrap();
        let schedule = json
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["cmd"] == "schedule")
            .unwrap();
        assert_eq!(schedule["ticket"], 1);
        assert_eq!(schedule["delay_ms"], 650);
        assert_eq!(schedule["display_name"], "Alice Smith");
    }

    #[test]
    fn options_map_to_config() {
        let config = config_from_options(None, None, None).unwrap();
        assert_eq!(config, GateConfig::default());

        let config = config_from_options(Some("prefill".into()), Some(false), Some(5)).unwrap();
        assert_eq!(config.policy, SessionPolicy::Prefill);
        assert!(!config.remember_credentials);
        assert_eq!(config.max_attempts, 5);

        assert!(config_from_options(Some("nope".into()), None, None).is_err());
        assert!(config_from_options(None, None, Some(0)).is_err());
    }
}
