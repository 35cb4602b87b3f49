// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Preset Registry
// ─────────────────────────────────────────────────────────────────────
//! Caller-owned preset store. Load once, then pass by reference to
//! whatever needs lookups; there is no process-wide instance.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use psyfi_types::{PsyfiError, PsyfiResult};

use crate::preset::{SubstanceClass, SubstancePreset};

/// Preset set bundled with the crate.
pub const BUILTIN_PRESETS: &str = include_str!("../data/presets.json");

#[derive(Deserialize)]
struct PresetFile {
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
    presets: BTreeMap<String, SubstancePreset>,
}

#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: BTreeMap<String, SubstancePreset>,
    /// Lowercased alias → preset key.
    aliases: HashMap<String, String>,
    metadata: serde_json::Map<String, serde_json::Value>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a preset document `{"metadata": {...}, "presets": {key: preset}}`.
    /// Every preset is validated; the first invalid one fails the load.
    pub fn from_json(json: &str) -> PsyfiResult<Self> {
        let file: PresetFile = serde_json::from_str(json)
            .map_err(|e| PsyfiError::Configuration(format!("preset JSON parse error: {e}")))?;
        let mut registry = Self {
            metadata: file.metadata,
            ..Self::default()
        };
        for (key, preset) in file.presets {
            registry
                .insert(key, preset)
                .map_err(|e| PsyfiError::Configuration(e.to_string()))?;
        }
        log::info!("PresetRegistry: loaded {} presets", registry.len());
        Ok(registry)
    }

    pub fn load_file(path: impl AsRef<Path>) -> PsyfiResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PsyfiError::Configuration(format!("cannot read presets file {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn builtin() -> PsyfiResult<Self> {
        Self::from_json(BUILTIN_PRESETS)
    }

    /// Add or replace a preset under `key` and register its aliases.
    pub fn insert(&mut self, key: impl Into<String>, preset: SubstancePreset) -> PsyfiResult<()> {
        let key = key.into();
        preset.validate()?;
        if let Some(old) = self.presets.get(&key) {
            for alias in &old.aliases {
                self.aliases.remove(&alias.to_lowercase());
            }
        }
        for alias in &preset.aliases {
            if let Some(owner) = self.aliases.insert(alias.to_lowercase(), key.clone()) {
                if owner != key {
                    log::warn!("PresetRegistry: alias '{alias}' moved from '{owner}' to '{key}'");
                }
            }
        }
        self.presets.insert(key, preset);
        Ok(())
    }

    /// Lookup by exact key, then by case-insensitive alias.
    pub fn get(&self, name: &str) -> PsyfiResult<&SubstancePreset> {
        if let Some(preset) = self.presets.get(name) {
            return Ok(preset);
        }
        self.aliases
            .get(&name.to_lowercase())
            .and_then(|key| self.presets.get(key))
            .ok_or_else(|| PsyfiError::Configuration(format!("unknown preset '{name}'")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// Preset keys in sorted order.
    pub fn list_presets(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    pub fn list_by_class(&self, class: SubstanceClass) -> Vec<&str> {
        self.presets
            .iter()
            .filter(|(_, p)| p.substance_class == class)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    pub fn metadata(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::tests::sample;

    #[test]
    fn test_builtin_loads() {
        let reg = PresetRegistry::builtin().unwrap();
        for key in ["baseline", "lsd", "psilocybin", "dmt", "ketamine", "mdma", "jhana"] {
            assert!(reg.contains(key), "missing {key}");
        }
        assert_eq!(reg.len(), 7);
        assert!(reg.metadata().contains_key("version"));
    }

    #[test]
    fn test_alias_lookup_case_insensitive() {
        let reg = PresetRegistry::builtin().unwrap();
        assert_eq!(reg.get("LSD-25").unwrap().name, reg.get("lsd").unwrap().name);
        assert_eq!(reg.get("molly").unwrap().name, reg.get("mdma").unwrap().name);
    }

    #[test]
    fn test_unknown_preset_is_config_error() {
        let reg = PresetRegistry::builtin().unwrap();
        let err = reg.get("unobtainium").unwrap_err();
        assert!(matches!(err, PsyfiError::Configuration(_)));
    }

    #[test]
    fn test_list_by_class() {
        let reg = PresetRegistry::builtin().unwrap();
        let psychedelics = reg.list_by_class(SubstanceClass::ClassicPsychedelic);
        assert_eq!(psychedelics, vec!["dmt", "lsd", "psilocybin"]);
        assert_eq!(reg.list_by_class(SubstanceClass::Deliriant), Vec::<&str>::new());
    }

    #[test]
    fn test_insert_replaces_aliases() {
        let mut reg = PresetRegistry::new();
        reg.insert("test", sample()).unwrap();
        assert!(reg.contains("ta"));
        let mut renamed = sample();
        renamed.aliases = vec!["other".into()];
        reg.insert("test", renamed).unwrap();
        assert!(!reg.contains("ta"));
        assert!(reg.contains("OTHER"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_invalid_preset_fails_load() {
        let json = r#"{"presets": {"bad": {"name": "bad"}}}"#;
        assert!(matches!(
            PresetRegistry::from_json(json),
            Err(PsyfiError::Configuration(_))
        ));
        let mut bad = sample();
        bad.dynamics.drift_velocity = 3.0;
        assert!(PresetRegistry::new().insert("bad", bad).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = PresetRegistry::load_file("/nonexistent/presets.json").unwrap_err();
        assert!(matches!(err, PsyfiError::Configuration(_)));
    }
}
