//! # Preset Registry
//!
//! Named effect configs. The built-in set ships as TOML data compiled into
//! the binary; hosts can add or override presets from their own TOML.
//!
//! ```toml
//! [presets.my-effect]
//! preset_type = "magic-dust"
//! palette = ["#ff00ff"]
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ParticleSystemConfig;
use crate::error::{EffectError, EffectResult};

/// Built-in preset definitions.
pub const BUILTIN_PRESETS: &str = include_str!("../data/presets.toml");

#[derive(Debug, Deserialize)]
struct PresetFile {
    #[serde(default)]
    presets: HashMap<String, ParticleSystemConfig>,
}

/// Name to config lookup.
#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: HashMap<String, Arc<ParticleSystemConfig>>,
}

impl PresetRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the built-in presets.
    ///
    /// # Errors
    ///
    /// Fails only if the bundled data is malformed.
    pub fn builtin() -> EffectResult<Self> {
        Self::from_toml_str(BUILTIN_PRESETS)
    }

    /// Loads presets from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::ConfigParse`] for malformed TOML and
    /// [`EffectError::InvalidConfig`] for non-finite values.
    pub fn from_toml_str(text: &str) -> EffectResult<Self> {
        let mut registry = Self::new();
        registry.extend_from_toml(text)?;
        Ok(registry)
    }

    /// Adds presets from TOML, replacing existing ones with the same name.
    ///
    /// Nothing is added unless the whole document is valid.
    ///
    /// # Errors
    ///
    /// See [`from_toml_str`](Self::from_toml_str).
    pub fn extend_from_toml(&mut self, text: &str) -> EffectResult<usize> {
        let file: PresetFile = toml::from_str(text)?;

        for (name, config) in &file.presets {
            config
                .validate()
                .map_err(|reason| EffectError::InvalidConfig(format!("preset '{name}': {reason}")))?;
        }

        let added = file.presets.len();
        for (name, config) in file.presets {
            for issue in config.degeneracies() {
                warn!(preset = %name, issue, "degenerate preset");
            }
            self.presets.insert(name, Arc::new(config));
        }
        debug!(added, total = self.presets.len(), "presets loaded");
        Ok(added)
    }

    /// Registers a preset, returning the one it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        config: ParticleSystemConfig,
    ) -> Option<Arc<ParticleSystemConfig>> {
        self.presets.insert(name.into(), Arc::new(config))
    }

    /// Looks up a preset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<ParticleSystemConfig>> {
        self.presets.get(name).cloned()
    }

    /// Looks up a preset, failing on unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::UnknownPreset`].
    pub fn resolve(&self, name: &str) -> EffectResult<Arc<ParticleSystemConfig>> {
        self.get(name)
            .ok_or_else(|| EffectError::UnknownPreset(name.to_string()))
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.presets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of presets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Returns true if no presets are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PresetType;

    #[test]
    fn test_builtin_presets_load() {
        let registry = PresetRegistry::builtin().unwrap();

        assert_eq!(
            registry.names(),
            vec![
                "dust-cloud",
                "energy-flow",
                "fire-storm",
                "ice-shards",
                "lightning-burst",
                "magic-dust",
                "orb-field",
                "sparkle-rain",
            ]
        );

        for name in registry.names() {
            let config = registry.get(name).unwrap();
            assert!(config.degeneracies().is_empty(), "{name}");
            assert!(!config.palette.is_empty());
            assert!(config.initial_count() <= config.performance.max_particles);
        }
    }

    #[test]
    fn test_fire_storm_values() {
        let registry = PresetRegistry::builtin().unwrap();
        let fire = registry.resolve("fire-storm").unwrap();

        assert_eq!(fire.preset_type, PresetType::FireStorm);
        assert_eq!(fire.duration_ms, 5000.0);
        assert_eq!(fire.initial_particle_count, 80);
        assert!(fire.effects.glow);
    }

    #[test]
    fn test_unknown_preset() {
        let registry = PresetRegistry::builtin().unwrap();
        assert!(matches!(
            registry.resolve("confetti"),
            Err(EffectError::UnknownPreset(name)) if name == "confetti"
        ));
    }

    #[test]
    fn test_extend_overrides() {
        let mut registry = PresetRegistry::builtin().unwrap();
        let added = registry
            .extend_from_toml(
                r##"
                [presets.fire-storm]
                preset_type = "fire-storm"
                duration_ms = 100.0

                [presets.confetti]
                palette = ["#ff0000"]
                "##,
            )
            .unwrap();

        assert_eq!(added, 2);
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.get("fire-storm").unwrap().duration_ms, 100.0);
        assert_eq!(registry.get("confetti").unwrap().preset_type, PresetType::Custom);
    }

    #[test]
    fn test_bad_toml_rejected() {
        let mut registry = PresetRegistry::new();
        assert!(matches!(
            registry.extend_from_toml("[presets.x]\npalette = [\"not-a-color\"]"),
            Err(EffectError::ConfigParse(_))
        ));

        let err = registry.extend_from_toml("[presets.x]\nduration_ms = nan");
        assert!(matches!(err, Err(EffectError::InvalidConfig(_))));
        assert!(registry.is_empty());
    }
}
