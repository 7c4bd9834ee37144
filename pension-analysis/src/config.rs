use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Constantes réglables du générateur de tirages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Écart toléré entre la somme des chiffres et la somme cible.
    pub sum_tolerance: u32,
    pub max_sum_attempts: usize,
    pub max_delta_attempts: usize,
    /// Largeur de la bande d'écart acceptable, en écarts-types.
    pub band_sigma: f64,
    /// Probabilité d'emprunter la branche « motif » quand l'intensité vaut 2.
    pub pattern_probability: f64,
    /// Multiplicateur de la probabilité de transition dans le poids d'un chiffre.
    pub transition_boost: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sum_tolerance: 3,
            max_sum_attempts: 100,
            max_delta_attempts: 100,
            band_sigma: 1.5,
            pattern_probability: 0.5,
            transition_boost: 5.0,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.pattern_probability) {
            bail!(
                "pattern_probability doit être dans [0, 1] (reçu {})",
                self.pattern_probability
            );
        }
        if !self.band_sigma.is_finite() || self.band_sigma < 0.0 {
            bail!("band_sigma doit être positif (reçu {})", self.band_sigma);
        }
        if !self.transition_boost.is_finite() || self.transition_boost < 0.0 {
            bail!(
                "transition_boost doit être positif (reçu {})",
                self.transition_boost
            );
        }
        Ok(())
    }
}

pub fn save_config(config: &GeneratorConfig, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire la configuration {:?}", path))?;
    Ok(())
}

pub fn load_config(path: &Path) -> anyhow::Result<GeneratorConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire la configuration {:?}", path))?;
    let config: GeneratorConfig = serde_json::from_str(&json)
        .with_context(|| format!("Configuration invalide dans {:?}", path))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.sum_tolerance, 3);
        assert_eq!(config.max_sum_attempts, 100);
        assert_eq!(config.max_delta_attempts, 100);
        assert_eq!(config.band_sigma, 1.5);
        assert_eq!(config.pattern_probability, 0.5);
        assert_eq!(config.transition_boost, 5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generator.json");
        let config = GeneratorConfig {
            sum_tolerance: 5,
            ..GeneratorConfig::default()
        };
        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generator.json");
        std::fs::write(&path, r#"{ "transition_boost": 2.0 }"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.transition_boost, 2.0);
        assert_eq!(config.max_sum_attempts, 100);
    }

    #[test]
    fn test_invalid_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generator.json");
        std::fs::write(&path, r#"{ "pattern_probability": 1.5 }"#).unwrap();
        assert!(load_config(&path).is_err());
        assert!(load_config(&dir.path().join("absent.json")).is_err());
    }
}
