use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::budget::BudgetLimits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    #[error("{0}")]
    Constraint(String),
}

/// Configuration for an elicitation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElicitationConfig {
    /// Questions the user is willing to answer
    pub budget: u32,
    /// Seed for every random draw; drawn from entropy when absent
    pub seed: Option<u64>,
    pub narrowing: NarrowingConfig,
    pub splitting: SplittingConfig,
    pub elicitor: ElicitorConfig,
    pub subset: SubsetConfig,
}

/// Phase 1: grouped elimination of dimension blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrowingConfig {
    /// Block width
    pub d_hat: usize,
    /// Points shown per block question (drawn with replacement)
    pub sample_size: usize,
}

impl Default for NarrowingConfig {
    fn default() -> Self {
        Self {
            d_hat: 7,
            sample_size: 5,
        }
    }
}

/// Phase 2: generalized binary splitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplittingConfig {
    /// Upper bound on confirmed dimensions
    pub d_bar: usize,
}

impl Default for SplittingConfig {
    fn default() -> Self {
        Self { d_bar: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Random,
    Simplex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruningMode {
    Halfspace,
    Rtree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DominanceMode {
    HyperPlane,
    ConicalHull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCondition {
    NoBound,
    ExactBound,
    ApproxBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoveringMode {
    Sphere,
    GeoGreedy,
}

/// Phase 3a: interactive utility elicitation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElicitorConfig {
    /// Alternatives shown per comparison round (`s`)
    pub question_size: usize,
    /// Stop once the regret bound is at most this
    pub epsilon: f64,
    pub max_rounds: u32,
    pub selection: SelectionMode,
    pub pruning: PruningMode,
    pub dominance: DominanceMode,
    pub stop: StopCondition,
}

impl Default for ElicitorConfig {
    fn default() -> Self {
        Self {
            question_size: 3,
            epsilon: 0.0,
            max_rounds: 1000,
            selection: SelectionMode::Random,
            pruning: PruningMode::Rtree,
            dominance: DominanceMode::HyperPlane,
            stop: StopCondition::ExactBound,
        }
    }
}

/// Phase 3b: randomized subset construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsetConfig {
    /// Dimensions sampled per round
    pub d_hat_2: usize,
    /// Sub-sampling rounds
    pub rounds: usize,
    /// Representatives requested when covering the final dimensions directly
    pub output_size: usize,
    pub covering: CoveringMode,
    /// Run rounds on the rayon pool
    pub parallel: bool,
}

impl Default for SubsetConfig {
    fn default() -> Self {
        Self {
            d_hat_2: 3,
            rounds: 5,
            output_size: 5,
            covering: CoveringMode::Sphere,
            parallel: true,
        }
    }
}

impl Default for ElicitationConfig {
    fn default() -> Self {
        Self {
            budget: 50,
            seed: None,
            narrowing: NarrowingConfig::default(),
            splitting: SplittingConfig::default(),
            elicitor: ElicitorConfig::default(),
            subset: SubsetConfig::default(),
        }
    }
}

impl ElicitationConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ElicitationConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `HDRMS_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = ElicitationConfig::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(
            lookup: &dyn Fn(&str) -> Option<String>,
            key: &str,
        ) -> Result<Option<T>, ConfigError> {
            match lookup(key) {
                None => Ok(None),
                Some(value) => value
                    .trim()
                    .parse()
                    .map(Some)
                    .map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        value,
                    }),
            }
        }
        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;

        if let Some(v) = parsed(lookup, "HDRMS_BUDGET")? {
            self.budget = v;
        }
        if let Some(v) = parsed(lookup, "HDRMS_SEED")? {
            self.seed = Some(v);
        }
        if let Some(v) = parsed(lookup, "HDRMS_D_HAT")? {
            self.narrowing.d_hat = v;
        }
        if let Some(v) = parsed(lookup, "HDRMS_SAMPLE_SIZE")? {
            self.narrowing.sample_size = v;
        }
        if let Some(v) = parsed(lookup, "HDRMS_D_BAR")? {
            self.splitting.d_bar = v;
        }
        if let Some(v) = parsed(lookup, "HDRMS_QUESTION_SIZE")? {
            self.elicitor.question_size = v;
        }
        if let Some(v) = parsed(lookup, "HDRMS_EPSILON")? {
            self.elicitor.epsilon = v;
        }
        if let Some(v) = parsed(lookup, "HDRMS_MAX_ROUNDS")? {
            self.elicitor.max_rounds = v;
        }
        if let Some(v) = lookup("HDRMS_SELECTION") {
            self.elicitor.selection = match v.as_str() {
                "random" => SelectionMode::Random,
                "simplex" => SelectionMode::Simplex,
                _ => return Err(invalid("HDRMS_SELECTION", v)),
            };
        }
        if let Some(v) = lookup("HDRMS_PRUNING") {
            self.elicitor.pruning = match v.as_str() {
                "halfspace" => PruningMode::Halfspace,
                "rtree" => PruningMode::Rtree,
                _ => return Err(invalid("HDRMS_PRUNING", v)),
            };
        }
        if let Some(v) = lookup("HDRMS_DOMINANCE") {
            self.elicitor.dominance = match v.as_str() {
                "hyper_plane" => DominanceMode::HyperPlane,
                "conical_hull" => DominanceMode::ConicalHull,
                _ => return Err(invalid("HDRMS_DOMINANCE", v)),
            };
        }
        if let Some(v) = lookup("HDRMS_STOP") {
            self.elicitor.stop = match v.as_str() {
                "no_bound" => StopCondition::NoBound,
                "exact_bound" => StopCondition::ExactBound,
                "approx_bound" => StopCondition::ApproxBound,
                _ => return Err(invalid("HDRMS_STOP", v)),
            };
        }
        if let Some(v) = parsed(lookup, "HDRMS_D_HAT_2")? {
            self.subset.d_hat_2 = v;
        }
        if let Some(v) = parsed(lookup, "HDRMS_ROUNDS")? {
            self.subset.rounds = v;
        }
        if let Some(v) = parsed(lookup, "HDRMS_OUTPUT_SIZE")? {
            self.subset.output_size = v;
        }
        if let Some(v) = lookup("HDRMS_COVERING") {
            self.subset.covering = match v.as_str() {
                "sphere" => CoveringMode::Sphere,
                "geo_greedy" => CoveringMode::GeoGreedy,
                _ => return Err(invalid("HDRMS_COVERING", v)),
            };
        }
        if let Some(v) = lookup("HDRMS_PARALLEL") {
            self.subset.parallel = v == "true" || v == "1";
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.narrowing.d_hat == 0 {
            return Err(ConfigError::Constraint("narrowing.d_hat must be positive".into()));
        }
        if self.narrowing.sample_size == 0 {
            return Err(ConfigError::Constraint(
                "narrowing.sample_size must be positive".into(),
            ));
        }
        if self.splitting.d_bar == 0 {
            return Err(ConfigError::Constraint("splitting.d_bar must be positive".into()));
        }
        if self.elicitor.question_size < 2 {
            return Err(ConfigError::Constraint(
                "elicitor.question_size must be at least 2".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.elicitor.epsilon) {
            return Err(ConfigError::Constraint(
                "elicitor.epsilon must lie in [0, 1)".into(),
            ));
        }
        if self.subset.d_hat_2 == 0 {
            return Err(ConfigError::Constraint("subset.d_hat_2 must be positive".into()));
        }
        if self.subset.rounds == 0 {
            return Err(ConfigError::Constraint("subset.rounds must be positive".into()));
        }
        Ok(())
    }

    pub fn budget_limits(&self) -> BudgetLimits {
        BudgetLimits {
            questions: self.budget,
            rounds: self.elicitor.max_rounds,
        }
    }
}

fn invalid(key: &str, value: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ElicitationConfig::default();
        config.validate().unwrap();
        assert_eq!(config.narrowing.sample_size, 5);
        assert_eq!(config.splitting.d_bar, 3);
        assert_eq!(config.narrowing.d_hat, 7);
        assert_eq!(config.elicitor.pruning, PruningMode::Rtree);
    }

    #[test]
    fn test_from_file_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
budget = 12
seed = 7

[narrowing]
d_hat = 2

[elicitor]
selection = "simplex"
dominance = "conical_hull"

[subset]
covering = "geo_greedy"
"#
        )
        .unwrap();

        let config = ElicitationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.budget, 12);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.narrowing.d_hat, 2);
        assert_eq!(config.narrowing.sample_size, 5);
        assert_eq!(config.elicitor.selection, SelectionMode::Simplex);
        assert_eq!(config.elicitor.dominance, DominanceMode::ConicalHull);
        assert_eq!(config.subset.covering, CoveringMode::GeoGreedy);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HDRMS_BUDGET", "3"),
            ("HDRMS_D_HAT_2", "4"),
            ("HDRMS_STOP", "no_bound"),
        ]
        .into_iter()
        .collect();
        let mut config = ElicitationConfig::default();
        config
            .apply_env(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.budget, 3);
        assert_eq!(config.subset.d_hat_2, 4);
        assert_eq!(config.elicitor.stop, StopCondition::NoBound);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let mut config = ElicitationConfig::default();
        let err = config
            .apply_env(|k| (k == "HDRMS_PRUNING").then(|| "octree".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "HDRMS_PRUNING"));
    }

    #[test]
    fn test_validate_question_size() {
        let mut config = ElicitationConfig::default();
        config.elicitor.question_size = 1;
        assert!(matches!(config.validate(), Err(ConfigError::Constraint(_))));
    }
}
