use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_max_seeds() -> usize {
    1
}

fn default_max_trees() -> usize {
    12
}

fn default_max_grows_per_day() -> u32 {
    4
}

fn default_max_seeds_per_day() -> u32 {
    1
}

fn default_min_fully_grown() -> usize {
    3
}

fn default_max_fully_grown() -> usize {
    5
}

fn default_complete_opening_day() -> u32 {
    8
}

fn default_complete_cost() -> u32 {
    4
}

fn default_seed_stop_days() -> u32 {
    1
}

fn default_seed_threshold() -> f64 {
    3.0
}

fn default_grow_threshold() -> f64 {
    0.5
}

fn default_complete_threshold() -> f64 {
    0.5
}

fn default_shadow_impact_weight() -> f64 {
    2.0
}

fn default_rotation_damping() -> f64 {
    3.0
}

fn default_unshadowed_bonus() -> f64 {
    0.5
}

fn default_preferred_unshadowed_bonus() -> f64 {
    1.5
}

fn default_neighbor_richness_divisor() -> f64 {
    12.0
}

fn default_expansion_divisor() -> f64 {
    6.0
}

fn default_shadowed_grow_penalty() -> f64 {
    2.0
}

fn default_unshadowed_ratio() -> f64 {
    0.5
}

fn default_overripe_bonus() -> f64 {
    1.0
}

/// Tunable knobs of the decision engine. Every field has a default so a
/// policy file only needs to list what it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub weights: Weights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Own seeds allowed on the board at once.
    #[serde(default = "default_max_seeds")]
    pub max_seeds: usize,
    #[serde(default = "default_max_trees")]
    pub max_trees: usize,
    #[serde(default = "default_max_grows_per_day")]
    pub max_grows_per_day: u32,
    #[serde(default = "default_max_seeds_per_day")]
    pub max_seeds_per_day: u32,
    /// Fully grown trees to keep before the last day.
    #[serde(default = "default_min_fully_grown")]
    pub min_fully_grown: usize,
    #[serde(default = "default_max_fully_grown")]
    pub max_fully_grown: usize,
    #[serde(default = "default_complete_opening_day")]
    pub complete_opening_day: u32,
    #[serde(default = "default_complete_cost")]
    pub complete_cost: u32,
    /// Seeding stops once this many days or fewer remain.
    #[serde(default = "default_seed_stop_days")]
    pub seed_stop_days: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_seeds: default_max_seeds(),
            max_trees: default_max_trees(),
            max_grows_per_day: default_max_grows_per_day(),
            max_seeds_per_day: default_max_seeds_per_day(),
            min_fully_grown: default_min_fully_grown(),
            max_fully_grown: default_max_fully_grown(),
            complete_opening_day: default_complete_opening_day(),
            complete_cost: default_complete_cost(),
            seed_stop_days: default_seed_stop_days(),
        }
    }
}

/// Minimum score a candidate must strictly exceed to be played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_seed_threshold")]
    pub seed: f64,
    #[serde(default = "default_grow_threshold")]
    pub grow: f64,
    #[serde(default = "default_complete_threshold")]
    pub complete: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            seed: default_seed_threshold(),
            grow: default_grow_threshold(),
            complete: default_complete_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    #[serde(default = "default_shadow_impact_weight")]
    pub shadow_impact: f64,
    #[serde(default = "default_rotation_damping")]
    pub rotation_damping: f64,
    #[serde(default = "default_unshadowed_bonus")]
    pub unshadowed_bonus: f64,
    #[serde(default = "default_preferred_unshadowed_bonus")]
    pub preferred_unshadowed_bonus: f64,
    #[serde(default = "default_neighbor_richness_divisor")]
    pub neighbor_richness_divisor: f64,
    #[serde(default = "default_expansion_divisor")]
    pub expansion_divisor: f64,
    #[serde(default = "default_shadowed_grow_penalty")]
    pub shadowed_grow_penalty: f64,
    /// Below this share of unshadowed own trees, seeds favour open ground.
    #[serde(default = "default_unshadowed_ratio")]
    pub unshadowed_ratio: f64,
    #[serde(default = "default_overripe_bonus")]
    pub overripe_bonus: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            shadow_impact: default_shadow_impact_weight(),
            rotation_damping: default_rotation_damping(),
            unshadowed_bonus: default_unshadowed_bonus(),
            preferred_unshadowed_bonus: default_preferred_unshadowed_bonus(),
            neighbor_richness_divisor: default_neighbor_richness_divisor(),
            expansion_divisor: default_expansion_divisor(),
            shadowed_grow_penalty: default_shadowed_grow_penalty(),
            unshadowed_ratio: default_unshadowed_ratio(),
            overripe_bonus: default_overripe_bonus(),
        }
    }
}

impl Policy {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse policy")
    }
}

pub struct PolicyLoader {
    base_dir: PathBuf,
}

impl PolicyLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Policy> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read policy file {}", path.display()))?;
        let policy: Policy = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(policy)
    }
}
