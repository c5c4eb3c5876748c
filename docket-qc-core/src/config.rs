use crate::types::SectionContext;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::Path;

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_sum_check_contexts() -> Vec<SectionContext> {
    vec![
        SectionContext::PlanBase,
        SectionContext::PlanWall,
        SectionContext::PlanLoft,
        SectionContext::ElevationA,
        SectionContext::ElevationB,
        SectionContext::ElevationC,
        SectionContext::ElevationD,
    ]
}

/// Resolved QC configuration. Every key is optional in the rules file and
/// unknown keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QcConfig {
    /// Max allowed per-axis / per-chain absolute deviation in millimetres
    #[serde(default)]
    pub tolerance_mm: u32,
    /// Which checks run
    #[serde(default)]
    pub enable_checks: EnableChecks,
    /// Drawing contexts whose dimension chains get sum-checked
    #[serde(
        default = "default_sum_check_contexts",
        deserialize_with = "lenient_contexts"
    )]
    pub sum_check_contexts: Vec<SectionContext>,
    /// Retry a failed chain with its largest number as the total
    #[serde(default = "default_true")]
    pub sum_check_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnableChecks {
    #[serde(default = "default_true")]
    pub elevation_vs_consolidated: bool,
    #[serde(default = "default_true")]
    pub sum_check: bool,
}

impl Default for EnableChecks {
    fn default() -> Self {
        Self {
            elevation_vs_consolidated: true,
            sum_check: true,
        }
    }
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            tolerance_mm: 0,
            enable_checks: EnableChecks::default(),
            sum_check_contexts: default_sum_check_contexts(),
            sum_check_fallback: true,
        }
    }
}

/// Accepts context labels in any case; unrecognised labels are dropped with a warning
fn lenient_contexts<'de, D>(deserializer: D) -> std::result::Result<Vec<SectionContext>, D::Error>
where
    D: Deserializer<'de>,
{
    let labels: Vec<String> = Vec::deserialize(deserializer)?;
    Ok(contexts_from_labels(labels))
}

fn contexts_from_labels(labels: Vec<String>) -> Vec<SectionContext> {
    let mut contexts = Vec::with_capacity(labels.len());
    for label in labels {
        match SectionContext::from_label(&label) {
            Some(ctx) if !contexts.contains(&ctx) => contexts.push(ctx),
            Some(_) => {}
            None => log::warn!("⚠️  Ignoring unknown sum_check_contexts entry '{}'", label),
        }
    }
    contexts
}

/// Value of `key` in `map`, or None when it is absent, null or the wrong type.
/// A wrong type is logged and leaves only that key at its default.
fn lenient_field<T: DeserializeOwned>(map: &Mapping, key: &str) -> Option<T> {
    let value = map.get(key).filter(|v| !v.is_null())?;
    match serde_yaml::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("⚠️  Ignoring invalid config value for '{}': {}", key, e);
            None
        }
    }
}

fn as_mapping(value: Value, what: &str) -> Mapping {
    match value {
        Value::Mapping(map) => map,
        Value::Null => Mapping::new(),
        _ => {
            log::warn!("⚠️  Expected a mapping for {}, using defaults", what);
            Mapping::new()
        }
    }
}

impl QcConfig {
    /// Load config from a YAML rules file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Only YAML syntax errors fail. Bad values fall back to their defaults key by key.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content)?;
        Ok(Self::from_yaml_value(value))
    }

    fn from_yaml_value(value: Value) -> Self {
        // An empty file parses as null; treat it like an empty mapping
        let map = as_mapping(value, "the rules file");
        let checks = as_mapping(
            map.get("enable_checks").cloned().unwrap_or(Value::Null),
            "enable_checks",
        );
        let defaults = Self::default();

        Self {
            tolerance_mm: lenient_field(&map, "tolerance_mm").unwrap_or(defaults.tolerance_mm),
            enable_checks: EnableChecks {
                elevation_vs_consolidated: lenient_field(&checks, "elevation_vs_consolidated")
                    .unwrap_or(defaults.enable_checks.elevation_vs_consolidated),
                sum_check: lenient_field(&checks, "sum_check")
                    .unwrap_or(defaults.enable_checks.sum_check),
            },
            sum_check_contexts: lenient_field(&map, "sum_check_contexts")
                .map(contexts_from_labels)
                .unwrap_or(defaults.sum_check_contexts),
            sum_check_fallback: lenient_field(&map, "sum_check_fallback")
                .unwrap_or(defaults.sum_check_fallback),
        }
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                log::warn!("⚠️  Failed to load config from {}: {}, using defaults", p, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Merge several rules files, later files overriding earlier ones key by key.
    ///
    /// Missing files are skipped. A file that can't be read or parsed is skipped
    /// with a warning. A bad value defaults only its own key.
    pub fn load_layered<P: AsRef<Path>>(paths: &[P]) -> Self {
        let mut merged = Value::Mapping(Mapping::new());

        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                log::debug!("Config layer {} not found, skipping", path.display());
                continue;
            }
            let layer = std::fs::read_to_string(path)
                .map_err(anyhow::Error::from)
                .and_then(|s| serde_yaml::from_str::<Value>(&s).map_err(anyhow::Error::from));
            match layer {
                Ok(layer) => {
                    log::info!("📋 Loaded config layer: {}", path.display());
                    merge_yaml(&mut merged, layer);
                }
                Err(e) => log::warn!(
                    "⚠️  Skipping unreadable config layer {}: {}",
                    path.display(),
                    e
                ),
            }
        }

        Self::from_yaml_value(merged)
    }
}

/// Deep-merge `overlay` into `base`. Mappings merge recursively, anything else replaces.
pub fn merge_yaml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}
