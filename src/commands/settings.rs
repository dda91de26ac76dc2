use crate::error::{AnalysisError, Result};
use log::warn;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use std::time::Duration;

const SETTINGS_SCHEMA_VERSION: i64 = 1;

/// Typed view of the settings document used by the analyzers.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerSettings {
    pub workers: usize,
    pub enrichment_enabled: bool,
    pub enrichment_timeout: Duration,
    pub enrichment_max_length: usize,
    pub rank_issues_by_severity: bool,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        effective_settings(&migrate_settings(json!({})))
    }
}

/// Loads settings from an optional JSON file, applies `overrides` on top and
/// fills in defaults. A missing path yields defaults; unparseable JSON is
/// logged and treated as empty.
pub fn load_settings(path: Option<&Path>, overrides: &Value) -> Result<AnalyzerSettings> {
    let mut settings = match path {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| AnalysisError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str::<Value>(&raw).unwrap_or_else(|e| {
                warn!("ignoring malformed settings in {}: {e}", path.display());
                json!({})
            })
        }
        None => json!({}),
    };

    if !settings.is_object() {
        return Err(AnalysisError::Settings(
            "settings document must be a JSON object".to_string(),
        ));
    }

    merge_settings(&mut settings, overrides);
    Ok(effective_settings(&migrate_settings(settings)))
}

pub fn effective_settings(settings: &Value) -> AnalyzerSettings {
    let default_workers = default_workers();
    AnalyzerSettings {
        workers: settings
            .get("workers")
            .and_then(Value::as_u64)
            .map(|w| w as usize)
            .filter(|w| *w > 0)
            .unwrap_or(default_workers),
        enrichment_enabled: settings
            .get("enrichmentEnabled")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        enrichment_timeout: Duration::from_millis(
            settings
                .get("enrichmentTimeoutMs")
                .and_then(Value::as_u64)
                .unwrap_or(5000),
        ),
        enrichment_max_length: settings
            .get("enrichmentMaxLength")
            .and_then(Value::as_u64)
            .unwrap_or(1000) as usize,
        rank_issues_by_severity: settings
            .get("rankIssuesBySeverity")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_settings() -> Value {
    json!({
        "schema_version": SETTINGS_SCHEMA_VERSION,
        "workers": 0,
        "enrichmentEnabled": true,
        "enrichmentTimeoutMs": 5000,
        "enrichmentMaxLength": 1000,
        "rankIssuesBySeverity": false
    })
}

fn migrate_settings(input: Value) -> Value {
    let defaults = default_settings();
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    deep_merge_defaults(&mut out, &defaults);
    sanitize_settings(&mut out);
    if let Some(obj) = out.as_object_mut() {
        obj.insert("schema_version".to_string(), json!(SETTINGS_SCHEMA_VERSION));
    }

    out
}

fn deep_merge_defaults(target: &mut Value, defaults: &Value) {
    let (Some(target_obj), Some(default_obj)) = (target.as_object_mut(), defaults.as_object()) else {
        return;
    };

    for (key, default_value) in default_obj {
        match target_obj.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    deep_merge_defaults(existing, default_value);
                }
            }
            None => {
                target_obj.insert(key.clone(), default_value.clone());
            }
        }
    }
}

fn merge_settings(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_obj), Value::Object(incoming_obj)) => {
            for (key, value) in incoming_obj {
                if let Some(existing) = target_obj.get_mut(key) {
                    merge_settings(existing, value);
                } else {
                    target_obj.insert(key.clone(), value.clone());
                }
            }
        }
        (target_slot, incoming_value) => {
            *target_slot = incoming_value.clone();
        }
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    // 0 means "one per available core".
    clamp_u64(obj, "workers", 0, 256, 0);
    clamp_u64(obj, "enrichmentTimeoutMs", 100, 60_000, 5000);
    clamp_u64(obj, "enrichmentMaxLength", 100, 100_000, 1000);

    ensure_bool(obj, "enrichmentEnabled", true);
    ensure_bool(obj, "rankIssuesBySeverity", false);
}

fn clamp_u64(map: &mut Map<String, Value>, key: &str, min: u64, max: u64, default: u64) {
    let raw = map.get(key).and_then(Value::as_u64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn ensure_bool(map: &mut Map<String, Value>, key: &str, default: bool) {
    let value = map.get(key).and_then(Value::as_bool).unwrap_or(default);
    map.insert(key.to_string(), json!(value));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let migrated = migrate_settings(json!({ "enrichmentEnabled": false }));
        assert_eq!(migrated["enrichmentEnabled"], json!(false));
        assert_eq!(migrated["enrichmentTimeoutMs"], json!(5000));
        assert_eq!(migrated["schema_version"], json!(SETTINGS_SCHEMA_VERSION));
    }

    #[test]
    fn clamps_out_of_range_values() {
        let migrated = migrate_settings(json!({
            "enrichmentTimeoutMs": 5,
            "enrichmentMaxLength": 10_000_000,
            "rankIssuesBySeverity": "yes"
        }));
        let settings = effective_settings(&migrated);
        assert_eq!(settings.enrichment_timeout, Duration::from_millis(100));
        assert_eq!(settings.enrichment_max_length, 100_000);
        assert!(!settings.rank_issues_by_severity);
    }

    #[test]
    fn zero_workers_means_available_cores() {
        let settings = AnalyzerSettings::default();
        assert_eq!(settings.workers, default_workers());
        assert!(settings.workers >= 1);
        assert!(settings.enrichment_enabled);
        assert_eq!(settings.enrichment_max_length, 1000);
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut existing = json!({ "workers": 8, "rankIssuesBySeverity": true });
        merge_settings(&mut existing, &json!({ "workers": 2 }));
        let settings = effective_settings(&migrate_settings(existing));
        assert_eq!(settings.workers, 2);
        assert!(settings.rank_issues_by_severity);
    }

    #[test]
    fn rejects_non_object_documents() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2, 3]").expect("write settings");

        let err = load_settings(Some(&path), &json!({})).expect_err("array must be rejected");
        assert!(matches!(err, AnalysisError::Settings(_)));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").expect("write settings");

        let settings = load_settings(Some(&path), &json!({})).expect("load");
        assert_eq!(settings, AnalyzerSettings::default());
    }
}
