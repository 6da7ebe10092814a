//! Deep merge of TOML layers with per-field source tracking.
//!
//! The merge operates on raw [`toml::Value`] trees rather than deserialized
//! structs, so a key missing from a layer never overrides the layer below.

use std::collections::HashMap;

/// Which configuration layer a value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Compiled-in defaults (`defaults.toml`).
    Defaults,
    /// A configuration file.
    File(String),
    /// Environment variable fallback.
    Environment,
}

impl std::fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defaults => write!(f, "defaults"),
            Self::File(path) => write!(f, "file ({path})"),
            Self::Environment => write!(f, "environment variable"),
        }
    }
}

/// Tracks which layer set each field's value.
pub type FieldSources = HashMap<String, ConfigLayer>;

/// Deep-merge `overlay` into `base`, recording which layer set each leaf
/// field. Tables merge per key; scalars and arrays replace.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = join(prefix, key);
                if let Some(base_val) = base_table.get_mut(key) {
                    if overlay_val.is_table() {
                        deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                    } else {
                        *base_val = overlay_val.clone();
                        sources.insert(path, layer.clone());
                    }
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                    record_leaves(overlay_val, &path, layer, sources);
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            sources.insert(prefix.to_owned(), layer.clone());
        },
    }
}

/// Walk a value tree and record every leaf path with `layer`.
pub fn record_leaves(val: &toml::Value, prefix: &str, layer: &ConfigLayer, sources: &mut FieldSources) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            record_leaves(child, &join(prefix, key), layer, sources);
        }
    } else {
        sources.insert(prefix.to_owned(), layer.clone());
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_replaces_scalars_and_keeps_siblings() {
        let mut base: toml::Value =
            toml::from_str("[server]\nport = 8080\nbind = \"0.0.0.0\"").unwrap();
        let overlay: toml::Value = toml::from_str("[server]\nport = 9000").unwrap();
        let mut sources = FieldSources::new();
        let layer = ConfigLayer::File("tale.toml".to_owned());

        deep_merge_tracking(&mut base, &overlay, "", &layer, &mut sources);

        assert_eq!(base["server"]["port"].as_integer(), Some(9000));
        assert_eq!(base["server"]["bind"].as_str(), Some("0.0.0.0"));
        assert_eq!(sources.get("server.port"), Some(&layer));
        assert!(!sources.contains_key("server.bind"));
    }

    #[test]
    fn new_tables_record_all_leaves() {
        let mut base: toml::Value = toml::from_str("[server]\nport = 8080").unwrap();
        let overlay: toml::Value =
            toml::from_str("[facebook]\npage_id = \"1\"\nverify_token = \"v\"").unwrap();
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::Environment, &mut sources);

        assert_eq!(base["facebook"]["page_id"].as_str(), Some("1"));
        assert_eq!(
            sources.get("facebook.verify_token"),
            Some(&ConfigLayer::Environment)
        );
    }

    #[test]
    fn layer_display() {
        assert_eq!(
            ConfigLayer::File("/etc/tale.toml".to_owned()).to_string(),
            "file (/etc/tale.toml)"
        );
    }
}
