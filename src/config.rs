use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ModelError;
use crate::ir::QName;

/// Knobs for one compilation round.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Root of the type hierarchy. Never registered, classifies as `Any`.
    pub object_type: String,
    /// Erasures a type must reach to count as a collection.
    pub collection_types: Vec<String>,
    /// Two-argument map erasures.
    pub map_types: Vec<String>,
    /// Adapter base classes (value type, bound type).
    pub adapter_types: Vec<String>,
    /// Extra atomic mappings, merged over the built-in table.
    pub known_types: IndexMap<String, QName>,
    pub default_namespace: String,
    /// Register API subclasses of a discovered class that has no see-also hint.
    pub discover_subtypes: bool,
    pub max_adapter_depth: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            object_type: crate::graph::platform::OBJECT.to_string(),
            collection_types: vec!["java.util.Collection".to_string()],
            map_types: vec!["java.util.Map".to_string()],
            adapter_types: vec![
                "javax.xml.bind.annotation.adapters.XmlAdapter".to_string(),
                "jakarta.xml.bind.annotation.adapters.XmlAdapter".to_string(),
            ],
            known_types: IndexMap::new(),
            default_namespace: String::new(),
            discover_subtypes: true,
            max_adapter_depth: 8,
        }
    }
}

impl CompilerConfig {
    pub fn from_json_str(src: &str) -> Result<Self, ModelError> {
        crate::path_de::from_str_with_path(src)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Json(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&src)
    }

    pub fn is_collection_type(&self, qualified_name: &str) -> bool {
        self.collection_types.iter().any(|c| c == qualified_name)
    }

    pub fn is_map_type(&self, qualified_name: &str) -> bool {
        self.map_types.iter().any(|c| c == qualified_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg = CompilerConfig::from_json_str(r#"{
            "default_namespace": "urn:acme",
            "known_types": { "com.acme.Money": { "name": "decimal", "namespace": "http://www.w3.org/2001/XMLSchema" } }
        }"#).unwrap();
        assert_eq!(cfg.default_namespace, "urn:acme");
        assert!(cfg.discover_subtypes);
        assert_eq!(cfg.max_adapter_depth, 8);
        assert!(cfg.is_collection_type("java.util.Collection"));
        assert_eq!(cfg.known_types["com.acme.Money"].name, "decimal");
    }

    #[test]
    fn unknown_fields_are_rejected_with_a_path() {
        let err = CompilerConfig::from_json_str(r#"{ "max_adapter_depht": 3 }"#).unwrap_err();
        assert!(err.to_string().contains("max_adapter_depht"), "{err}");
    }
}
