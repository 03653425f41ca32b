//! Model definitions loaded from a directory of JSON Schema files.
//!
//! Each `*.json` file holds one schema; its `title` is the model name and the
//! table the model's statements target.
//!
//! ```json
//! {
//!   "title": "user",
//!   "type": "object",
//!   "properties": {
//!     "firstName": {"type": "string"},
//!     "email": {"type": "string", "format": "email"}
//!   },
//!   "required": ["firstName", "email"]
//! }
//! ```

use crate::error::{OrmError, OrmResult};
use crate::validate::{self, ValidationErrors};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One model's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    title: String,
    schema: Value,
    source: Option<PathBuf>,
}

impl ModelSchema {
    /// Wrap a schema document; it must be an object with a non-empty string `title`.
    pub fn from_value(schema: Value) -> OrmResult<Self> {
        let title = match schema.get("title") {
            Some(Value::String(title)) if !title.trim().is_empty() => title.clone(),
            Some(_) => return Err(OrmError::schema("'title' must be a non-empty string")),
            None if schema.is_object() => return Err(OrmError::schema("missing 'title'")),
            None => return Err(OrmError::schema("schema must be a JSON object")),
        };
        Ok(Self {
            title,
            schema,
            source: None,
        })
    }

    /// Read and parse one schema file.
    pub fn from_file(path: impl AsRef<Path>) -> OrmResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| OrmError::schema(format!("failed to read {}: {e}", path.display())))?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| OrmError::schema(format!("failed to parse {}: {e}", path.display())))?;
        let mut model = Self::from_value(value)
            .map_err(|e| OrmError::schema(format!("{}: {e}", path.display())))?;
        model.source = Some(path.to_path_buf());
        Ok(model)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The raw schema document.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// The file this schema was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Property names declared under `properties`, in declaration order.
    pub fn property_names(&self) -> Vec<&str> {
        self.schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Validate a payload against this schema.
    pub fn validate(&self, data: &Value) -> Result<(), ValidationErrors> {
        validate::validate(data, &self.schema)
    }
}

/// All loaded model schemas, keyed by title.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    models: BTreeMap<String, ModelSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file in `dir` (not recursive), in path order.
    pub fn load_dir(dir: impl AsRef<Path>) -> OrmResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(OrmError::schema(format!(
                "schema directory {} does not exist",
                dir.display()
            )));
        }

        let dir_str = dir
            .to_str()
            .ok_or_else(|| OrmError::schema(format!("non UTF-8 path: {}", dir.display())))?;
        // The directory part is literal; only the file name is a pattern.
        let pattern = Path::new(&glob::Pattern::escape(dir_str)).join("*.json");
        let pattern = pattern.to_string_lossy();
        let mut paths = glob::glob(&pattern)
            .map_err(|e| OrmError::schema(format!("invalid schema pattern: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| OrmError::schema(format!("failed to list {}: {e}", dir.display())))?;
        paths.sort();

        let mut registry = Self::new();
        for path in paths {
            let model = ModelSchema::from_file(&path)?;
            tracing::debug!(
                target: "schemorm.schema",
                model = model.title(),
                path = %path.display(),
                "loaded model schema"
            );
            registry.insert(model)?;
        }
        Ok(registry)
    }

    /// Register a schema; titles must be unique.
    pub fn insert(&mut self, model: ModelSchema) -> OrmResult<()> {
        if let Some(existing) = self.models.get(model.title()) {
            let origin = |m: &ModelSchema| {
                m.source()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<inline>".to_string())
            };
            return Err(OrmError::schema(format!(
                "duplicate model title '{}' ({} and {})",
                model.title(),
                origin(existing),
                origin(&model)
            )));
        }
        self.models.insert(model.title().to_string(), model);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ModelSchema> {
        self.models.get(name)
    }

    /// Look a model up, failing with [`OrmError::UnknownModel`].
    pub fn require(&self, name: &str) -> OrmResult<&ModelSchema> {
        self.get(name)
            .ok_or_else(|| OrmError::UnknownModel(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Model names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn title_is_required() {
        assert!(ModelSchema::from_value(json!({"type": "object"})).is_err());
        assert!(ModelSchema::from_value(json!({"title": ""})).is_err());
        assert!(ModelSchema::from_value(json!({"title": 3})).is_err());
        assert!(ModelSchema::from_value(json!([1])).is_err());
        let model = ModelSchema::from_value(json!({"title": "user"})).unwrap();
        assert_eq!(model.title(), "user");
        assert!(model.source().is_none());
    }

    #[test]
    fn property_names_keep_declaration_order() {
        let model = ModelSchema::from_value(json!({
            "title": "user",
            "properties": {"z": {}, "a": {}, "m": {}}
        }))
        .unwrap();
        assert_eq!(model.property_names(), ["z", "a", "m"]);
    }

    #[test]
    fn registry_rejects_duplicates() {
        let mut registry = SchemaRegistry::new();
        registry
            .insert(ModelSchema::from_value(json!({"title": "user"})).unwrap())
            .unwrap();
        let err = registry
            .insert(ModelSchema::from_value(json!({"title": "user"})).unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("duplicate model title 'user'"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn require_unknown_model() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.require("ghost"),
            Err(OrmError::UnknownModel(name)) if name == "ghost"
        ));
    }
}
