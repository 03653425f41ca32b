use crate::cli::{SchemaSource, SchemaValidateArgs};
use anyhow::Context;
use schemorm::{OrmConfig, SchemaRegistry};

fn load(source: &SchemaSource) -> anyhow::Result<SchemaRegistry> {
    let dir = match source {
        SchemaSource::Dir(dir) => dir.clone(),
        SchemaSource::Config(path) => {
            let config = OrmConfig::from_file(path)?;
            config.schema_dir.with_context(|| {
                format!("{} does not set schema_dir", path.display())
            })?
        }
    };
    let registry = SchemaRegistry::load_dir(&dir)?;
    tracing::info!(dir = %dir.display(), models = registry.len(), "schemas loaded");
    Ok(registry)
}

/// Summarize every loaded model, one per line.
pub fn describe(registry: &SchemaRegistry) -> String {
    registry
        .names()
        .filter_map(|name| registry.get(name))
        .map(|model| {
            let props = model.property_names();
            if props.is_empty() {
                model.title().to_string()
            } else {
                format!("{}: {}", model.title(), props.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn check(source: &SchemaSource) -> anyhow::Result<()> {
    let registry = load(source)?;
    if registry.is_empty() {
        anyhow::bail!("no model schemas found");
    }
    println!("{}", describe(&registry));
    println!("ok: {} model(s)", registry.len());
    Ok(())
}

pub fn validate(args: &SchemaValidateArgs) -> anyhow::Result<()> {
    let registry = load(&args.source)?;
    let model = registry.require(&args.model)?;
    let data = serde_json::from_str(&args.data).context("--data is not valid JSON")?;
    match model.validate(&data) {
        Ok(()) => {
            println!("ok: payload is a valid {}", model.title());
            Ok(())
        }
        Err(errors) => {
            for err in errors.iter() {
                println!("{err}");
            }
            anyhow::bail!("{} validation error(s)", errors.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemorm::ModelSchema;
    use serde_json::json;

    #[test]
    fn describe_lists_models_and_properties() {
        let mut registry = SchemaRegistry::new();
        registry
            .insert(
                ModelSchema::from_value(json!({
                    "title": "user",
                    "properties": {"firstName": {}, "age": {}}
                }))
                .unwrap(),
            )
            .unwrap();
        registry
            .insert(ModelSchema::from_value(json!({"title": "audit"})).unwrap())
            .unwrap();

        assert_eq!(describe(&registry), "audit\nuser: firstName, age");
    }
}
