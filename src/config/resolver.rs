//! Policy resolution from the loaded parameter mapping

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::{LoggingPolicy, ModelSpec};
use crate::{Error, Result};

/// Reserved top-level parameter key holding the tracking configuration.
pub const DEFAULT_NAMESPACE: &str = "trueno_track";

/// Resolve the logging policy from a loaded parameter mapping.
///
/// The `namespace` entry is removed from `params`, so what remains (and what
/// the policy stores as project parameters) never contains tracking
/// configuration.
///
/// # Errors
///
/// Returns [`Error::Config`] if the namespace value is not a mapping, or if
/// one of its recognized options has the wrong shape.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use trueno_track::config::{resolve, DEFAULT_NAMESPACE};
///
/// let mut params = json!({
///     "alpha": 0.5,
///     "epochs": 10,
///     "trueno_track": {"params": ["alpha"], "models": ["regressor"]}
/// })
/// .as_object()
/// .cloned()
/// .unwrap();
///
/// let policy = resolve(&mut params, DEFAULT_NAMESPACE)?;
/// assert_eq!(policy.effective_params().len(), 1);
/// assert_eq!(policy.model_spec("regressor").unwrap().name(), "regressor");
/// assert!(!params.contains_key(DEFAULT_NAMESPACE));
/// # Ok::<(), trueno_track::Error>(())
/// ```
pub fn resolve(params: &mut Map<String, Value>, namespace: &str) -> Result<LoggingPolicy> {
    let Some(raw) = params.remove(namespace) else {
        return Ok(LoggingPolicy::log_all(params.clone()));
    };

    let config = match raw {
        Value::Object(config) => config,
        other => {
            return Err(Error::Config(format!(
                "'{namespace}' must be a mapping, got {}",
                kind(&other)
            )))
        }
    };

    let mut policy = LoggingPolicy::log_all(params.clone());
    policy.enabled = parse_enabled(&config, namespace)?.unwrap_or(true);
    policy.parameter_selection = parse_names(&config, "params", namespace)?;
    policy.model_specs = parse_models(&config, namespace)?;
    policy.dataset_selection = parse_names(&config, "datasets", namespace)?;
    policy.metric_selection = parse_names(&config, "metrics", namespace)?;
    policy.artifact_selection = parse_names(&config, "artifacts", namespace)?;
    policy.tags = parse_tags(&config, namespace)?;

    Ok(policy)
}

/// Look up an option, treating an explicit `null` like an absent key.
fn option<'a>(config: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    config.get(key).filter(|value| !value.is_null())
}

fn parse_enabled(config: &Map<String, Value>, namespace: &str) -> Result<Option<bool>> {
    match option(config, "enabled") {
        None => Ok(None),
        Some(Value::Bool(enabled)) => Ok(Some(*enabled)),
        Some(other) => Err(Error::Config(format!(
            "'{namespace}.enabled' must be a boolean, got {}",
            kind(other)
        ))),
    }
}

fn parse_names(config: &Map<String, Value>, key: &str, namespace: &str) -> Result<Option<Vec<String>>> {
    let Some(value) = option(config, key) else {
        return Ok(None);
    };
    let Value::Array(items) = value else {
        return Err(Error::Config(format!(
            "'{namespace}.{key}' must be a list of names, got {}",
            kind(value)
        )));
    };

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                Error::Config(format!(
                    "'{namespace}.{key}' entries must be strings, got {}",
                    kind(item)
                ))
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn parse_models(config: &Map<String, Value>, namespace: &str) -> Result<BTreeMap<String, ModelSpec>> {
    match option(config, "models") {
        None => Ok(BTreeMap::new()),
        Some(Value::Array(_)) => Ok(parse_names(config, "models", namespace)?
            .unwrap_or_default()
            .into_iter()
            .map(|output| {
                let spec = ModelSpec::new(&output, None, None);
                (output, spec)
            })
            .collect()),
        Some(Value::Object(specs)) => specs
            .iter()
            .map(|(output, spec)| {
                parse_model_spec(output, spec, namespace).map(|spec| (output.clone(), spec))
            })
            .collect(),
        Some(other) => Err(Error::Config(format!(
            "'{namespace}.models' must be a list or a mapping, got {}",
            kind(other)
        ))),
    }
}

fn parse_model_spec(output: &str, spec: &Value, namespace: &str) -> Result<ModelSpec> {
    let fields = match spec {
        Value::Null => return Ok(ModelSpec::new(output, None, None)),
        Value::Object(fields) => fields,
        other => {
            return Err(Error::Config(format!(
                "'{namespace}.models.{output}' must be a mapping, got {}",
                kind(other)
            )))
        }
    };

    let name = optional_string(fields, "name", output, namespace)?;
    let input_ref = optional_string(fields, "input", output, namespace)?;

    Ok(ModelSpec::new(output, name, input_ref.map(str::to_string)))
}

fn optional_string<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
    output: &str,
    namespace: &str,
) -> Result<Option<&'a str>> {
    match option(fields, key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(other) => Err(Error::Config(format!(
            "'{namespace}.models.{output}.{key}' must be a string, got {}",
            kind(other)
        ))),
    }
}

fn parse_tags(config: &Map<String, Value>, namespace: &str) -> Result<Map<String, Value>> {
    match option(config, "tags") {
        None => Ok(Map::new()),
        Some(Value::Object(tags)) => Ok(tags.clone()),
        Some(other) => Err(Error::Config(format!(
            "'{namespace}.tags' must be a mapping, got {}",
            kind(other)
        ))),
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
