//! Context assembly for cookiecutter templates.
//! Loads the variable-definition file, wraps it under the reserved context
//! key and applies default and override variable sets via a recursive merge.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde_json::{Map, Value};
use std::path::Path;

/// Reserved top-level context key; templates address variables through it.
pub const CONTEXT_KEY: &str = "cookiecutter";

/// The variable-definition file found at the template root.
pub const CONTEXT_FILE: &str = "cookiecutter.json";

/// Keys with this prefix are carried through unmodified and never prompted.
pub const PRIVATE_PREFIX: char = '_';

/// Template used for the output directory name; may also hold the
/// nested-template mapping before selection.
pub const TEMPLATE_KEY: &str = "_template";

/// List of extension names loaded into the render environment.
pub const EXTENSIONS_KEY: &str = "_extensions";

/// Glob patterns marking paths that are copied verbatim, never rendered.
pub const COPY_WITHOUT_RENDER_KEY: &str = "_copy_without_render";

/// Render environment settings and extra template globals.
pub const ENV_VARS_KEY: &str = "_env_vars";

/// Per-variable prompt label overrides.
pub const PROMPTS_KEY: &str = "__prompts__";

/// Absolute output directory, inserted by the pipeline for hooks to read.
pub const OUTPUT_DIR_KEY: &str = "_output_dir";

/// The shape of a single template variable, determined once from the raw
/// value in the variable-definition file and matched exhaustively when
/// prompting.
#[derive(Debug)]
pub enum VariableSpec<'a> {
    /// Ordered list of options; the first is the default
    Choice(&'a Vec<Value>),
    /// Yes/no variable
    Boolean(bool),
    /// Nested mapping entered as a structured value
    Structured(&'a Map<String, Value>),
    /// Everything else: rendered as a template against the context so far
    Scalar(&'a Value),
}

impl<'a> VariableSpec<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(options) => VariableSpec::Choice(options),
            Value::Bool(flag) => VariableSpec::Boolean(*flag),
            Value::Object(mapping) => VariableSpec::Structured(mapping),
            other => VariableSpec::Scalar(other),
        }
    }
}

/// Borrows the variable mapping under the reserved context key.
pub fn variables(context: &Value) -> Option<&Map<String, Value>> {
    context.get(CONTEXT_KEY)?.as_object()
}

/// Mutably borrows the variable mapping under the reserved context key.
pub fn variables_mut(context: &mut Value) -> Option<&mut Map<String, Value>> {
    context.get_mut(CONTEXT_KEY)?.as_object_mut()
}

/// Modifies `context` in place based on `overwrite`.
///
/// Mapping values recurse into the existing sub-mapping, creating it when
/// absent, so nested keys missing from the override keep their base values.
/// Any other value overwrites outright. The merge is not commutative: later
/// sources win at the leaf level.
pub fn apply_overwrites(context: &mut Map<String, Value>, overwrite: &Map<String, Value>) {
    for (key, value) in overwrite {
        match value {
            Value::Object(nested) => {
                let entry = context
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                // or_insert_with guarantees an object here
                apply_overwrites(entry.as_object_mut().unwrap(), nested);
            }
            _ => {
                context.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Generates the context for a project template.
///
/// Parses the variable-definition file preserving key order (the order
/// defines prompt order and rendering dependency order), wraps it under the
/// reserved context key and applies `default_context` then `extra_context`
/// through [`apply_overwrites`].
///
/// # Errors
/// * `Error::IoError` if the file cannot be read
/// * `Error::ContextDecodingError` wrapping the parser message on malformed
///   input
pub fn generate_context(
    context_file: &Path,
    default_context: Option<&Map<String, Value>>,
    extra_context: Option<&Map<String, Value>>,
) -> Result<Value> {
    let content = std::fs::read_to_string(context_file)?;
    let raw: IndexMap<String, Value> =
        serde_json::from_str(&content).map_err(|e| Error::ContextDecodingError {
            context_file: context_file.display().to_string(),
            message: e.to_string(),
        })?;

    let mut fields: Map<String, Value> = raw.into_iter().collect();

    if let Some(defaults) = default_context {
        apply_overwrites(&mut fields, defaults);
    }
    if let Some(overrides) = extra_context {
        apply_overwrites(&mut fields, overrides);
    }

    let mut context = Map::new();
    context.insert(CONTEXT_KEY.to_string(), Value::Object(fields));
    debug!("Context generated from {}", context_file.display());

    Ok(Value::Object(context))
}
