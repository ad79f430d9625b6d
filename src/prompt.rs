//! User input and interaction handling.
//! Defines the prompting boundary (free text, yes/no, single choice,
//! structured value), its dialoguer-backed implementation, and the prompting
//! pass that fills unresolved context values in insertion order.

use crate::context::{self, VariableSpec, PRIVATE_PREFIX, PROMPTS_KEY, TEMPLATE_KEY};
use crate::error::{Error, Result};
use crate::render::{self, RenderEnvironment};
use dialoguer::{Input, Select};
use serde_json::{Map, Value};

/// Tokens accepted as a "yes" answer, case-insensitive.
pub const TRUTHY_TOKENS: [&str; 6] = ["1", "true", "t", "yes", "y", "on"];

/// Tokens accepted as a "no" answer, case-insensitive.
pub const FALSY_TOKENS: [&str; 6] = ["0", "false", "f", "no", "n", "off"];

/// Parses a yes/no token from the fixed vocabulary.
///
/// Returns `None` for anything outside the vocabulary; callers treat that as
/// an invalid response requiring a re-prompt.
pub fn parse_yes_no(input: &str) -> Option<bool> {
    let token = input.trim().to_lowercase();
    if TRUTHY_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if FALSY_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Boundary for interactive prompting.
///
/// Each ask returns a validated value; invalid input is re-asked by the
/// implementation, never surfaced to the caller.
pub trait Prompter {
    /// Free text entry with an editable default.
    fn read_text(&self, prompt: &str, default: &str) -> Result<String>;

    /// Yes/no query over the fixed token vocabulary.
    fn read_yes_no(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Single choice from an ordered option list; returns the chosen index.
    fn read_choice(&self, prompt: &str, options: &[String]) -> Result<usize>;

    /// Structured (mapping) entry; the default is offered serialized.
    fn read_structured(
        &self,
        prompt: &str,
        default: &Map<String, Value>,
    ) -> Result<Map<String, Value>>;
}

/// Terminal prompter backed by dialoguer.
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        DialoguerPrompter::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn read_text(&self, prompt: &str, default: &str) -> Result<String> {
        Input::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .interact_text()
            .map_err(|e| Error::ConfigError(e.to_string()))
    }

    fn read_yes_no(&self, prompt: &str, default: bool) -> Result<bool> {
        let default_token = if default { "yes" } else { "no" };
        let input: String = Input::new()
            .with_prompt(format!("{} [y/n]", prompt))
            .default(default_token.to_string())
            .validate_with(|value: &String| match parse_yes_no(value) {
                Some(_) => Ok(()),
                None => Err("please answer with a yes or no value (e.g. 'y', 'no', 'on')"),
            })
            .interact_text()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        Ok(parse_yes_no(&input).unwrap_or(default))
    }

    fn read_choice(&self, prompt: &str, options: &[String]) -> Result<usize> {
        Select::new()
            .with_prompt(prompt)
            .default(0)
            .items(options)
            .interact()
            .map_err(|e| Error::ConfigError(e.to_string()))
    }

    fn read_structured(
        &self,
        prompt: &str,
        default: &Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let serialized = serde_json::to_string(&Value::Object(default.clone()))
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        let input: String = Input::new()
            .with_prompt(prompt)
            .default(serialized)
            .validate_with(|value: &String| {
                match serde_json::from_str::<Map<String, Value>>(value) {
                    Ok(_) => Ok(()),
                    Err(_) => Err("please enter a valid JSON mapping"),
                }
            })
            .interact_text()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        serde_json::from_str(&input).map_err(|e| Error::ConfigError(e.to_string()))
    }
}

/// Renders a raw default value against the context so far.
///
/// Only strings are templates; every other value passes through unchanged.
fn render_variable(
    env: &RenderEnvironment,
    raw: &Value,
    context: &Value,
    key: &str,
) -> Result<Value> {
    let Value::String(source) = raw else {
        return Ok(raw.clone());
    };
    let rendered = env
        .render(source, key, context)
        .map_err(|e| render_error_for_key(key, e))?;
    Ok(Value::String(rendered))
}

fn render_error_for_key(key: &str, err: minijinja::Error) -> Error {
    if render::is_undefined_error(&err) {
        Error::UndefinedVariableError {
            message: format!("Unable to render variable '{}': {}", key, err),
        }
    } else {
        Error::MinijinjaError(err)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn prompt_choice(
    env: &RenderEnvironment,
    context: &Value,
    key: &str,
    label: &str,
    options: &[Value],
    no_input: bool,
    prompter: &dyn Prompter,
) -> Result<Value> {
    if options.is_empty() {
        return Err(Error::ConfigError(format!(
            "variable '{}' has an empty choice list",
            key
        )));
    }

    let rendered: Vec<Value> = options
        .iter()
        .map(|opt| render_variable(env, opt, context, key))
        .collect::<Result<_>>()?;

    if no_input {
        return Ok(rendered[0].clone());
    }

    let items: Vec<String> = rendered.iter().map(display_value).collect();
    let index = prompter.read_choice(label, &items)?;
    Ok(rendered[index].clone())
}

fn prompt_scalar(
    env: &RenderEnvironment,
    context: &Value,
    key: &str,
    label: &str,
    raw: &Value,
    no_input: bool,
    prompter: &dyn Prompter,
) -> Result<Value> {
    let rendered = render_variable(env, raw, context, key)?;
    if no_input {
        return Ok(rendered);
    }
    let input = prompter.read_text(label, &display_value(&rendered))?;
    Ok(Value::String(input))
}

/// Fills every unresolved context value, in insertion order.
///
/// Private keys are carried through untouched. Remaining keys dispatch on
/// [`VariableSpec`]: lists become choices (no-input picks the first), bools
/// become yes/no queries, mappings are entered as structured values, and
/// scalars are rendered against the context so far (a later field's default
/// may reference an earlier field's already-resolved value) and offered as an
/// editable default. With `no_input` every computed default is
/// accepted without blocking.
///
/// # Errors
/// * `Error::UndefinedVariableError` naming the offending key on any render
///   failure during this pass
pub fn prompt_for_config(
    context: &mut Value,
    no_input: bool,
    prompter: &dyn Prompter,
) -> Result<()> {
    let env = RenderEnvironment::new(context, None)?;

    let keys: Vec<String> = context::variables(context)
        .map(|fields| fields.keys().cloned().collect())
        .unwrap_or_default();

    let labels: Map<String, Value> = context::variables(context)
        .and_then(|fields| fields.get(PROMPTS_KEY))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    for key in keys {
        if key.starts_with(PRIVATE_PREFIX) {
            continue;
        }
        let Some(raw) = context::variables(context).and_then(|f| f.get(&key)).cloned() else {
            continue;
        };
        let label = labels
            .get(&key)
            .and_then(Value::as_str)
            .unwrap_or(&key)
            .to_string();

        let value = match VariableSpec::classify(&raw) {
            VariableSpec::Choice(options) => {
                prompt_choice(&env, context, &key, &label, options, no_input, prompter)?
            }
            VariableSpec::Boolean(flag) => {
                if no_input {
                    Value::Bool(flag)
                } else {
                    Value::Bool(prompter.read_yes_no(&label, flag)?)
                }
            }
            VariableSpec::Structured(mapping) => {
                if no_input {
                    Value::Object(mapping.clone())
                } else {
                    Value::Object(prompter.read_structured(&label, mapping)?)
                }
            }
            VariableSpec::Scalar(raw_value) => {
                prompt_scalar(&env, context, &key, &label, raw_value, no_input, prompter)?
            }
        };

        if let Some(fields) = context::variables_mut(context) {
            fields.insert(key.clone(), value);
        }
    }

    Ok(())
}

/// Resolves a nested-template mapping into a concrete template path.
///
/// When the reserved template-name value is a mapping of option-name → path,
/// presents it as a choice (no-input picks the first entry), replaces the
/// value with the chosen path string and returns it so the pipeline can
/// re-locate the template. Anything else passes through unchanged.
pub fn choose_nested_template(
    context: &mut Value,
    no_input: bool,
    prompter: &dyn Prompter,
) -> Result<Option<String>> {
    let Some(options) = context::variables(context)
        .and_then(|f| f.get(TEMPLATE_KEY))
        .and_then(Value::as_object)
        .cloned()
    else {
        return Ok(None);
    };

    if options.is_empty() {
        return Err(Error::ConfigError(
            "nested template mapping has no entries".to_string(),
        ));
    }

    let names: Vec<String> = options.keys().cloned().collect();
    let index = if no_input {
        0
    } else {
        prompter.read_choice(TEMPLATE_KEY, &names)?
    };

    let Some(chosen) = options
        .iter()
        .nth(index)
        .and_then(|(_, value)| value.as_str())
    else {
        return Ok(None);
    };

    if let Some(fields) = context::variables_mut(context) {
        fields.insert(TEMPLATE_KEY.to_string(), Value::String(chosen.to_string()));
    }
    Ok(Some(chosen.to_string()))
}
