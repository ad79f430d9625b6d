//! Render environment factory for cookiecutter.
//! Builds the single MiniJinja environment shared by every name, content and
//! hook render in one invocation, configured from the assembled context.

use crate::context::{self, ENV_VARS_KEY, EXTENSIONS_KEY};
use crate::error::{Error, Result};
use minijinja::{path_loader, AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde_json::Value;
use std::path::Path;

/// MiniJinja-based render environment.
///
/// Immutable after construction; rebuilt once per invocation.
pub struct RenderEnvironment {
    env: Environment<'static>,
}

impl RenderEnvironment {
    /// Builds the environment from the assembled context.
    ///
    /// Undefined variables are strict errors, case/slug filters are always
    /// installed, extensions named in the context's private extension list
    /// are resolved against a fixed table, and the private environment
    /// settings entry tunes whitespace handling; its unrecognized keys become
    /// template globals. When `template_root` is given, a filesystem loader
    /// rooted there serves `{% include %}` and `{% extends %}` lookups.
    ///
    /// # Errors
    /// * `Error::UnknownExtensionError` for extension names outside the table
    pub fn new(context: &Value, template_root: Option<&Path>) -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        // Templates are named after the files they produce; suffix-based
        // escaping would mangle generated markup files.
        env.set_auto_escape_callback(|_| AutoEscape::None);

        if let Some(root) = template_root {
            env.set_loader(path_loader(root));
        }

        add_default_filters(&mut env);

        let fields = context::variables(context);

        if let Some(extensions) = fields
            .and_then(|f| f.get(EXTENSIONS_KEY))
            .and_then(Value::as_array)
        {
            for name in extensions {
                let name = name.as_str().ok_or_else(|| Error::UnknownExtensionError {
                    name: name.to_string(),
                })?;
                register_extension(&mut env, name)?;
            }
        }

        if let Some(settings) = fields
            .and_then(|f| f.get(ENV_VARS_KEY))
            .and_then(Value::as_object)
        {
            for (key, value) in settings {
                match key.as_str() {
                    "trim_blocks" => env.set_trim_blocks(value.as_bool().unwrap_or(false)),
                    "lstrip_blocks" => env.set_lstrip_blocks(value.as_bool().unwrap_or(false)),
                    "keep_trailing_newline" => {
                        env.set_keep_trailing_newline(value.as_bool().unwrap_or(true))
                    }
                    _ => env.add_global(key.clone(), minijinja::Value::from_serialize(value)),
                }
            }
        }

        Ok(Self { env })
    }

    /// Renders a one-off template string with the given context.
    ///
    /// The name is attached to the template so syntax errors carry the
    /// offending source and line number.
    pub fn render(
        &self,
        source: &str,
        name: &str,
        context: &Value,
    ) -> std::result::Result<String, minijinja::Error> {
        self.env.render_named_str(name, source, context)
    }
}

/// Whether a render failure was caused by an undefined template variable.
pub fn is_undefined_error(err: &minijinja::Error) -> bool {
    err.kind() == ErrorKind::UndefinedError
}

fn add_default_filters(env: &mut Environment<'static>) {
    env.add_filter("slugify", |value: String| {
        cruet::to_kebab_case(&value.to_lowercase())
    });
    env.add_filter("snake_case", |value: String| cruet::to_snake_case(&value));
    env.add_filter("camel_case", |value: String| cruet::to_camel_case(&value));
    env.add_filter("pascal_case", |value: String| cruet::to_pascal_case(&value));
    env.add_filter("title_case", |value: String| cruet::to_title_case(&value));
    env.add_filter(
        "jsonify",
        |value: minijinja::Value| -> std::result::Result<String, minijinja::Error> {
            serde_json::to_string(&value).map_err(|e| {
                minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string())
            })
        },
    );
}

fn register_extension(env: &mut Environment<'static>, name: &str) -> Result<()> {
    match name {
        "uuid" => {
            env.add_function("uuid4", || uuid::Uuid::new_v4().to_string());
        }
        "time" => {
            env.add_function(
                "now",
                |format: Option<String>| -> std::result::Result<String, minijinja::Error> {
                    use std::fmt::Write;
                    let format = format.unwrap_or_else(|| "%Y-%m-%d".to_string());
                    let mut out = String::new();
                    write!(out, "{}", chrono::Local::now().format(&format)).map_err(|_| {
                        minijinja::Error::new(
                            ErrorKind::InvalidOperation,
                            "invalid time format string",
                        )
                    })?;
                    Ok(out)
                },
            );
        }
        other => {
            return Err(Error::UnknownExtensionError {
                name: other.to_string(),
            })
        }
    }
    Ok(())
}
