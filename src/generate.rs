//! Core file generation engine.
//! Walks the template tree, renders directory and file names and file
//! contents against the context, applies binary and copy-only exclusion
//! rules and writes the output tree, with rollback on failure.

use crate::context::{self, CONTEXT_FILE, COPY_WITHOUT_RENDER_KEY, TEMPLATE_KEY};
use crate::error::{Error, Result};
use crate::hooks::{self, HOOKS_DIR, POST_GEN_HOOK, PRE_GEN_HOOK};
use crate::render::{self, RenderEnvironment};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, error, warn};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Output directory name template used when the variable-definition file
/// does not set the reserved template-name key.
const DEFAULT_NAME_TEMPLATE: &str = "{{ cookiecutter.project_name }}";

/// Bytes sniffed from the head of a file for the binary classification.
const SNIFF_LEN: u64 = 1024;

/// Heuristic binary classification over a file's leading bytes.
///
/// A null byte is decisive; otherwise a high share of non-text control
/// characters marks the file as binary. Misclassification of exotic inputs
/// is a known boundary behavior, not an exact format check.
pub fn looks_binary(head: &[u8]) -> bool {
    if head.is_empty() {
        return false;
    }
    if head.contains(&0) {
        return true;
    }
    let non_text = head
        .iter()
        .filter(|&&b| b < 0x20 && !(0x07..=0x0d).contains(&b) && b != 0x1b)
        .count();
    non_text * 100 / head.len() > 30
}

/// Sniffs the head of the file at `path` and classifies it.
pub fn is_binary(path: &Path) -> Result<bool> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    std::fs::File::open(path)?
        .take(SNIFF_LEN)
        .read_to_end(&mut head)?;
    Ok(looks_binary(&head))
}

/// Compiles the context's copy-without-render patterns into a glob set.
pub fn copy_without_render_patterns(context: &Value) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    if let Some(patterns) = context::variables(context)
        .and_then(|f| f.get(COPY_WITHOUT_RENDER_KEY))
        .and_then(Value::as_array)
    {
        for pattern in patterns {
            let Some(pattern) = pattern.as_str() else {
                continue;
            };
            builder.add(Glob::new(pattern).map_err(|e| {
                Error::ConfigError(format!("invalid copy-without-render pattern: {}", e))
            })?);
        }
    }
    builder
        .build()
        .map_err(|e| Error::ConfigError(format!("invalid copy-without-render patterns: {}", e)))
}

fn classify_render_error(err: minijinja::Error, source_name: &str, dest_name: &str) -> Error {
    if render::is_undefined_error(&err) {
        Error::UndefinedVariableError {
            message: format!("Unable to create file '{}': {}", dest_name, err),
        }
    } else if err.kind() == minijinja::ErrorKind::SyntaxError {
        Error::TemplateSyntaxError {
            name: err.name().unwrap_or(source_name).to_string(),
            line: err.line().unwrap_or(0),
            message: err.to_string(),
        }
    } else {
        Error::MinijinjaError(err)
    }
}

/// Renders a template-root-relative path into its destination form.
fn render_path(env: &RenderEnvironment, relative: &str, context: &Value) -> Result<String> {
    env.render(relative, relative, context)
        .map_err(|e| classify_render_error(e, relative, relative))
}

/// Renders the output directory's name template and creates the directory.
///
/// An existing target is recursively deleted when overwriting is allowed and
/// is an error otherwise.
pub fn render_and_create_dir(
    dirname: &str,
    context: &Value,
    output_dir: &Path,
    env: &RenderEnvironment,
    overwrite_if_exists: bool,
) -> Result<PathBuf> {
    let rendered = env.render(dirname, TEMPLATE_KEY, context).map_err(|e| {
        if render::is_undefined_error(&e) {
            Error::UndefinedVariableError {
                message: format!("Unable to render output directory name '{}': {}", dirname, e),
            }
        } else {
            classify_render_error(e, TEMPLATE_KEY, dirname)
        }
    })?;
    let dir_to_create = output_dir.join(rendered);
    debug!("Project directory renders to {}", dir_to_create.display());

    if dir_to_create.exists() {
        if overwrite_if_exists {
            debug!("Removing existing directory {}", dir_to_create.display());
            std::fs::remove_dir_all(&dir_to_create)?;
        } else {
            return Err(Error::OutputDirExistsError {
                output_dir: dir_to_create.display().to_string(),
            });
        }
    }
    std::fs::create_dir_all(&dir_to_create)?;
    Ok(dir_to_create)
}

/// Entries pruned from the walk: names starting with `.` or `_` at any
/// level, plus the variable-definition file and the hooks directory at the
/// template root.
fn is_excluded(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') || name.starts_with('_') {
        return true;
    }
    entry.depth() == 1 && (name == CONTEXT_FILE || name == HOOKS_DIR)
}

fn generate_file(
    project_dir: &Path,
    template_dir: &Path,
    relative: &str,
    context: &Value,
    env: &RenderEnvironment,
    skip_if_file_exists: bool,
    copy_only: &GlobSet,
) -> Result<()> {
    debug!("Processing file {}", relative);

    // Render the path to the output file, not yet the contents
    let outfile_rel = render_path(env, relative, context)?;
    if outfile_rel.trim().is_empty() {
        debug!("Skipping {}: rendered path is empty", relative);
        return Ok(());
    }
    let outfile = project_dir.join(&outfile_rel);

    if skip_if_file_exists && outfile.exists() {
        debug!("File {} already exists, skipping", outfile.display());
        return Ok(());
    }

    if let Some(parent) = outfile.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let source = template_dir.join(relative);
    if copy_only.is_match(relative) || is_binary(&source)? {
        debug!("Copying {} to {} without rendering", relative, outfile.display());
        std::fs::copy(&source, &outfile)?;
        return Ok(());
    }

    let content = std::fs::read_to_string(&source)?;
    let rendered = env
        .render(&content, relative, context)
        .map_err(|e| classify_render_error(e, relative, &outfile_rel))?;
    debug!("Writing {}", outfile.display());
    std::fs::write(&outfile, rendered)?;
    Ok(())
}

fn generate_into(
    template_dir: &Path,
    context: &Value,
    project_dir: &Path,
    skip_if_file_exists: bool,
    accept_hooks: bool,
    env: &RenderEnvironment,
) -> Result<()> {
    if accept_hooks {
        hooks::run_hook(template_dir, PRE_GEN_HOOK, project_dir, context, env)?;
    }

    let copy_only = copy_without_render_patterns(context)?;

    let walker = WalkDir::new(template_dir)
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry));
    for entry in walker {
        let entry = entry.map_err(|e| Error::IoError(e.into()))?;
        if entry.depth() == 0 {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(template_dir)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        let relative = relative.to_str().ok_or_else(|| {
            Error::ConfigError(format!("path is not valid UTF-8: {}", entry.path().display()))
        })?;

        if entry.file_type().is_dir() {
            let rendered = render_path(env, relative, context)?;
            if rendered.trim().is_empty() {
                debug!("Skipping {}: rendered path is empty", relative);
                continue;
            }
            std::fs::create_dir_all(project_dir.join(rendered))?;
        } else {
            generate_file(
                project_dir,
                template_dir,
                relative,
                context,
                env,
                skip_if_file_exists,
                &copy_only,
            )?;
        }
    }

    if accept_hooks {
        hooks::run_hook(template_dir, POST_GEN_HOOK, project_dir, context, env)?;
    }
    Ok(())
}

/// Renders the template tree into the output directory and returns the
/// generated project's path.
///
/// The output directory name is rendered from the reserved template-name
/// variable. Lifecycle hooks run before and after the walk when accepted.
/// Any failure after the project directory has been created removes it
/// again, unless `keep_project_on_failure` is set; a cleanup failure is
/// logged and never masks the original error.
pub fn generate_files(
    template_dir: &Path,
    context: &Value,
    output_dir: &Path,
    overwrite_if_exists: bool,
    skip_if_file_exists: bool,
    accept_hooks: bool,
    keep_project_on_failure: bool,
) -> Result<PathBuf> {
    let env = RenderEnvironment::new(context, Some(template_dir))?;
    debug!("Generating project from {}", template_dir.display());

    let name_template = context::variables(context)
        .and_then(|f| f.get(TEMPLATE_KEY))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_NAME_TEMPLATE)
        .to_string();

    let project_dir = render_and_create_dir(
        &name_template,
        context,
        output_dir,
        &env,
        overwrite_if_exists,
    )?;

    if let Err(err) = generate_into(
        template_dir,
        context,
        &project_dir,
        skip_if_file_exists,
        accept_hooks,
        &env,
    ) {
        if keep_project_on_failure {
            warn!(
                "Generation failed, keeping {} as requested",
                project_dir.display()
            );
        } else if let Err(cleanup_err) = std::fs::remove_dir_all(&project_dir) {
            error!(
                "Failed to remove {} while cleaning up: {}",
                project_dir.display(),
                cleanup_err
            );
        }
        return Err(err);
    }

    Ok(project_dir)
}
