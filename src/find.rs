//! Template locator for cookiecutter.
//! Determines which directory under an acquired repository is the actual
//! template root, i.e. the one holding the variable-definition file.

use crate::context::CONTEXT_FILE;
use crate::error::{Error, Result};
use crate::render::RenderEnvironment;
use log::debug;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Well-known child directories checked before falling back to a scan.
const TEMPLATE_DIR_CANDIDATES: [&str; 3] = [
    "_cookiecutter",
    "cookiecutter",
    "{{cookiecutter.project_name}}",
];

/// Determines which directory of `repo_dir` is the project template.
///
/// Checks, in order: the repository root itself, the well-known candidate
/// names, then every non-hidden subdirectory in listing order, returning the
/// first that contains the variable-definition file at its top level.
/// Candidate names holding unresolved template expressions are rendered
/// against the empty context before the existence check; if rendering fails
/// the literal name is used instead.
///
/// # Errors
/// * `Error::NoTemplateFoundError` when no candidate matches
pub fn find_template(repo_dir: &Path, env: &RenderEnvironment) -> Result<PathBuf> {
    debug!("Searching {} for the project template", repo_dir.display());

    if is_template_dir(repo_dir) {
        return Ok(repo_dir.to_path_buf());
    }

    for candidate in TEMPLATE_DIR_CANDIDATES {
        let name = if candidate.contains("{{") {
            match env.render(candidate, "template-dir", &json!({})) {
                Ok(rendered) if !rendered.trim().is_empty() => rendered,
                _ => candidate.to_string(),
            }
        } else {
            candidate.to_string()
        };

        let dir = repo_dir.join(name);
        if is_template_dir(&dir) {
            return Ok(dir);
        }
    }

    for entry in std::fs::read_dir(repo_dir)?.flatten() {
        let dir = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if dir.is_dir() && !hidden && is_template_dir(&dir) {
            return Ok(dir);
        }
    }

    Err(Error::NoTemplateFoundError {
        directory: repo_dir.display().to_string(),
    })
}

fn is_template_dir(dir: &Path) -> bool {
    dir.join(CONTEXT_FILE).is_file()
}
