//! Lifecycle hook processing.
//! Discovers scripts in the template's hooks directory, renders them against
//! the context and executes them as subprocesses from the target directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::context::CONTEXT_FILE;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::render::{self, RenderEnvironment};
use log::debug;
use serde_json::Value;

pub const PRE_PROMPT_HOOK: &str = "pre_prompt";
pub const PRE_GEN_HOOK: &str = "pre_gen_project";
pub const POST_GEN_HOOK: &str = "post_gen_project";

pub const HOOKS_DIR: &str = "hooks";

/// Extensions dispatched through an explicit interpreter; everything else is
/// executed directly as an executable file.
const INTERPRETERS: [(&str, &str); 1] = [("py", "python3")];

// ENOEXEC: the kernel refused to run the file as a program.
#[cfg(unix)]
fn is_exec_format_error(err: &std::io::Error) -> bool {
    err.raw_os_error() == Some(8)
}

#[cfg(not(unix))]
fn is_exec_format_error(_err: &std::io::Error) -> bool {
    false
}

/// Locates the hook script for `hook_name` under `template_dir`.
///
/// Looks in `hooks/` and, when a variable-definition file exists at
/// `template_dir`, also in `hooks/<hook_name>/`. The first regular file
/// whose base name (extension stripped) equals the hook name wins, in
/// directory-listing order. A missing hook is not an error.
pub fn find_hook(template_dir: &Path, hook_name: &str) -> Option<PathBuf> {
    let hooks_dir = template_dir.join(HOOKS_DIR);
    if !hooks_dir.is_dir() {
        debug!("No hooks directory found in {}", template_dir.display());
        return None;
    }

    let mut candidates = vec![hooks_dir.clone()];
    if template_dir.join(CONTEXT_FILE).is_file() {
        candidates.push(hooks_dir.join(hook_name));
    }

    for candidate in candidates {
        let Ok(entries) = std::fs::read_dir(&candidate) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && path.file_stem().is_some_and(|stem| stem == hook_name) {
                return Some(path);
            }
        }
    }

    None
}

pub fn confirm_hook_execution(
    prompter: &dyn Prompter,
    template_dir: &Path,
) -> Result<bool> {
    let has_hooks = [PRE_PROMPT_HOOK, PRE_GEN_HOOK, POST_GEN_HOOK]
        .iter()
        .any(|name| find_hook(template_dir, name).is_some());
    if !has_hooks {
        return Ok(true);
    }
    prompter.read_yes_no(
        "This template contains hooks that will run commands on your system. Execute them?",
        true,
    )
}

/// Executes a script as a subprocess from the given working directory.
///
/// Interpreter dispatch is by file extension; extensions outside the table
/// run the file directly.
pub fn run_script(script_path: &Path, cwd: &Path) -> Result<()> {
    let extension = script_path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let mut command = match INTERPRETERS.iter().find(|(ext, _)| *ext == extension) {
        Some((_, interpreter)) => {
            let mut command = Command::new(interpreter);
            command.arg(script_path);
            command
        }
        None => Command::new(script_path),
    };

    let status = command.current_dir(cwd).status().map_err(|e| {
        if is_exec_format_error(&e) {
            Error::FailedHookError {
                message: "might be an empty or invalid script file".to_string(),
            }
        } else {
            Error::FailedHookError {
                message: format!("error: {}", e),
            }
        }
    })?;

    if !status.success() {
        return Err(Error::FailedHookError {
            message: status.to_string(),
        });
    }
    Ok(())
}

/// Renders a hook script against the context and executes the result.
///
/// The rendered text is written to a fresh scratch directory, keeping the
/// original script's permission bits, and run with `cwd` as working
/// directory. The scratch directory is removed unconditionally afterwards.
pub fn run_script_with_context(
    script_path: &Path,
    cwd: &Path,
    context: &Value,
    env: &RenderEnvironment,
) -> Result<()> {
    let contents = std::fs::read_to_string(script_path)?;
    let rendered = env
        .render(&contents, &script_path.display().to_string(), context)
        .map_err(|e| {
            if render::is_undefined_error(&e) {
                Error::UndefinedVariableError {
                    message: format!(
                        "Unable to render hook script '{}': {}",
                        script_path.display(),
                        e
                    ),
                }
            } else {
                Error::MinijinjaError(e)
            }
        })?;

    let scratch = tempfile::tempdir()?;
    let file_name = match script_path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("hook.{}", ext),
        None => "hook".to_string(),
    };
    let hook_copy = scratch.path().join(file_name);
    std::fs::write(&hook_copy, rendered)?;
    std::fs::set_permissions(&hook_copy, std::fs::metadata(script_path)?.permissions())?;

    // scratch is dropped (and deleted) whether or not the script succeeds
    run_script(&hook_copy, cwd)
}

/// Finds and executes the named hook; a missing hook is a silent no-op.
pub fn run_hook(
    template_dir: &Path,
    hook_name: &str,
    project_dir: &Path,
    context: &Value,
    env: &RenderEnvironment,
) -> Result<()> {
    let Some(script) = find_hook(template_dir, hook_name) else {
        debug!("No {} hook found", hook_name);
        return Ok(());
    };
    debug!("Running hook {}", script.display());
    run_script_with_context(&script, project_dir, context, env)
}

/// Runs the pre-prompt hook, if present, against a scratch copy of the
/// template.
///
/// The template is copied into a fresh temporary directory and the hook runs
/// unrendered with that copy as working directory, so it may rewrite the
/// template in place before any context exists. On success the copy becomes
/// the template root for the rest of the pipeline; on failure it is deleted
/// and the error propagates.
pub fn run_pre_prompt_hook(repo_dir: &Path) -> Result<PathBuf> {
    let Some(script) = find_hook(repo_dir, PRE_PROMPT_HOOK) else {
        return Ok(repo_dir.to_path_buf());
    };

    debug!("Running hook {}", script.display());
    let scratch = tempfile::tempdir()?;
    copy_dir_contents(repo_dir, scratch.path())?;
    run_script(&script, scratch.path())?;
    Ok(scratch.keep())
}

fn copy_dir_contents(src: &Path, dest: &Path) -> Result<()> {
    for entry in walkdir::WalkDir::new(src) {
        let entry = entry.map_err(|e| Error::IoError(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
