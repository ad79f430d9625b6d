//! Cookiecutter materializes project directories from parameterized
//! templates: it resolves a template source, collects variable values and
//! renders the template's files and directory names against them, running
//! optional lifecycle scripts before and after generation.

/// Command-line interface module for the cookiecutter application
pub mod cli;

/// User configuration handling
/// Controls the clone cache, replay directory, default context values and
/// template source abbreviations
pub mod config;

/// Context assembly: variable-definition file parsing and the recursive
/// default/override merge
pub mod context;

/// Error types and handling for the cookiecutter application
pub mod error;

/// Template locator
/// Finds the directory holding the variable-definition file
pub mod find;

/// Core file generation engine
/// Walks the template tree and writes the rendered output tree
pub mod generate;

/// Lifecycle hook processing
/// Handles discovery and execution of scripts in:
/// - hooks/pre_prompt
/// - hooks/pre_gen_project
/// - hooks/post_gen_project
pub mod hooks;

/// User input and interaction handling
pub mod prompt;

/// Render environment factory shared by every render in a run
pub mod render;

/// Replay store for re-running a template without prompting
pub mod replay;

/// Template source acquisition (local paths, git repositories)
pub mod repository;
