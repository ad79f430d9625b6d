//! Command-line interface implementation for cookiecutter.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

/// Policy for running template lifecycle hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AcceptHooks {
    /// Run hooks without asking
    Yes,
    /// Ask before running hooks
    Ask,
    /// Never run hooks
    No,
}

/// Command-line arguments structure for cookiecutter.
#[derive(Parser, Debug)]
#[command(author, version, about = "Create a project from a project template", long_about = None)]
pub struct Args {
    /// Path to the template directory, git repository URL or abbreviation
    #[arg(value_name = "TEMPLATE")]
    pub template: Option<String>,

    /// Context overrides of the form key=value, applied on top of the
    /// template's defaults
    #[arg(value_name = "EXTRA_CONTEXT")]
    pub extra_context: Vec<String>,

    /// Do not prompt for parameters and only use the variable-definition
    /// file's content. Deletes any cached template copy before cloning.
    #[arg(long, conflicts_with = "replay")]
    pub no_input: bool,

    /// Branch, tag or commit to check out after git clone
    #[arg(short, long)]
    pub checkout: Option<String>,

    /// Directory within the repository that holds the variable-definition
    /// file, for repositories with multiple templates
    #[arg(long)]
    pub directory: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not prompt for parameters and only use information entered
    /// previously
    #[arg(long)]
    pub replay: bool,

    /// Use this file for replay instead of the default
    #[arg(long, value_name = "FILE")]
    pub replay_file: Option<PathBuf>,

    /// Overwrite the contents of the output directory if it already exists
    #[arg(short = 'f', long)]
    pub overwrite_if_exists: bool,

    /// Skip files in the output directory if they already exist
    #[arg(short, long)]
    pub skip_if_file_exists: bool,

    /// Where to output the generated project dir into
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// User configuration file
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Do not load a config file, use the defaults instead
    #[arg(long)]
    pub default_config: bool,

    /// Whether to run pre/post generation hooks
    #[arg(long, value_enum, default_value_t = AcceptHooks::Yes)]
    pub accept_hooks: AcceptHooks,

    /// Do not delete the project directory on failure
    #[arg(long)]
    pub keep_project_on_failure: bool,

    /// List currently installed templates and exit
    #[arg(short, long)]
    pub list_installed: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help()
                    .unwrap();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}

/// Splits `key=value` override arguments into pairs, preserving order.
///
/// # Errors
/// Returns the offending argument when it contains no `=`.
pub fn parse_extra_context(
    extra_context: &[String],
) -> std::result::Result<Vec<(String, String)>, String> {
    extra_context
        .iter()
        .map(|item| {
            item.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| item.clone())
        })
        .collect()
}
