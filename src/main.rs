//! Cookiecutter's main application entry point and orchestration logic.
//! Handles command-line argument parsing, the template materialization flow,
//! and coordinates interactions between the modules.

use serde_json::{Map, Value};

use cookiecutter::{
    cli::{get_args, parse_extra_context, AcceptHooks, Args},
    config::{get_user_config, UserConfig},
    context::{self, CONTEXT_FILE, OUTPUT_DIR_KEY},
    error::{default_error_handler, Error, Result},
    find,
    generate::generate_files,
    hooks,
    prompt::{self, DialoguerPrompter},
    render::RenderEnvironment,
    replay, repository,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Lists locally cached templates.
fn list_installed_templates(user_config: &UserConfig) -> Result<()> {
    let template_dir = &user_config.cookiecutters_dir;
    if !template_dir.is_dir() {
        return Err(Error::ConfigError(format!(
            "cannot list installed templates, {} does not exist",
            template_dir.display()
        )));
    }

    println!("Installed templates:");
    for entry in std::fs::read_dir(template_dir)?.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if entry.path().is_dir() && !name.starts_with('.') {
            println!("  {}", name);
        }
    }
    Ok(())
}

fn to_json_map(pairs: Vec<(String, String)>) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads the user configuration
/// 2. Acquires the template source (local path or repository clone)
/// 3. Runs the pre-prompt hook, which may swap the template root
/// 4. Locates the template directory
/// 5. Assembles the context (or restores it from a replay file)
/// 6. Resolves chained nested-template selections
/// 7. Prompts for unresolved variables and records the replay file
/// 8. Generates the project with pre/post generation hooks
fn run(args: Args) -> Result<()> {
    let user_config = get_user_config(args.config_file.as_deref(), args.default_config)?;

    if args.list_installed {
        return list_installed_templates(&user_config);
    }

    let Some(template) = args.template.clone() else {
        return Err(Error::ConfigError("missing argument TEMPLATE".to_string()));
    };

    if args.replay && !args.extra_context.is_empty() {
        return Err(Error::ConfigError(
            "--replay and extra context cannot be used together".to_string(),
        ));
    }

    let extra_context = parse_extra_context(&args.extra_context).map_err(|item| {
        Error::ConfigError(format!(
            "EXTRA_CONTEXT should contain items of the form key=value; '{}' doesn't",
            item
        ))
    })?;

    let prompter = DialoguerPrompter::new();

    let repo_dir = repository::determine_repo_dir(
        &template,
        &user_config,
        args.checkout.as_deref(),
        args.no_input,
        args.directory.as_deref(),
        &prompter,
    )?;

    let accept_hooks = match args.accept_hooks {
        AcceptHooks::Yes => true,
        AcceptHooks::No => false,
        AcceptHooks::Ask => hooks::confirm_hook_execution(&prompter, &repo_dir)?,
    };

    // The pre-prompt hook may rewrite the template in a scratch copy
    let repo_dir = if accept_hooks {
        hooks::run_pre_prompt_hook(&repo_dir)?
    } else {
        repo_dir
    };

    let locator_env = RenderEnvironment::new(&serde_json::json!({}), None)?;
    let mut template_dir = find::find_template(&repo_dir, &locator_env)?;

    let context = if args.replay || args.replay_file.is_some() {
        match &args.replay_file {
            Some(file) => replay::load_file(file)?,
            None => replay::load(&user_config.replay_dir, &template)?,
        }
    } else {
        let default_context: Map<String, Value> = user_config
            .default_context
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let extra_context = to_json_map(extra_context);

        let mut context;
        loop {
            context = context::generate_context(
                &template_dir.join(CONTEXT_FILE),
                (!default_context.is_empty()).then_some(&default_context),
                (!extra_context.is_empty()).then_some(&extra_context),
            )?;

            // Chained nested-template selection: re-locate until the
            // reserved value is no longer a mapping
            match prompt::choose_nested_template(&mut context, args.no_input, &prompter)? {
                Some(path) => {
                    template_dir = find::find_template(&repo_dir.join(path), &locator_env)?;
                }
                None => break,
            }
        }

        prompt::prompt_for_config(&mut context, args.no_input, &prompter)?;

        let output_dir = std::fs::canonicalize(&args.output_dir)
            .unwrap_or_else(|_| args.output_dir.clone());
        if let Some(fields) = context::variables_mut(&mut context) {
            fields.insert(
                OUTPUT_DIR_KEY.to_string(),
                Value::String(output_dir.display().to_string()),
            );
        }

        replay::dump(&user_config.replay_dir, &template, &context)?;
        context
    };

    let project_dir = generate_files(
        &template_dir,
        &context,
        &args.output_dir,
        args.overwrite_if_exists,
        args.skip_if_file_exists,
        accept_hooks,
        args.keep_project_on_failure,
    )?;

    println!(
        "Project generated successfully in {}.",
        project_dir.display()
    );
    Ok(())
}
