use clap::Parser;
use cookiecutter::cli::{parse_extra_context, AcceptHooks, Args};
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("cookiecutter")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let args = make_args(&["./template"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.template.as_deref(), Some("./template"));
    assert!(parsed.extra_context.is_empty());
    assert_eq!(parsed.output_dir, PathBuf::from("."));
    assert!(!parsed.no_input);
    assert!(!parsed.overwrite_if_exists);
    assert_eq!(parsed.accept_hooks, AcceptHooks::Yes);
}

#[test]
fn test_extra_context_args() {
    let args = make_args(&["./template", "project_name=Demo", "license=MIT"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.extra_context, ["project_name=Demo", "license=MIT"]);
    let pairs = parse_extra_context(&parsed.extra_context).unwrap();
    assert_eq!(
        pairs,
        [
            ("project_name".to_string(), "Demo".to_string()),
            ("license".to_string(), "MIT".to_string()),
        ]
    );
}

#[test]
fn test_extra_context_requires_key_value_form() {
    let items = vec!["not-a-pair".to_string()];
    assert_eq!(parse_extra_context(&items), Err("not-a-pair".to_string()));
}

#[test]
fn test_all_flags() {
    let args = make_args(&[
        "--no-input",
        "--verbose",
        "--overwrite-if-exists",
        "--skip-if-file-exists",
        "--keep-project-on-failure",
        "--checkout",
        "v1.0",
        "--directory",
        "templates/api",
        "--output-dir",
        "out",
        "--accept-hooks",
        "no",
        "./template",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.no_input);
    assert!(parsed.verbose);
    assert!(parsed.overwrite_if_exists);
    assert!(parsed.skip_if_file_exists);
    assert!(parsed.keep_project_on_failure);
    assert_eq!(parsed.checkout.as_deref(), Some("v1.0"));
    assert_eq!(parsed.directory.as_deref(), Some("templates/api"));
    assert_eq!(parsed.output_dir, PathBuf::from("out"));
    assert_eq!(parsed.accept_hooks, AcceptHooks::No);
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-f", "-v", "-s", "-o", "out", "./template"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.overwrite_if_exists);
    assert!(parsed.verbose);
    assert!(parsed.skip_if_file_exists);
    assert_eq!(parsed.output_dir, PathBuf::from("out"));
}

#[test]
fn test_git_url_template() {
    let args = make_args(&["https://github.com/user/template.git"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(
        parsed.template.as_deref(),
        Some("https://github.com/user/template.git")
    );
}

#[test]
fn test_replay_conflicts_with_no_input() {
    let args = make_args(&["--replay", "--no-input", "./template"]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_replay_file_flag() {
    let args = make_args(&["--replay-file", "ctx.json", "./template"]);
    let parsed = Args::try_parse_from(args).unwrap();
    assert_eq!(parsed.replay_file, Some(PathBuf::from("ctx.json")));
}

#[test]
fn test_template_is_optional_for_list_installed() {
    let args = make_args(&["--list-installed"]);
    let parsed = Args::try_parse_from(args).unwrap();
    assert!(parsed.list_installed);
    assert!(parsed.template.is_none());
}
