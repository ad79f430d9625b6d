//! End-to-end flow over the library modules: locate, build the context,
//! resolve defaults without input and generate the project.

use cookiecutter::context::{generate_context, CONTEXT_FILE, CONTEXT_KEY};
use cookiecutter::find::find_template;
use cookiecutter::generate::generate_files;
use cookiecutter::prompt::{prompt_for_config, Prompter};
use cookiecutter::render::RenderEnvironment;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct UnreachablePrompter;

impl Prompter for UnreachablePrompter {
    fn read_text(&self, _p: &str, _d: &str) -> cookiecutter::error::Result<String> {
        panic!("unexpected prompt")
    }

    fn read_yes_no(&self, _p: &str, _d: bool) -> cookiecutter::error::Result<bool> {
        panic!("unexpected prompt")
    }

    fn read_choice(&self, _p: &str, _o: &[String]) -> cookiecutter::error::Result<usize> {
        panic!("unexpected prompt")
    }

    fn read_structured(
        &self,
        _p: &str,
        _d: &Map<String, Value>,
    ) -> cookiecutter::error::Result<Map<String, Value>> {
        panic!("unexpected prompt")
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_no_input_flow_resolves_and_generates() {
    let repo = TempDir::new().unwrap();
    write(
        &repo.path().join(CONTEXT_FILE),
        r#"{"project_name": "Peanut Butter", "repo_name": "{{cookiecutter.project_name.lower()}}"}"#,
    );
    write(
        &repo.path().join("{{cookiecutter.repo_name}}-notes.md"),
        "Notes for {{ cookiecutter.project_name }}\n",
    );
    let output = TempDir::new().unwrap();

    let locator_env = RenderEnvironment::new(&json!({}), None).unwrap();
    let template_dir = find_template(repo.path(), &locator_env).unwrap();

    let mut context = generate_context(&template_dir.join(CONTEXT_FILE), None, None).unwrap();
    prompt_for_config(&mut context, true, &UnreachablePrompter).unwrap();

    assert_eq!(context[CONTEXT_KEY]["repo_name"], json!("peanut butter"));

    let project_dir = generate_files(
        &template_dir,
        &context,
        output.path(),
        false,
        false,
        true,
        false,
    )
    .unwrap();

    assert_eq!(project_dir, output.path().join("Peanut Butter"));
    assert_eq!(
        fs::read_to_string(project_dir.join("peanut butter-notes.md")).unwrap(),
        "Notes for Peanut Butter\n"
    );
}

#[test]
fn test_overrides_reach_the_generated_output() {
    let repo = TempDir::new().unwrap();
    write(
        &repo.path().join(CONTEXT_FILE),
        r#"{"project_name": "Default Name"}"#,
    );
    write(
        &repo.path().join("about.txt"),
        "{{ cookiecutter.project_name }}\n",
    );
    let output = TempDir::new().unwrap();

    let overrides: Map<String, Value> = [(
        "project_name".to_string(),
        Value::String("Overridden".to_string()),
    )]
    .into_iter()
    .collect();

    let mut context =
        generate_context(&repo.path().join(CONTEXT_FILE), None, Some(&overrides)).unwrap();
    prompt_for_config(&mut context, true, &UnreachablePrompter).unwrap();

    let project_dir = generate_files(
        repo.path(),
        &context,
        output.path(),
        false,
        false,
        true,
        false,
    )
    .unwrap();

    assert_eq!(project_dir, output.path().join("Overridden"));
    assert_eq!(
        fs::read_to_string(project_dir.join("about.txt")).unwrap(),
        "Overridden\n"
    );
}
