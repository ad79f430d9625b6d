use cookiecutter::context::CONTEXT_KEY;
use cookiecutter::error::{Error, Result};
use cookiecutter::prompt::{
    choose_nested_template, parse_yes_no, prompt_for_config, Prompter,
};
use serde_json::{json, Map, Value};

/// Prompter that must never be reached; proves no-input mode does not block.
struct UnreachablePrompter;

impl Prompter for UnreachablePrompter {
    fn read_text(&self, _prompt: &str, _default: &str) -> Result<String> {
        panic!("prompted in no-input mode")
    }

    fn read_yes_no(&self, _prompt: &str, _default: bool) -> Result<bool> {
        panic!("prompted in no-input mode")
    }

    fn read_choice(&self, _prompt: &str, _options: &[String]) -> Result<usize> {
        panic!("prompted in no-input mode")
    }

    fn read_structured(
        &self,
        _prompt: &str,
        _default: &Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        panic!("prompted in no-input mode")
    }
}

/// Prompter answering every ask with a fixed response.
struct ScriptedPrompter {
    text: String,
    yes_no: bool,
    choice: usize,
}

impl Prompter for ScriptedPrompter {
    fn read_text(&self, _prompt: &str, _default: &str) -> Result<String> {
        Ok(self.text.clone())
    }

    fn read_yes_no(&self, _prompt: &str, _default: bool) -> Result<bool> {
        Ok(self.yes_no)
    }

    fn read_choice(&self, _prompt: &str, options: &[String]) -> Result<usize> {
        assert!(self.choice < options.len());
        Ok(self.choice)
    }

    fn read_structured(
        &self,
        _prompt: &str,
        default: &Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        Ok(default.clone())
    }
}

#[test]
fn test_yes_no_token_vocabulary() {
    for token in ["1", "true", "t", "yes", "y", "on", "TRUE", "Yes", "ON"] {
        assert_eq!(parse_yes_no(token), Some(true), "token {:?}", token);
    }
    for token in ["0", "false", "f", "no", "n", "off", "FALSE", "No", "OFF"] {
        assert_eq!(parse_yes_no(token), Some(false), "token {:?}", token);
    }
    for token in ["", "maybe", "2", "yess", "nope"] {
        assert_eq!(parse_yes_no(token), None, "token {:?}", token);
    }
}

#[test]
fn test_no_input_resolves_computed_defaults() {
    let mut context = json!({
        CONTEXT_KEY: {
            "project_name": "Peanut Butter",
            "repo_name": "{{cookiecutter.project_name.lower()}}",
            "license": ["MIT", "BSD-3-Clause"],
            "use_docker": false,
            "metadata": {"tags": ["cli"]},
        }
    });

    prompt_for_config(&mut context, true, &UnreachablePrompter).unwrap();

    let fields = context[CONTEXT_KEY].as_object().unwrap();
    assert_eq!(fields["repo_name"], json!("peanut butter"));
    assert_eq!(fields["license"], json!("MIT"));
    assert_eq!(fields["use_docker"], json!(false));
    assert_eq!(fields["metadata"], json!({"tags": ["cli"]}));
}

#[test]
fn test_no_input_is_deterministic() {
    let source = json!({
        CONTEXT_KEY: {
            "project_name": "Demo",
            "slug": "{{ cookiecutter.project_name|slugify }}",
            "flavor": ["vanilla", "chocolate"],
        }
    });

    let mut first = source.clone();
    let mut second = source.clone();
    prompt_for_config(&mut first, true, &UnreachablePrompter).unwrap();
    prompt_for_config(&mut second, true, &UnreachablePrompter).unwrap();

    assert_eq!(first, second);
    assert_eq!(first[CONTEXT_KEY]["slug"], json!("demo"));
}

#[test]
fn test_private_keys_are_carried_through_unprompted() {
    let mut context = json!({
        CONTEXT_KEY: {
            "_copy_without_render": ["*.png"],
            "_note": "{{ left.alone }}",
            "name": "demo",
        }
    });

    prompt_for_config(&mut context, true, &UnreachablePrompter).unwrap();

    let fields = context[CONTEXT_KEY].as_object().unwrap();
    assert_eq!(fields["_copy_without_render"], json!(["*.png"]));
    // private values are never rendered
    assert_eq!(fields["_note"], json!("{{ left.alone }}"));
}

#[test]
fn test_undefined_default_names_the_offending_key() {
    let mut context = json!({
        CONTEXT_KEY: {
            "bad": "{{ cookiecutter.not_yet_defined }}",
        }
    });

    match prompt_for_config(&mut context, true, &UnreachablePrompter) {
        Err(Error::UndefinedVariableError { message }) => {
            assert!(message.contains("'bad'"), "message: {}", message);
        }
        other => panic!("expected UndefinedVariableError, got {:?}", other),
    }
}

#[test]
fn test_interactive_dispatch_per_value_shape() {
    let mut context = json!({
        CONTEXT_KEY: {
            "name": "default-name",
            "license": ["MIT", "BSD-3-Clause"],
            "use_docker": false,
        }
    });
    let prompter = ScriptedPrompter {
        text: "typed-name".to_string(),
        yes_no: true,
        choice: 1,
    };

    prompt_for_config(&mut context, false, &prompter).unwrap();

    let fields = context[CONTEXT_KEY].as_object().unwrap();
    assert_eq!(fields["name"], json!("typed-name"));
    assert_eq!(fields["license"], json!("BSD-3-Clause"));
    assert_eq!(fields["use_docker"], json!(true));
}

#[test]
fn test_choice_options_are_rendered_before_selection() {
    let mut context = json!({
        CONTEXT_KEY: {
            "project_name": "Demo",
            "greeting": ["hello {{ cookiecutter.project_name }}", "bye"],
        }
    });

    prompt_for_config(&mut context, true, &UnreachablePrompter).unwrap();

    assert_eq!(context[CONTEXT_KEY]["greeting"], json!("hello Demo"));
}

#[test]
fn test_nested_template_choice_no_input_picks_first() {
    let mut context = json!({
        CONTEXT_KEY: {
            "_template": {
                "python": "templates/python",
                "rust": "templates/rust",
            }
        }
    });

    let chosen = choose_nested_template(&mut context, true, &UnreachablePrompter).unwrap();

    assert_eq!(chosen.as_deref(), Some("templates/python"));
    assert_eq!(context[CONTEXT_KEY]["_template"], json!("templates/python"));
}

#[test]
fn test_nested_template_interactive_selection() {
    let mut context = json!({
        CONTEXT_KEY: {
            "_template": {
                "python": "templates/python",
                "rust": "templates/rust",
            }
        }
    });
    let prompter = ScriptedPrompter {
        text: String::new(),
        yes_no: true,
        choice: 1,
    };

    let chosen = choose_nested_template(&mut context, false, &prompter).unwrap();

    assert_eq!(chosen.as_deref(), Some("templates/rust"));
}

#[test]
fn test_plain_template_value_passes_through() {
    let mut context = json!({
        CONTEXT_KEY: {
            "_template": "{{ cookiecutter.project_name }}",
        }
    });

    let chosen = choose_nested_template(&mut context, true, &UnreachablePrompter).unwrap();

    assert_eq!(chosen, None);
    assert_eq!(
        context[CONTEXT_KEY]["_template"],
        json!("{{ cookiecutter.project_name }}")
    );
}
