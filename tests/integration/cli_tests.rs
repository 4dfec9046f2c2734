use super::common::*;
use anyhow::Result;
use serde_json::json;

#[test]
fn test_cli_help() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = env.run(&["--help"])?;

    assert_success(&output);
    let stdout = output_to_string(&output);
    assert_contains(&stdout, "settings-picker");
    assert_contains(&stdout, "settings");
    assert_contains(&stdout, "models");
    assert_contains(&stdout, "pick");

    Ok(())
}

#[test]
fn test_show_does_not_create_record() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = env.run(&["settings", "show"])?;

    assert_success(&output);
    let stdout = output_to_string(&output);
    assert_contains(&stdout, "opacity = 0.8");
    assert_contains(&stdout, "customModels = []");
    assert!(!exists(&env.record_path()));

    Ok(())
}

#[test]
fn test_set_and_get() -> Result<()> {
    let env = TestEnvironment::new()?;

    assert_success(&env.run(&["settings", "set", "apiBaseURL", "https://example.test/v1"])?);
    assert_success(&env.run(&["settings", "set", "custom_models", "a, b"])?);

    let output = env.run(&["settings", "get", "apiBaseURL"])?;
    assert_success(&output);
    assert_eq!(output_to_string(&output).trim(), "https://example.test/v1");

    let record = env.record()?;
    assert_eq!(record["version"], json!(4));
    assert_eq!(record["state"]["customModels"], json!(["a", "b"]));

    Ok(())
}

#[test]
fn test_set_rejects_wrong_type() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = env.run(&["settings", "set", "opacity", "half"])?;
    assert!(!output.status.success());
    assert_contains(&stderr_to_string(&output), "Invalid value for opacity");

    let output = env.run(&["settings", "get", "theme"])?;
    assert!(!output.status.success());
    assert_contains(&stderr_to_string(&output), "Unknown setting key");

    Ok(())
}

#[test]
fn test_set_rejects_non_finite_opacity() -> Result<()> {
    let env = TestEnvironment::new()?;

    for raw in ["NaN", "inf"] {
        let output = env.run(&["settings", "set", "opacity", raw])?;
        assert!(!output.status.success());
        assert_contains(&stderr_to_string(&output), "not a finite number");
    }
    assert!(!exists(&env.record_path()));

    Ok(())
}

#[test]
fn test_custom_models_stay_unique_through_set_and_import() -> Result<()> {
    let env = TestEnvironment::new()?;

    assert_success(&env.run(&["settings", "set", "customModels", "x,x,,y"])?);
    assert_eq!(env.record()?["state"]["customModels"], json!(["x", "y"]));

    let file = env.write_file("dupes.json", r#"{ "customModels": ["a", "a", ""] }"#)?;
    assert_success(&env.run(&["settings", "import", file.to_str().unwrap()])?);
    assert_eq!(env.record()?["state"]["customModels"], json!(["a"]));

    let output = env.run(&["models", "remove", "a"])?;
    assert_contains(&output_to_string(&output), "Removed custom model: a");
    assert_eq!(env.record()?["state"]["customModels"], json!([]));

    Ok(())
}

#[test]
fn test_show_masks_api_key() -> Result<()> {
    let env = TestEnvironment::new()?;
    assert_success(&env.run(&["settings", "set", "apiKey", "sk-very-secret"])?);

    let shown = output_to_string(&env.run(&["settings", "show"])?);
    assert!(!shown.contains("sk-very-secret"));
    assert_contains(&shown, "********");

    let raw = output_to_string(&env.run(&["settings", "show", "--json"])?);
    assert_contains(&raw, "sk-very-secret");

    Ok(())
}

#[test]
fn test_import_merges_json_and_toml() -> Result<()> {
    let env = TestEnvironment::new()?;
    assert_success(&env.run(&["settings", "set", "codeLanguage", "rust"])?);

    let json_file = env.write_file("import.json", r#"{ "apiKey": "from-json", "opacity": 0.3 }"#)?;
    let output = env.run(&["settings", "import", json_file.to_str().unwrap()])?;
    assert_success(&output);
    assert_contains(&output_to_string(&output), "Imported 2 setting(s)");

    let toml_file = env.write_file("import.toml", "model = \"gpt-5-mini\"\n")?;
    assert_success(&env.run(&["settings", "import", toml_file.to_str().unwrap()])?);

    let state = &env.record()?["state"];
    assert_eq!(state["apiKey"], json!("from-json"));
    assert_eq!(state["opacity"], json!(0.3));
    assert_eq!(state["model"], json!("gpt-5-mini"));
    assert_eq!(state["codeLanguage"], json!("rust"));

    Ok(())
}

#[test]
fn test_models_add_dedupes() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = env.run(&["models", "add", "my-model"])?;
    assert_success(&output);
    assert_contains(&output_to_string(&output), "Added custom model: my-model");

    let output = env.run(&["models", "add", " my-model "])?;
    assert_success(&output);
    assert_contains(&output_to_string(&output), "Selected model: my-model");

    let output = env.run(&["models", "add", "gpt-5.2"])?;
    assert_contains(&output_to_string(&output), "Selected model: gpt-5.2");

    let state = &env.record()?["state"];
    assert_eq!(state["customModels"], json!(["my-model"]));
    assert_eq!(state["model"], json!("gpt-5.2"));

    let output = env.run(&["models", "add", "   "])?;
    assert!(!output.status.success());

    Ok(())
}

#[test]
fn test_models_list_marks_and_filters() -> Result<()> {
    let env = TestEnvironment::new()?;
    assert_success(&env.run(&["models", "add", "local-llm"])?);

    let listing = output_to_string(&env.run(&["models", "list"])?);
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines[0], "✓ local-llm (custom)");
    assert!(lines.iter().any(|l| l.trim() == "gpt-5.2"));

    let listing = output_to_string(&env.run(&["models", "list", "--search", "GPT-5"])?);
    assert!(!listing.contains("local-llm"));
    assert_contains(&listing, "+ Create \"GPT-5\"");

    let listing = output_to_string(&env.run(&["models", "list", "--search", "gpt-5.2"])?);
    assert!(!listing.contains("Create"));

    Ok(())
}

#[test]
fn test_models_select_toggles() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = env.run(&["models", "select", "gpt-5.2"])?;
    assert_contains(&output_to_string(&output), "Selected model: gpt-5.2");

    let output = env.run(&["models", "select", "gpt-5.2"])?;
    assert_contains(&output_to_string(&output), "Model selection cleared");
    assert_eq!(env.record()?["state"]["model"], json!(""));

    Ok(())
}

#[test]
fn test_models_select_unknown_model() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = env.run(&["models", "select", "typo-model"])?;
    assert_success(&output);
    let stdout = output_to_string(&output);
    assert_contains(&stdout, "No model named typo-model");
    assert_contains(&stdout, "settings-picker models add \"typo-model\"");
    assert!(!exists(&env.record_path()));

    Ok(())
}

#[test]
fn test_models_remove() -> Result<()> {
    let env = TestEnvironment::new()?;
    assert_success(&env.run(&["models", "add", "a"])?);
    assert_success(&env.run(&["models", "add", "b"])?);

    // "b" is selected; removing "a" leaves the selection alone
    let output = env.run(&["models", "remove", "a"])?;
    assert!(!output_to_string(&output).contains("cleared"));
    assert_eq!(env.record()?["state"]["model"], json!("b"));

    let output = env.run(&["models", "remove", "b"])?;
    assert_contains(&output_to_string(&output), "Model selection cleared");

    let output = env.run(&["models", "remove", "gpt-5.2"])?;
    assert_success(&output);
    assert_contains(&output_to_string(&output), "No custom model named gpt-5.2");

    let state = &env.record()?["state"];
    assert_eq!(state["customModels"], json!([]));
    assert_eq!(state["model"], json!(""));

    Ok(())
}

#[test]
fn test_reset_and_path() -> Result<()> {
    let env = TestEnvironment::new()?;
    assert_success(&env.run(&["models", "add", "temp"])?);
    assert_success(&env.run(&["settings", "reset"])?);

    let state = &env.record()?["state"];
    assert_eq!(state["customModels"], json!([]));
    assert_eq!(state["model"], json!(""));

    let output = env.run(&["settings", "path"])?;
    assert_contains(&output_to_string(&output), "interview-coder-settings.json");

    Ok(())
}
