//! Runs the built binary against temporary token projects.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn create_file(dir: &Path, relative_path: &str, content: &str) {
    let full_path = dir.join(relative_path);
    if let Some(parent) = full_path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut file = std::fs::File::create(&full_path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

fn tokenloom(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tokenloom"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("binary runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// version / init
// =============================================================================

#[test]
fn test_version() {
    let temp = TempDir::new().unwrap();
    let output = tokenloom(temp.path(), &["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("tokenloom {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_init_scaffolds_a_valid_project() {
    let temp = TempDir::new().unwrap();
    let output = tokenloom(temp.path(), &["init"]);
    assert!(output.status.success(), "{}", stderr(&output));
    for file in [
        "tokenloom.yaml",
        "tokens/color.tokens.json",
        "tokens/spacing.tokens.json",
        "tokens/components/button.tokens.json",
        "tokens/themes/dark.json",
    ] {
        assert!(temp.path().join(file).is_file(), "{} missing", file);
    }

    let output = tokenloom(temp.path(), &["validate"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let output = tokenloom(temp.path(), &["build"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let css = stdout(&output);
    assert!(css.starts_with("@layer reset, tokens, themes, components;"));
    assert!(css.contains("--spacing-2: 0.5rem;"));
    assert!(css.contains("[data-theme=\"dark\"] {"));
    assert!(css.contains(".btn-sm {"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "tokenloom.yaml", "default_theme: dark\n");
    let output = tokenloom(temp.path(), &["init"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("refusing to overwrite"));
    assert_eq!(
        std::fs::read_to_string(temp.path().join("tokenloom.yaml")).unwrap(),
        "default_theme: dark\n"
    );
}

// =============================================================================
// validate
// =============================================================================

#[test]
fn test_validate_reports_every_error() {
    let temp = TempDir::new().unwrap();
    create_file(
        temp.path(),
        "tokens/base.json",
        r##"{
            "a": {"$value": "{b}"},
            "b": {"$value": "{a}"},
            "c": {"$value": "{missing}"}
        }"##,
    );
    let output = tokenloom(temp.path(), &["validate"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("error[cycle]"), "{}", err);
    assert!(err.contains("error[reference] c"), "{}", err);
    assert!(err.contains("2 error(s)"), "{}", err);
}

#[test]
fn test_validate_parse_error() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "tokens/broken.json", "{ not json");
    let output = tokenloom(temp.path(), &["validate"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[parse]"));
}

#[test]
fn test_validate_explicit_directory() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "design/color.json", r##"{"color": {"bg": {"$value": "#fff"}}}"##);
    let output = tokenloom(temp.path(), &["validate", "design"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("1 tokens, 0 themes: ok"));
}

// =============================================================================
// build
// =============================================================================

fn write_project(dir: &Path) {
    create_file(
        dir,
        "tokens/color.tokens.json",
        r##"{"color": {"$type": "color", "bg": {"$value": "#fff"}, "brand": {"$value": "#3b82f6", "$description": "Brand"}}}"##,
    );
    create_file(
        dir,
        "tokens/themes/dark.json",
        r##"{"color": {"bg": {"$value": "#000"}}}"##,
    );
}

#[test]
fn test_build_writes_css_to_output_dir() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());
    let output = tokenloom(temp.path(), &["build", "--output", "dist"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let css = std::fs::read_to_string(temp.path().join("dist/tokens.css")).unwrap();
    assert!(css.contains("--color-bg: #fff;"));
    assert!(css.contains("[data-theme=\"dark\"] {\n    --color-bg: #000;\n  }"));
}

#[test]
fn test_build_catalog() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());
    let output = tokenloom(temp.path(), &["build", "--format", "catalog", "--rich"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let catalog: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(catalog["meta"]["schema_version"], "1.0");
    assert_eq!(catalog["tokens"]["color.brand"]["description"], "Brand");
    assert_eq!(catalog["themes"]["dark"]["diff"]["color.bg"]["value"], "#000");
}

#[test]
fn test_build_fails_on_validation_errors() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "tokens/a.json", r##"{"a": {"$value": "{nope}"}}"##);
    let output = tokenloom(temp.path(), &["build", "--output", "dist"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!temp.path().join("dist/tokens.css").exists());
}

#[test]
fn test_config_file_sets_output() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());
    create_file(
        temp.path(),
        "tokenloom.yaml",
        "output:\n  dir: out\n  css_file: design.css\n",
    );
    let output = tokenloom(temp.path(), &["build"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(temp.path().join("out/design.css").is_file());
}

// =============================================================================
// search
// =============================================================================

#[test]
fn test_search() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());
    let output = tokenloom(temp.path(), &["search", "brand"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("color.brand"));
    assert!(!out.contains("color.bg"));

    let output = tokenloom(temp.path(), &["search", "/(unclosed/"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid search pattern"));
}
