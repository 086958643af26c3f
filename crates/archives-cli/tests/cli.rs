//! Runs the `archives` binary against small projects.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const COMPLETE: &str = r#""""
@desc a complete module
@author someone
"""


def add(a: int, b: int) -> int:
    """
    @desc add two numbers
    @cc 1
    @arg a: left
    @arg b: right
    @ret the sum
    """
    return a + b
"#;

const INCOMPLETE: &str = "def f(x): pass\n";

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn archives(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_archives"))
        .current_dir(dir)
        .env("ARCHIVES_CONFIG_DIR", dir.join("no-global-config"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn complete_archives_exit_zero() {
    let dir = project(&[("pkg/math.py", COMPLETE)]);
    let output = archives(dir.path(), &["check", "."]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("Incredible! It appears that your archives are complete!"));
    assert!(stdout(&output).contains("0 issues found"));
}

#[test]
fn issues_exit_one_in_flake8_format() {
    let dir = project(&[("bad.py", INCOMPLETE)]);
    let output = archives(dir.path(), &["check", "bad.py"]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("bad.py:1:0: F100 function 'f' missing docstring"), "{out}");
    assert!(out.contains("A100 function 'f' missing @arg for 'x'"), "{out}");
    assert!(stderr(&output).contains("Impossible! Perhaps your archives are incomplete?"));
}

#[test]
fn disable_and_pylint_format() {
    let dir = project(&[("bad.py", INCOMPLETE)]);
    let output = archives(
        dir.path(),
        &["check", "--format", "pylint", "--disable", "M100,M101,M102,F106", "-q", "bad.py"],
    );
    let out = stdout(&output);
    assert!(out.contains("bad.py:1: [F100]"), "{out}");
    assert!(!out.contains("F106"));
    assert!(!out.contains("M100"));
    assert!(!stderr(&output).contains("Impossible"));
}

#[test]
fn json_output_is_a_single_document() {
    let dir = project(&[("bad.py", INCOMPLETE)]);
    let output = archives(dir.path(), &["check", "--format", "json", "bad.py"]);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(!json["issues"].as_array().unwrap().is_empty());
    assert_eq!(json["stats"]["functions"], 1);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn config_file_is_honored() {
    let dir = project(&[
        ("bad.py", INCOMPLETE),
        ("archives.toml", "disable = [\"F100\", \"M100\"]\n[output]\nformat = \"pylint\"\n"),
    ]);
    let output = archives(dir.path(), &["check", "bad.py"]);
    let out = stdout(&output);
    assert!(out.contains("bad.py:1: [F101]"), "{out}");
    assert!(!out.contains("[F100]"));
}

#[test]
fn parse_failures() {
    let dir = project(&[("ok.py", COMPLETE), ("broken.py", "def f(:\n")]);

    let reported = archives(dir.path(), &["check", "."]);
    assert_eq!(reported.status.code(), Some(1));
    assert!(stderr(&reported).contains("broken.py"));
    assert!(stderr(&reported).contains("1 file failed to parse"));

    let ignored = archives(dir.path(), &["check", "--ignore-exceptions", "."]);
    assert_eq!(ignored.status.code(), Some(0), "{}", stderr(&ignored));
}

#[test]
fn usage_errors_exit_two() {
    let dir = project(&[("ok.py", COMPLETE)]);
    assert_eq!(archives(dir.path(), &["check"]).status.code(), Some(2));
    assert_eq!(
        archives(dir.path(), &["check", "--exclude", "(", "."]).status.code(),
        Some(2)
    );
}

#[test]
fn no_python_files() {
    let dir = project(&[("README.md", "# readme\n")]);
    let output = archives(dir.path(), &["check", "."]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("no python files are detected"));
}

#[test]
fn doc_prints_records() {
    let dir = project(&[("pkg/math.py", COMPLETE)]);
    let output = archives(dir.path(), &["doc", "."]);
    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["math.py"]["author"], "someone");
    assert_eq!(json["math.py"]["functions"][0]["doc"]["cc"], 1);
}

#[test]
fn listings() {
    let dir = project(&[]);
    let rules = archives(dir.path(), &["list-rules"]);
    assert_eq!(rules.status.code(), Some(0));
    assert!(stdout(&rules).contains("F103"));

    let tags = archives(dir.path(), &["list-tags"]);
    assert!(stdout(&tags).contains("@nodoc"));
}

#[test]
fn init_writes_config_once() {
    let dir = project(&[]);
    assert_eq!(archives(dir.path(), &["init"]).status.code(), Some(0));
    assert!(dir.path().join("archives.toml").is_file());
    assert_eq!(archives(dir.path(), &["init"]).status.code(), Some(2));
    assert_eq!(archives(dir.path(), &["init", "--force"]).status.code(), Some(0));
}
