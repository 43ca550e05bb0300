//! Tests for command-line parsing.

use super::{Command, get_command};

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn no_arguments_prints_help() {
    assert_eq!(get_command(&args(&[])).unwrap(), Command::Help);
}

#[test]
fn help_command_is_recognized() {
    assert_eq!(get_command(&args(&["help"])).unwrap(), Command::Help);
}

#[test]
fn compile_command_without_out_leaves_it_unset() {
    let command = get_command(&args(&["--compile", "main.juno"])).unwrap();
    assert_eq!(
        command,
        Command::Compile {
            source: String::from("main.juno"),
            out: None,
        }
    );
}

#[test]
fn compile_command_parses_out_stem() {
    let command = get_command(&args(&["--compile", "main.juno", "--out", "app"])).unwrap();
    assert_eq!(
        command,
        Command::Compile {
            source: String::from("main.juno"),
            out: Some(String::from("app")),
        }
    );
}

#[test]
fn compile_command_requires_a_source_file() {
    let error = get_command(&args(&["--compile"])).unwrap_err();
    assert!(error.contains("Missing source file"));
}

#[test]
fn run_command_parses_source_path() {
    let command = get_command(&args(&["--run", "main.juno"])).unwrap();
    assert_eq!(
        command,
        Command::Run {
            source: String::from("main.juno"),
        }
    );
}

#[test]
fn unrecognized_command_is_an_error() {
    let error = get_command(&args(&["--wat"])).unwrap_err();
    assert!(error.contains("Invalid command"));
}
