//! Command-line entrypoint (§6 "Command line"): parses `--compile`/`--run`,
//! loads the project's `juno.toml`, and dispatches into the driver.
//!
//! Parsing is hand-rolled (`Command` enum + `get_command`/`get_flags` free
//! functions) the way the teacher's own `cli.rs` is, rather than reaching for
//! an argument-parsing crate the teacher never uses.

use crate::compiler_messages::print_messages;
use crate::projects::driver;
use crate::projects::settings::Config;
use saying::say;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Compile { source: String, out: Option<String> },
    Run { source: String },
    Help,
}

/// Parses `env::args()`, runs the requested command, and returns the process
/// exit status (§6: 0 on success, 1 on any compile error or toolchain
/// failure).
pub fn start_cli() -> i32 {
    let args: Vec<String> = env::args().collect();

    let command = match get_command(&args[1..]) {
        Ok(command) => command,
        Err(e) => {
            say!(Red e);
            print_help();
            return 0;
        }
    };

    match command {
        Command::Help => {
            print_help();
            0
        }
        Command::Compile { source, out } => run_compile(&source, out.as_deref()),
        Command::Run { source } => run_run(&source),
    }
}

fn run_compile(source: &str, out: Option<&str>) -> i32 {
    let entry = PathBuf::from(source);
    let project_root = project_root_of(&entry);
    let config = match Config::load(&project_root) {
        Ok(config) => config,
        Err(e) => return report_error(e.into(), &entry),
    };

    let out_stem = out
        .map(String::from)
        .or_else(|| config.out.clone())
        .unwrap_or_else(|| entry_stem(&entry));

    match driver::build(&entry, &project_root, &config, &out_stem) {
        Ok(_) => 0,
        Err(messages) => report_messages(messages, &entry),
    }
}

fn run_run(source: &str) -> i32 {
    let entry = PathBuf::from(source);
    let project_root = project_root_of(&entry);
    let config = match Config::load(&project_root) {
        Ok(config) => config,
        Err(e) => return report_error(e.into(), &entry),
    };

    match driver::run(&entry, &project_root, &config) {
        Ok(()) => 0,
        Err(messages) => report_messages(messages, &entry),
    }
}

fn project_root_of(entry: &Path) -> PathBuf {
    entry
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn entry_stem(entry: &Path) -> String {
    entry
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("out")
        .to_string()
}

fn report_messages(messages: crate::compiler_messages::CompilerMessages, entry: &Path) -> i32 {
    let source = std::fs::read_to_string(entry).unwrap_or_default();
    let mut sources: HashMap<&Path, &str> = HashMap::new();
    sources.insert(entry, &source);
    print_messages(&messages, &sources);
    1
}

fn report_error(messages: crate::compiler_messages::CompilerMessages, entry: &Path) -> i32 {
    report_messages(messages, entry)
}

fn get_command(args: &[String]) -> Result<Command, String> {
    if args.is_empty() {
        return Ok(Command::Help);
    }

    match args[0].as_str() {
        "--compile" => {
            let source = args.get(1).ok_or_else(|| "Missing source file for --compile".to_string())?;
            let out = match args.iter().position(|a| a == "--out") {
                Some(index) => Some(
                    args.get(index + 1)
                        .ok_or_else(|| "Missing value for --out".to_string())?
                        .clone(),
                ),
                None => None,
            };
            Ok(Command::Compile { source: source.clone(), out })
        }
        "--run" => {
            let source = args.get(1).ok_or_else(|| "Missing source file for --run".to_string())?;
            Ok(Command::Run { source: source.clone() })
        }
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(format!("Invalid command: '{other}'")),
    }
}

fn print_help() {
    say!(Green Bold "The Juno compiler");
    say!("Usage: ", Bold "<command>", Italic " <args>");
    say!(Green Bold "\nCommands:");
    say!("  --compile <source-file> --out <stem>   builds a native binary");
    say!("  --run <source-file>                    builds and runs a program");
    say!("  help                                   prints this message");
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
