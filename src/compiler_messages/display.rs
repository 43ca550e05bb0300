use super::{CompilerError, CompilerMessages, ErrorType};
use saying::say;
use std::collections::HashMap;
use std::path::Path;

const PADDING: i64 = 3;

/// Renders one error in the `ERROR <path>:<line>:<col>: <message>` format from
/// §6, followed by a bracketed context window of up to `PADDING` lines before
/// and after the offending span, with the offending lines marked `~`.
///
/// `source` is the full text of the offending file; the core never reads
/// files itself, so the driver supplies it. Mirrors
/// `original_source/compiler/error.go`'s `RaiseLanguageCompileError`.
pub fn format_error(error: &CompilerError, source: &str) -> String {
    let Some(span) = &error.location else {
        return match error.detected_at {
            Some((file, line)) => format!(
                "ERROR [internal, {}:{}]: {}",
                file, line, error.message
            ),
            None => format!("ERROR: {}", error.message),
        };
    };

    let pos = span.position;
    let mut out = format!(
        "ERROR {}:{}:{}: {}\n",
        span.file.display(),
        pos.start_line,
        pos.start_col,
        error.message
    );

    let lines: Vec<&str> = source.lines().collect();
    if lines.is_empty() {
        return out;
    }

    let start = (pos.start_line as i64 - 1 - PADDING).max(0) as usize;
    let end = ((pos.end_line as i64 + PADDING) as usize).min(lines.len());
    let width = end.to_string().len();

    for (i, line) in lines.iter().enumerate().take(end).skip(start) {
        let line_no = i + 1;
        let marker = if line_no as u32 >= pos.start_line && line_no as u32 <= pos.end_line {
            "~"
        } else {
            " "
        };
        out.push_str(&format!("{:>width$} {} {}\n", line_no, marker, line, width = width));
    }

    out
}

/// Prints every error/warning in `messages` to stderr, colorized with
/// `saying::say!` the way the teacher's `display_messages::print_compiler_messages`
/// does. `sources` maps each file path seen in a diagnostic to its full text.
pub fn print_messages(messages: &CompilerMessages, sources: &HashMap<&Path, &str>) {
    for error in &messages.errors {
        let source = error
            .location
            .as_ref()
            .and_then(|span| sources.get(span.file.as_path()))
            .copied()
            .unwrap_or("");
        let rendered = format_error(error, source);
        match error.error_type {
            ErrorType::Syntax => say!(Red "Syntax error\n", rendered),
            ErrorType::Type => say!(Red "Type error\n", rendered),
            ErrorType::Rule => say!(Red "Rule violation\n", rendered),
            ErrorType::Compiler => say!(Red "Internal compiler error\n", rendered),
            ErrorType::File => say!(Yellow "File error\n", rendered),
            ErrorType::Config => say!(Yellow "Config error\n", rendered),
        }
    }

    for warning in &messages.warnings {
        say!(Dark Yellow "warning: ", warning.message.clone());
    }
}
