//! Build orchestration (§6 "Command line" / "Environment & filesystem"):
//! turns a source entry point into emitted Go files under the project's
//! cache directory, then hands off to the `go` toolchain for `--compile` /
//! `--run`. Grounded on the teacher's `build_system/build.rs` for the
//! overall "resolve, then build, then report" shape, though the single Go
//! target here needs none of `ProjectBuilder`'s multi-backend dispatch.

use crate::analysis::analyze_file;
use crate::compiler_messages::{CompilerError, CompilerMessages};
use crate::containers::render_container_file;
use crate::forward_declare::Resolver;
use crate::projects::settings::Config;
use crate::timer_log;
use rayon::prelude::*;
use saying::say;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

pub const CONTAINERS_FILE_NAME: &str = "__containers__.go";

/// Resolves the whole reachable file graph, analyzes every file, and writes
/// the emitted `.go` sources (plus the container-template file) under
/// `project_root/config.cache_dir`. Returns that directory.
pub fn emit_project(entry: &Path, project_root: &Path, config: &Config) -> Result<PathBuf, CompilerMessages> {
    let start = Instant::now();

    let (jobs, mut state) = Resolver::resolve_entry(entry).map_err(CompilerMessages::from)?;

    let mut rendered: Vec<(PathBuf, String)> = Vec::with_capacity(jobs.len() + 1);
    for path in jobs.keys() {
        let job = &jobs[path];
        let text = analyze_file(job, &mut state.types, &mut state.containers).map_err(CompilerMessages::from)?;
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("module");
        rendered.push((PathBuf::from(format!("{stem}.go")), text));
    }
    rendered.push((PathBuf::from(CONTAINERS_FILE_NAME), render_container_file(&state.containers)));

    let cache_dir = project_root.join(&config.cache_dir);
    std::fs::create_dir_all(&cache_dir)
        .map_err(|e| CompilerError::file(format!("cannot create '{}': {e}", cache_dir.display()), cache_dir.clone()))
        .map_err(CompilerMessages::from)?;

    // Resolution above is a single-threaded fixed point over shared state
    // (§5); writing the already-rendered files out has no such dependency,
    // so it fans out across `rayon`'s pool.
    rendered
        .par_iter()
        .try_for_each(|(name, text)| -> Result<(), CompilerError> {
            let destination = cache_dir.join(name);
            std::fs::write(&destination, text)
                .map_err(|e| CompilerError::file(format!("cannot write '{}': {e}", destination.display()), destination.clone()))
        })
        .map_err(CompilerMessages::from)?;

    timer_log!(start, "Emitted Go sources in: ");
    Ok(cache_dir)
}

/// `--compile`: emit, `go build` to a named binary, and move it next to the
/// project root.
pub fn build(entry: &Path, project_root: &Path, config: &Config, out_stem: &str) -> Result<PathBuf, CompilerMessages> {
    let cache_dir = emit_project(entry, project_root, config)?;
    ensure_go_module(&cache_dir).map_err(CompilerMessages::from)?;
    run_gofmt(&cache_dir);

    let out_name = if cfg!(windows) { format!("{out_stem}.exe") } else { out_stem.to_string() };
    let output = run_go(&cache_dir, &["build", "-o", &out_name, "."]).map_err(CompilerMessages::from)?;
    if !output.status.success() {
        return Err(CompilerMessages::from(CompilerError::system(format!(
            "go build failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        ))));
    }

    let built = cache_dir.join(&out_name);
    let destination = project_root.join(&out_name);
    std::fs::rename(&built, &destination)
        .map_err(|e| CompilerError::file(format!("cannot move built binary to '{}': {e}", destination.display()), destination.clone()))
        .map_err(CompilerMessages::from)?;

    say!(Green Bold "Built ", destination.display());
    Ok(destination)
}

/// `--run`: emit, then `go run .`, forwarding the subprocess's own stdio so
/// the compiled program's output reaches the user directly.
pub fn run(entry: &Path, project_root: &Path, config: &Config) -> Result<(), CompilerMessages> {
    let cache_dir = emit_project(entry, project_root, config)?;
    ensure_go_module(&cache_dir).map_err(CompilerMessages::from)?;
    run_gofmt(&cache_dir);

    let status = Command::new(go_binary())
        .args(["run", "."])
        .current_dir(&cache_dir)
        .status()
        .map_err(|e| CompilerError::system(format!("failed to invoke 'go run': {e}")))
        .map_err(CompilerMessages::from)?;

    if !status.success() {
        return Err(CompilerMessages::from(CompilerError::system("'go run' exited with a non-zero status")));
    }
    Ok(())
}

/// Prefers a toolchain bundled next to the compiler's own executable,
/// falling back to whatever `go` is on `PATH` (§6 "Environment & filesystem").
fn go_binary() -> PathBuf {
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let bundled = dir.join("thirdparty").join("go").join("bin").join(if cfg!(windows) { "go.exe" } else { "go" });
        if bundled.exists() {
            return bundled;
        }
    }
    PathBuf::from("go")
}

fn run_go(cache_dir: &Path, args: &[&str]) -> Result<std::process::Output, CompilerError> {
    Command::new(go_binary())
        .args(args)
        .current_dir(cache_dir)
        .output()
        .map_err(|e| CompilerError::system(format!("failed to invoke 'go {}': {e}", args.join(" "))))
}

fn ensure_go_module(cache_dir: &Path) -> Result<(), CompilerError> {
    if cache_dir.join("go.mod").exists() {
        return Ok(());
    }
    let output = run_go(cache_dir, &["mod", "init", "juno_build"])?;
    if !output.status.success() {
        return Err(CompilerError::system(format!("go mod init failed:\n{}", String::from_utf8_lossy(&output.stderr))));
    }
    Ok(())
}

/// Best-effort only: unformatted but valid Go source still builds and runs,
/// and a missing `gofmt` shouldn't block either.
fn run_gofmt(cache_dir: &Path) {
    let _ = Command::new("gofmt").args(["-w", "."]).current_dir(cache_dir).output();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn emit_project_writes_one_go_file_per_source_plus_containers() {
        let project = tempdir().unwrap();
        std::fs::write(
            project.path().join("main.juno"),
            "function main(args [str]) void { println(\"hi\"); return; }",
        )
        .unwrap();

        let entry = project.path().join("main.juno");
        let config = Config::default();
        let cache_dir = emit_project(&entry, project.path(), &config).unwrap();

        let main_go = std::fs::read_to_string(cache_dir.join("main.go")).unwrap();
        assert!(main_go.contains("package main"));
        assert!(main_go.contains("func main()"));
        assert!(cache_dir.join(CONTAINERS_FILE_NAME).exists());
    }

    #[test]
    fn emit_project_reports_analysis_errors_as_compiler_messages() {
        let project = tempdir().unwrap();
        std::fs::write(project.path().join("main.juno"), "function main(args [str]) void { unknown(); return; }").unwrap();

        let entry = project.path().join("main.juno");
        let config = Config::default();
        let result = emit_project(&entry, project.path(), &config);
        assert!(result.is_err());
    }
}
