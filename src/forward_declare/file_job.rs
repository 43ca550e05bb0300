//! `(path, source bytes, parsed AST, owning environment, is_done, is_main)` — §3.

use crate::ast::Program;
use crate::environment::Env;
use std::cell::Cell;
use std::path::PathBuf;

pub struct FileJob {
    pub path: PathBuf,
    pub source: String,
    pub program: Program,
    pub env: Env,
    pub is_done: Cell<bool>,
    pub is_main: bool,
}

impl FileJob {
    pub fn new(path: PathBuf, source: String, program: Program, env: Env, is_main: bool) -> Self {
        FileJob {
            path,
            source,
            program,
            env,
            is_done: Cell::new(false),
            is_main,
        }
    }
}
