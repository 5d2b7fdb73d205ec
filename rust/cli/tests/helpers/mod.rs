//! In-process harness around `chipdeck_cli::run_with`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chipdeck_engine::state::GameState;
use chipdeck_cli::store::FileStore;
use tempfile::TempDir;

#[derive(Debug)]
pub struct CliOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// A temp directory plus a fake environment pointing the save file into it.
pub struct Harness {
    dir: TempDir,
    env: HashMap<String, String>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_save_name("save.json")
    }

    pub fn with_save_name(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut env = HashMap::new();
        env.insert(
            "CHIPDECK_SAVE".to_string(),
            dir.path().join(name).to_string_lossy().into_owned(),
        );
        env.insert("CHIPDECK_SEED".to_string(), "42".to_string());
        Self { dir, env }
    }

    pub fn set_env(&mut self, key: &str, value: &str) {
        self.env.insert(key.to_string(), value.to_string());
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn save_path(&self) -> PathBuf {
        PathBuf::from(&self.env["CHIPDECK_SAVE"])
    }

    pub fn run(&self, args: &[&str]) -> CliOutput {
        self.run_with_input(args, "")
    }

    pub fn run_with_input(&self, args: &[&str], input: &str) -> CliOutput {
        let env = |key: &str| -> Option<String> { self.env.get(key).cloned() };
        let mut stdin = Cursor::new(input.as_bytes().to_vec());
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let argv = std::iter::once("chipdeck").chain(args.iter().copied());
        let code = chipdeck_cli::run_with(argv, &env, &mut stdin, &mut out, &mut err);
        CliOutput {
            code,
            stdout: String::from_utf8(out).expect("utf8 stdout"),
            stderr: String::from_utf8(err).expect("utf8 stderr"),
        }
    }

    pub fn load(&self) -> GameState {
        FileStore::open(self.save_path()).expect("open save").load_state()
    }

    pub fn write_save(&self, json: &str) {
        write_file(&self.save_path(), json);
    }
}

pub fn write_file(path: &Path, text: &str) {
    std::fs::write(path, text).expect("write file");
}
