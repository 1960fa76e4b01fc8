//! Shared helpers for integration tests.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Stand-in for the build tool.
///
/// Logs every invocation (flavor, arch, whether the release override was in
/// place, clean or not) to `calls.log` and writes the binary the real tool
/// would produce. `FAKE_FAIL` makes it exit non-zero, `FAKE_NO_OUTPUT`
/// makes it finish without producing anything.
const FAKE_TOOL: &str = r#"#!/bin/sh
platform=""; target=""; arch=""; mode="build"
for arg in "$@"; do
  case "$arg" in
    platform=*) platform="${arg#platform=}" ;;
    target=*) target="${arg#target=}" ;;
    arch=*) arch="${arg#arch=}" ;;
    -c) mode="clean" ;;
  esac
done
if [ -f custom.py ]; then state="override"; else state="plain"; fi
echo "$platform $target $arch $state $mode" >> calls.log
if [ -n "$FAKE_FAIL" ]; then exit 1; fi
if [ "$mode" = "clean" ] || [ -n "$FAKE_NO_OUTPUT" ]; then exit 0; fi
mkdir -p bin
echo "built $platform $target $arch" > "bin/godot.$platform.$target.$arch.exe"
"#;

/// Isolated project root with a fake build tool configured.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };
    env.write_file("fake-scons.sh", FAKE_TOOL);
    env.write_file(".tekisasu-custom.py", "optimize = \"size\"\n");
    env.write_file("txbuild.json", r#"{ "tool": "sh fake-scons.sh" }"#);
    env
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.root().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.root().join(relative_path)).unwrap()
  }

  pub fn export_dir(&self) -> PathBuf {
    self.root().join("bin").join("export")
  }

  /// Filenames currently in the export directory.
  pub fn exports(&self) -> BTreeSet<String> {
    match std::fs::read_dir(self.export_dir()) {
      Ok(entries) => entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect(),
      Err(_) => BTreeSet::new(),
    }
  }

  /// Lines the fake tool logged, one per invocation.
  pub fn calls(&self) -> Vec<String> {
    match std::fs::read_to_string(self.root().join("calls.log")) {
      Ok(log) => log.lines().map(str::to_string).collect(),
      Err(_) => Vec::new(),
    }
  }

  pub fn override_present(&self) -> bool {
    self.root().join("custom.py").exists()
  }

  /// Get a pre-configured Command for the txbuild binary.
  ///
  /// Points `--root` at the temp project and strips `TXBUILD_*` variables
  /// so the host environment cannot change the configuration.
  pub fn txbuild_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("txbuild");
    cmd
      .arg("--root")
      .arg(self.root())
      .env_remove("TXBUILD_TOOL")
      .env_remove("TXBUILD_JOBS")
      .env_remove("TXBUILD_SCRIPT_KEY")
      .env_remove("TXBUILD_TIMEOUT")
      .env_remove("FAKE_FAIL")
      .env_remove("FAKE_NO_OUTPUT");
    cmd
  }
}
