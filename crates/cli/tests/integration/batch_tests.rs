use std::collections::BTreeSet;

use predicates::prelude::*;

use crate::common::TestEnv;

fn names(items: &[&str]) -> BTreeSet<String> {
  items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn build_release_64_exports_renamed_binary() {
  let env = TestEnv::new();

  env
    .txbuild_cmd()
    .args(["build", "release", "64"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Build complete!"));

  assert_eq!(env.calls(), vec!["windows template_release x86_64 override build"]);
  assert_eq!(env.exports(), names(&["windows_release_x86_64.exe"]));
  assert_eq!(
    env.read_file("bin/export/windows_release_x86_64.exe"),
    "built windows template_release x86_64\n"
  );
  assert!(!env.override_present());
}

#[test]
fn build_all_runs_matrix_in_order() {
  let env = TestEnv::new();

  env.txbuild_cmd().arg("build").assert().success();

  assert_eq!(
    env.calls(),
    vec![
      "windows editor x86_64 plain build",
      "windows template_release x86_64 override build",
      "windows template_release x86_32 override build",
      "windows template_debug x86_64 plain build",
      "windows template_debug x86_32 plain build",
      "uwp template_release x86_64 override build",
      "uwp template_release arm64 override build",
      "uwp template_debug x86_64 plain build",
      "uwp template_debug arm64 plain build",
    ]
  );
  assert_eq!(
    env.exports(),
    names(&[
      "Tekisasu-Engine.exe",
      "windows_release_x86_64.exe",
      "windows_release_x86_32.exe",
      "windows_debug_x86_64.exe",
      "windows_debug_x86_32.exe",
      "uwp_release_x86_64.exe",
      "uwp_release_arm64.exe",
      "uwp_debug_x86_64.exe",
      "uwp_debug_arm64.exe",
    ])
  );
  assert!(!env.override_present());
}

#[test]
fn clean_all_exports_nothing() {
  let env = TestEnv::new();
  env.write_file("bin/godot.windows.template_release.x86_64.exe", "stale");
  env.write_file("bin/export/windows_release_x86_64.exe", "old");

  env
    .txbuild_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Clean complete!"));

  let calls = env.calls();
  assert_eq!(calls.len(), 9);
  assert!(calls.iter().all(|c| c.ends_with(" clean")));
  for call in &calls {
    assert_eq!(call.contains(" override "), call.contains("template_release"), "{}", call);
  }
  assert!(env.exports().is_empty());
  assert!(!env.override_present());
}

#[test]
fn secondary_platform_variant() {
  let env = TestEnv::new();

  env.txbuild_cmd().args(["build", "release", "64", "uwp_arm"]).assert().success();

  assert_eq!(env.calls(), vec!["uwp template_release arm64 override build"]);
  assert_eq!(env.exports(), names(&["uwp_release_arm64.exe"]));
}

#[test]
fn tool_failure_does_not_abort_batch() {
  let env = TestEnv::new();

  env
    .txbuild_cmd()
    .arg("build")
    .env("FAKE_FAIL", "1")
    .assert()
    .success()
    .stderr(predicate::str::contains("9 job(s) failed"))
    .stderr(predicate::str::is_match(r"failed: .* exited with code Some\(1\) \(\d+ms\)").unwrap());

  assert_eq!(env.calls().len(), 9);
  assert!(env.exports().is_empty());
  assert!(!env.override_present());
}

#[test]
fn fail_on_error_sets_exit_status() {
  let env = TestEnv::new();

  env
    .txbuild_cmd()
    .args(["build", "debug", "64", "--fail-on-error"])
    .env("FAKE_FAIL", "1")
    .assert()
    .code(1);
}

#[test]
fn missing_output_is_not_an_error() {
  let env = TestEnv::new();

  env
    .txbuild_cmd()
    .args(["build", "tools", "--fail-on-error"])
    .env("FAKE_NO_OUTPUT", "1")
    .assert()
    .success()
    .stdout(predicate::str::contains("nothing to export"));

  assert!(env.exports().is_empty());
}

#[test]
fn previous_export_is_replaced() {
  let env = TestEnv::new();
  env.write_file("bin/export/windows_debug_x86_64.exe", "old");

  env.txbuild_cmd().args(["build", "debug", "64"]).assert().success();

  assert_eq!(env.exports(), names(&["windows_debug_x86_64.exe"]));
  assert_eq!(
    env.read_file("bin/export/windows_debug_x86_64.exe"),
    "built windows template_debug x86_64\n"
  );
}

#[test]
fn stale_override_is_removed_first() {
  let env = TestEnv::new();
  env.write_file("custom.py", "left behind");

  env
    .txbuild_cmd()
    .args(["build", "debug", "64"])
    .assert()
    .success()
    .stderr(predicate::str::contains("left behind by an earlier run"));

  assert_eq!(env.calls(), vec!["windows template_debug x86_64 plain build"]);
  assert!(!env.override_present());
}

#[test]
fn missing_override_template_fails_release_jobs_only() {
  let env = TestEnv::new();
  std::fs::remove_file(env.root().join(".tekisasu-custom.py")).unwrap();

  env
    .txbuild_cmd()
    .args(["build", "release", "32"])
    .assert()
    .success()
    .stderr(predicate::str::contains("release override template not found"));

  assert!(env.calls().is_empty());
  assert!(env.exports().is_empty());
}

#[test]
fn json_report() {
  let env = TestEnv::new();

  let output = env
    .txbuild_cmd()
    .args(["build", "debug", "32", "--output", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["action"], "build");
  assert_eq!(report["stale_override_removed"], false);
  let outcome = &report["outcomes"][0];
  assert_eq!(outcome["status"], "exported");
  assert_eq!(outcome["job"]["flavor"], "template_debug");
  assert!(outcome["artifact"].as_str().unwrap().ends_with("windows_debug_x86_32.exe"));
}

#[test]
fn json_report_stays_parseable_when_tool_prints() {
  let env = TestEnv::new();
  env.write_file(
    "txbuild.json",
    r#"{ "tool": "echo scons: Building targets ...; sh fake-scons.sh" }"#,
  );

  let output = env
    .txbuild_cmd()
    .args(["build", "debug", "32", "--output", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["outcomes"][0]["status"], "exported");
  assert!(String::from_utf8_lossy(&output.stderr).contains("scons: Building targets"));
}

#[test]
fn script_key_reaches_tool() {
  let env = TestEnv::new();
  env.write_file(
    "txbuild.json",
    r#"{ "tool": "printf %s \"$SCRIPT_AES256_ENCRYPTION_KEY\" > key.txt; true" }"#,
  );

  env
    .txbuild_cmd()
    .args(["build", "debug", "64"])
    .env("TXBUILD_SCRIPT_KEY", "0123abcd")
    .assert()
    .success();

  assert_eq!(env.read_file("key.txt"), "0123abcd");
}

#[test]
fn hung_tool_times_out() {
  let env = TestEnv::new();
  env.write_file("txbuild.json", r#"{ "tool": "sleep 5 #" }"#);

  env
    .txbuild_cmd()
    .args(["build", "debug", "64", "--timeout", "200ms"])
    .assert()
    .success()
    .stderr(predicate::str::contains("timed out"));
}

#[test]
fn timeout_stops_processes_the_tool_started() {
  let env = TestEnv::new();
  env.write_file(
    "slow.sh",
    "sh -c 'sleep 1; mkdir -p bin; echo built > bin/late.txt'\necho done\n",
  );
  env.write_file("txbuild.json", r#"{ "tool": "sh slow.sh" }"#);

  env
    .txbuild_cmd()
    .args(["build", "debug", "64", "--timeout", "200ms"])
    .assert()
    .success()
    .stderr(predicate::str::contains("timed out"));

  std::thread::sleep(std::time::Duration::from_millis(1500));
  assert!(!env.root().join("bin").join("late.txt").exists());
}
