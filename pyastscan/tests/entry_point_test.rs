//! End-to-end tests driving the shared entry point the way the binary
//! does, with output captured.

use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run_in(dir: &Path, args: &[&str]) -> (i32, String) {
    let mut full: Vec<String> = args.iter().map(|&arg| arg.to_owned()).collect();
    full.extend(["-p".to_owned(), dir.to_string_lossy().into_owned()]);
    let mut out = Vec::new();
    let code = pyastscan::entry_point::run_with_args_to(full, &mut out).unwrap();
    (code, String::from_utf8(out).unwrap())
}

#[test]
fn grepable_run_prints_findings_and_summary() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("app.py"),
        "import subprocess\n\nsubprocess.call('ls')\n",
    )
    .unwrap();

    let (code, out) = run_in(dir.path(), &["call", "-a", "call", "-g", "-c"]);
    assert_eq!(code, 0);
    assert!(out.contains("app.py:3"), "missing finding line in: {out}");
    assert!(out.contains("call"));
    assert!(out.contains("Files: 1"));
    assert!(out.contains("Findings: 1"));
}

#[test]
fn source_excerpts_are_printed_by_default() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("app.py"), "magic = 42\n").unwrap();

    let (code, out) = run_in(dir.path(), &["assign", "-a", "magic", "-c"]);
    assert_eq!(code, 0);
    assert!(out.contains("   1:magic = 42"), "missing excerpt in: {out}");

    let (_, quiet) = run_in(dir.path(), &["assign", "-a", "magic", "-c", "-n"]);
    assert!(!quiet.contains("   1:magic = 42"));
}

#[test]
fn json_output_is_machine_readable() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("app.py"), "class Orphan:\n    pass\n").unwrap();

    let (code, out) = run_in(dir.path(), &["unused_classes", "--json", "-c"]);
    assert_eq!(code, 0);
    let findings: serde_json::Value = serde_json::from_str(&out).unwrap();
    let list = findings.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["message"], "Potentially unused class");
    assert_eq!(list[0]["line_start"], 1);
}

#[test]
fn unknown_pattern_is_a_usage_error() {
    let dir = tempdir().unwrap();
    let (code, _) = run_in(dir.path(), &["bogus_pattern", "-c"]);
    assert_eq!(code, 2);
}

#[test]
fn list_flag_prints_the_registry() {
    let dir = tempdir().unwrap();
    let (code, out) = run_in(dir.path(), &["--list", "-c"]);
    assert_eq!(code, 0);
    assert!(out.contains("Common patterns:"));
    assert!(out.contains("unused_classes"));
    assert!(out.contains("forelse"));
}

#[test]
fn pattern_file_runs_several_patterns_in_one_scan() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("app.py"),
        "for x in xs:\n    use(x)\nelse:\n    done()\n\ns.replace('hello', 'ell')\n",
    )
    .unwrap();
    let patterns = dir.path().join("patterns.txt");
    fs::write(&patterns, "# both checks\nforelse\nreplace_with_substring\n").unwrap();

    let (code, out) = run_in(
        dir.path(),
        &["file", "-a", patterns.to_string_lossy().as_ref(), "-g", "-c"],
    );
    assert_eq!(code, 0);
    assert!(out.contains("For with else"), "missing forelse in: {out}");
    assert!(out.contains("Replace with substring"));
    assert!(out.contains("Findings: 2"));
}

#[test]
fn skipped_directories_are_not_scanned() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("tests")).unwrap();
    fs::write(dir.path().join("app.py"), "risky()\n").unwrap();
    fs::write(dir.path().join("tests").join("test_app.py"), "risky()\n").unwrap();

    let (_, out) = run_in(dir.path(), &["call", "-a", "risky", "-g", "-c"]);
    assert!(out.contains("Files: 1"));
    assert!(out.contains("Findings: 1"));
}

#[test]
fn broken_files_are_reported_and_skipped() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.py"), "def broken(:\n").unwrap();
    fs::write(dir.path().join("good.py"), "ok()\n").unwrap();

    let (code, out) = run_in(dir.path(), &["call", "-a", "ok", "-g", "-c"]);
    assert_eq!(code, 0);
    assert!(out.contains("skipped"), "missing skip notice in: {out}");
    assert!(out.contains("Findings: 1"));

    let (strict_code, _) = run_in(dir.path(), &["call", "-a", "ok", "-c", "--strict-parse"]);
    assert_eq!(strict_code, 1);
}
