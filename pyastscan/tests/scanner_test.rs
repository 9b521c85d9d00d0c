//! Test suite for the two-phase scanner.

use pyastscan::corpus::MemoryCorpus;
use pyastscan::errors::{ConfigError, ScanError};
use pyastscan::patterns::PatternConfig;
use pyastscan::report::{CollectSink, Finding};
use pyastscan::scanner::{CancelFlag, ParseErrorMode, Scanner};

fn run(configs: &[PatternConfig], files: &[(&str, &str)]) -> (Vec<Finding>, usize) {
    let corpus = MemoryCorpus::new(files);
    let mut scanner = Scanner::new(configs).unwrap();
    let mut sink = CollectSink::default();
    let summary = scanner.scan(&corpus, &mut sink).unwrap();
    assert_eq!(summary.findings, sink.findings.len() as u64);
    (sink.findings, summary.files_scanned)
}

#[test]
fn unused_classes_across_files() {
    // Scenario: Foo is never referenced anywhere; Bar is instantiated in
    // another file.
    let (findings, files) = run(
        &[PatternConfig::bare("unused_classes")],
        &[
            ("file1.py", "class Foo:\n    def method(self):\n        pass\n"),
            ("file2.py", "class Bar:\n    pass\n\nBar()\n"),
        ],
    );
    assert_eq!(files, 2);
    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.file.to_string_lossy(), "file1.py");
    assert_eq!((finding.line_start, finding.line_end), (1, 3));
    assert_eq!(finding.message, "Potentially unused class");
}

#[test]
fn previsitor_facts_cover_files_scanned_later() {
    // The reference appears in a file that sorts *after* the definition:
    // the fact store is fully built before any matching happens, so the
    // class still counts as used.
    let (findings, _) = run(
        &[PatternConfig::bare("unused_classes")],
        &[
            ("a_def.py", "class Widget:\n    pass\n"),
            ("z_use.py", "import a_def\n\nprint(a_def.Widget)\n"),
        ],
    );
    assert!(findings.is_empty());
}

#[test]
fn unused_classes_honors_ignore_regex() {
    let config = PatternConfig {
        name: "unused_classes".to_owned(),
        positional: Vec::new(),
        named: vec![("ignore".to_owned(), "Test.*".to_owned())],
    };
    let (findings, _) = run(
        &[config],
        &[("file.py", "class TestHelper:\n    pass\n\nclass Real:\n    pass\n")],
    );
    assert_eq!(findings.len(), 1);
    assert_eq!((findings[0].line_start, findings[0].line_end), (4, 5));
}

#[test]
fn forelse_flags_loops_without_break() {
    // Scenario: a for/else whose body cannot break always runs the else.
    let flagged = "for x in xs:\n    do(x)\nelse:\n    done()\n";
    let with_break = "for x in xs:\n    if stop(x):\n        break\nelse:\n    done()\n";
    let no_else = "for x in xs:\n    do(x)\n";

    let (findings, _) = run(
        &[PatternConfig::bare("forelse")],
        &[("a.py", flagged), ("b.py", with_break), ("c.py", no_else)],
    );
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].file.to_string_lossy(), "a.py");
    assert_eq!(findings[0].message, "For with else");
}

#[test]
fn forelse_flags_while_loops_too() {
    let (findings, _) = run(
        &[PatternConfig::bare("forelse")],
        &[("a.py", "while cond():\n    do()\nelse:\n    done()\n")],
    );
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].message, "While with else");
}

#[test]
fn replace_with_substring_checks_literal_arguments() {
    let (findings, _) = run(
        &[PatternConfig::bare("replace_with_substring")],
        &[
            ("flagged.py", "s.replace('hello', 'ell')\n"),
            ("empty.py", "s.replace('hello', '')\n"),
            ("clean.py", "s.replace('hello', 'xyz')\n"),
            ("dynamic.py", "s.replace(a, b)\n"),
        ],
    );
    let files: Vec<_> = findings
        .iter()
        .map(|finding| finding.file.to_string_lossy().into_owned())
        .collect();
    // An empty replacement is a substring too; both literal cases flag.
    assert_eq!(files, ["flagged.py", "empty.py"]);
}

#[test]
fn nested_list_match_reports_once() {
    let (findings, _) = run(
        &[PatternConfig::with_args("list", &["tmp"])],
        &[("a.py", "paths = [1, 'tmp', 'tmp', 3]\n")],
    );
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].message, "tmp");
}

#[test]
fn dict_matches_keys_then_values_once() {
    let (findings, _) = run(
        &[PatternConfig::with_args("dict", &["tmp"])],
        &[("a.py", "{'tmp': 'tmp', 'other': 'tmp'}\n")],
    );
    assert_eq!(findings.len(), 1);
}

#[test]
fn assign_matches_tuple_unpacking() {
    let (findings, _) = run(
        &[PatternConfig::with_args("assign", &["secret_.*"])],
        &[(
            "a.py",
            "secret_key = 1\na, secret_token = pair()\nplain = 2\n",
        )],
    );
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].message, "secret_key");
    assert_eq!(findings[1].message, "secret_token");
}

#[test]
fn call_pattern_matches_name_and_path() {
    let (findings, _) = run(
        &[PatternConfig::with_args("call", &["join", "path"])],
        &[(
            "a.py",
            "os.path.join(a)\nposixpath.join(b)\njoin(c)\nos.path.split(d)\n",
        )],
    );
    // Only the call whose qualifier path contains "path" and whose name
    // is "join" matches; the label is the call name.
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].message, "join");
    assert_eq!(findings[0].line_start, 1);
}

#[test]
fn findings_carry_context_chains() {
    let (findings, _) = run(
        &[PatternConfig::with_args("call", &["risky"])],
        &[(
            "a.py",
            "class Service:\n    def handle(self):\n        for item in items:\n            if item:\n                risky()\n",
        )],
    );
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].function_chain, ["Service", "handle"]);
    assert_eq!(findings[0].control_flow_chain, ["For", "If"]);
    assert_eq!((findings[0].line_start, findings[0].line_end), (5, 5));
}

#[test]
fn multiple_patterns_share_one_walk() {
    let configs = [
        PatternConfig::with_args("class", &["Hand.*"]),
        PatternConfig::with_args("function", &["run"]),
    ];
    let (findings, files) = run(
        &configs,
        &[("a.py", "class Handler:\n    pass\n\ndef run():\n    pass\n")],
    );
    assert_eq!(files, 1);
    let messages: Vec<_> = findings.iter().map(|f| f.message.as_str()).collect();
    assert_eq!(messages, ["Handler", "run"]);
}

#[test]
fn mutable_default_flags_literal_defaults() {
    let (findings, _) = run(
        &[PatternConfig::bare("mutable_default")],
        &[(
            "a.py",
            "def bad(items=[]):\n    pass\n\ndef fine(items=None):\n    pass\n\ndef kw_bad(*, cache={}):\n    pass\n",
        )],
    );
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].message, "Mutable default argument (List)");
    assert_eq!(findings[1].message, "Mutable default argument (Dict)");
}

#[test]
fn parse_failures_skip_and_continue_by_default() {
    let mut corpus = MemoryCorpus::new(&[
        ("broken.py", "def broken(:\n"),
        ("ok.py", "class Used:\n    pass\n\nUsed()\n"),
    ]);
    corpus.add_unreadable("missing.py");

    let mut scanner = Scanner::new(&[PatternConfig::bare("unused_classes")]).unwrap();
    let mut sink = CollectSink::default();
    let summary = scanner.scan(&corpus, &mut sink).unwrap();

    assert_eq!(summary.files_scanned, 3);
    assert_eq!(summary.parse_failures.len(), 2);
    assert!(sink.findings.is_empty());
    let skipped: Vec<_> = summary
        .parse_failures
        .iter()
        .map(|failure| failure.file.to_string_lossy().into_owned())
        .collect();
    assert!(skipped.contains(&"broken.py".to_owned()));
    assert!(skipped.contains(&"missing.py".to_owned()));
}

#[test]
fn strict_parse_mode_aborts_the_run() {
    let corpus = MemoryCorpus::new(&[("broken.py", "def broken(:\n")]);
    let mut scanner = Scanner::new(&[PatternConfig::bare("test")])
        .unwrap()
        .with_parse_error_mode(ParseErrorMode::Abort);
    let mut sink = CollectSink::default();
    assert!(matches!(
        scanner.scan(&corpus, &mut sink),
        Err(ScanError::ParseAborted { .. })
    ));
}

#[test]
fn cancellation_stops_between_files() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let corpus = MemoryCorpus::new(&[("a.py", "x = 1\n"), ("b.py", "y = 2\n")]);
    let mut scanner = Scanner::new(&[PatternConfig::bare("test")])
        .unwrap()
        .with_cancel_flag(cancel);
    let mut sink = CollectSink::default();
    let summary = scanner.scan(&corpus, &mut sink).unwrap();
    assert!(summary.interrupted);
    assert_eq!(summary.files_scanned, 0);
}

#[test]
fn config_errors_surface_before_scanning() {
    assert!(matches!(
        Scanner::new(&[PatternConfig::bare("no_such_pattern")]),
        Err(ConfigError::UnknownPattern(_))
    ));

    let bad_arg = PatternConfig {
        name: "dump".to_owned(),
        positional: vec!["not-a-number".to_owned()],
        named: Vec::new(),
    };
    assert!(matches!(
        Scanner::new(&[bad_arg]),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn deep_nesting_is_bounded_not_fatal() {
    // 600 nested ifs exceed the engine's depth bound; the scan survives
    // and records that the file was cut off.
    let mut source = String::new();
    for depth in 0..600 {
        source.push_str(&"    ".repeat(depth));
        source.push_str("if x:\n");
    }
    source.push_str(&"    ".repeat(600));
    source.push_str("pass\n");

    let corpus = MemoryCorpus::new(&[("deep.py", source.as_str())]);
    let mut scanner = Scanner::new(&[PatternConfig::bare("test")]).unwrap();
    let mut sink = CollectSink::default();
    let summary = scanner.scan(&corpus, &mut sink).unwrap();
    assert_eq!(summary.depth_limited, 1);
}
