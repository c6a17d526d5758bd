//! Target list input tests

use std::io::Cursor;
use ttlguess::utils::{collect_targets, read_targets};
use ttlguess::GuessError;

#[test]
fn test_positional_targets_win_over_stdin() {
    let stdin = Cursor::new("from-stdin.example\n");
    let targets = collect_targets(
        vec!["10.0.0.1".to_string(), "host.example".to_string()],
        stdin,
    )
    .unwrap();
    assert_eq!(targets, vec!["10.0.0.1", "host.example"]);
}

#[test]
fn test_stdin_targets_in_order() {
    let stdin = Cursor::new("a.example\n\n# lab hosts\n  10.0.0.2  \nb.example\na.example");
    let targets = collect_targets(Vec::new(), stdin).unwrap();
    assert_eq!(targets, vec!["a.example", "10.0.0.2", "b.example", "a.example"]);
}

#[test]
fn test_read_stats() {
    let (targets, stats) = read_targets(Cursor::new("x\n\n#y\nz\n")).unwrap();
    assert_eq!(targets, vec!["x", "z"]);
    assert_eq!(stats.total_lines, 4);
    assert_eq!(stats.valid_targets, 2);
    assert_eq!(stats.skipped_lines, 2);
}

#[test]
fn test_no_targets_anywhere() {
    let result = collect_targets(Vec::new(), Cursor::new(""));
    assert!(matches!(result, Err(GuessError::NoTargets)));

    let blank = collect_targets(vec!["  ".to_string()], Cursor::new("\n\n"));
    assert!(matches!(blank, Err(GuessError::NoTargets)));
    assert!(GuessError::NoTargets.is_fatal());
}
