use kaf::interpreter::Outcome;

fn run(source: &str) -> (Outcome, String) {
  let mut out = Vec::new();
  let outcome = kaf::run_source(source, &mut out).unwrap();
  (outcome, String::from_utf8(out).unwrap())
}

#[test]
fn arithmetic() {
  let (outcome, out) = run(include_str!("../demos/arithmetic.kaf"));
  assert_eq!(outcome, Outcome::Exited(0));
  assert_eq!(
    out,
    "9\n3\n18\n2\nError: Division by zero.\n2\nExit with code 0\n"
  );
}

#[test]
fn guard() {
  let (outcome, out) = run(include_str!("../demos/guard.kaf"));
  assert_eq!(outcome, Outcome::Stopped { line: 7 });
  assert_eq!(out, "hello there\nguard passed\n");
}

#[test]
fn memory() {
  let (outcome, out) = run(include_str!("../demos/memory.kaf"));
  assert_eq!(outcome, Outcome::Completed);
  assert_eq!(out, "42\n42\n1\nUndefined variable: missing\n");
}

#[test]
fn parse_errors_surface_before_anything_runs() {
  let mut out = Vec::new();
  let err = kaf::run_source("print \"first\"\nint broken", &mut out).unwrap_err();
  assert!(matches!(err, kaf::Error::Parse(_)));
  assert_eq!(
    err.to_string(),
    "line 2: malformed `int` instruction, expected a name and an integer"
  );
  assert!(out.is_empty());
}

#[test]
fn runtime_errors_keep_earlier_output() {
  let mut out = Vec::new();
  let source = "print \"first\"\nfrom a to b\nprint \"never\"";
  let err = kaf::run_source(source, &mut out).unwrap_err();
  assert!(matches!(err, kaf::Error::Runtime(_)));
  assert_eq!(err.to_string(), "line 2: undefined variable `a`");
  assert_eq!(out, b"first\n");
}
