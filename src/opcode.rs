/// The keyword at the start of a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
  /// Declares an integer variable.
  ///
  /// | Operation   | Semantics                  | Source        |
  /// |-------------|----------------------------|---------------|
  /// | Declare Int | `m[next] ← v; t[x] ← next` | `int x v`     |
  Int,

  /// Declares a boolean variable, stored as `0`/`1`.
  ///
  /// | Operation    | Semantics                        | Source        |
  /// |--------------|----------------------------------|---------------|
  /// | Declare Bool | `m[next] ← b as 0/1; t[x] ← next` | `bool x true` |
  Bool,

  /// Declares a text variable. The rest of the line is the text, with one
  /// surrounding pair of `"` removed.
  ///
  /// | Operation      | Semantics                  | Source             |
  /// |----------------|----------------------------|--------------------|
  /// | Declare String | `m[next] ← s; t[x] ← next` | `string x any text`|
  String,

  /// Reserves `n` zeroed cells and names the first one.
  ///
  /// | Operation     | Semantics                                   | Source        |
  /// |---------------|---------------------------------------------|---------------|
  /// | Declare Array | `m[next..next+n] ← 0; t[x] ← next`          | `charArr x n` |
  CharArr,

  /// Stops the whole run when the named cell is zero. Only zero stops it: a
  /// negative value carries on like any other nonzero value.
  ///
  /// | Operation  | Semantics                      | Source       |
  /// |------------|--------------------------------|--------------|
  /// | Jump Zero  | `if m[t[x]] == 0 : (stop run)` | `je x label` |
  Je,

  /// Records whether the named cell is zero in the pending-else flag.
  ///
  /// | Operation | Semantics               | Source       |
  /// |-----------|-------------------------|--------------|
  /// | If        | `flag ← m[t[x]] == 0`   | `if x label` |
  If,

  /// | Operation | Semantics       | Source |
  /// |-----------|-----------------|--------|
  /// | Else      | `flag ← ¬flag`  | `else` |
  Else,

  /// | Operation | Semantics                            | Source      |
  /// |-----------|--------------------------------------|-------------|
  /// | Exit      | `(print "Exit with code n", stop)`   | `sys out n` |
  Sys,

  /// | Operation | Semantics               | Source        |
  /// |-----------|-------------------------|---------------|
  /// | Move      | `m[t[d]] ← m[t[s]]`     | `from s to d` |
  From,

  /// | Operation | Semantics                   | Source      |
  /// |-----------|-----------------------------|-------------|
  /// | Add       | `m[t[r]] ← m[t[a]] + m[t[b]]` | `add a b r` |
  Add,

  /// | Operation | Semantics                   | Source      |
  /// |-----------|-----------------------------|-------------|
  /// | Subtract  | `m[t[r]] ← m[t[a]] − m[t[b]]` | `sub a b r` |
  Sub,

  /// | Operation | Semantics                   | Source      |
  /// |-----------|-----------------------------|-------------|
  /// | Multiply  | `m[t[r]] ← m[t[a]] × m[t[b]]` | `mul a b r` |
  Mul,

  /// Integer division, truncating toward zero.
  ///
  /// | Operation | Semantics                   | Source      |
  /// |-----------|-----------------------------|-------------|
  /// | Divide    | `m[t[r]] ← m[t[a]] ÷ m[t[b]]` | `dev a b r` |
  Dev,

  /// Prints a quoted literal, or the value of a variable.
  ///
  /// | Operation | Semantics         | Source              |
  /// |-----------|-------------------|---------------------|
  /// | Print     | `(print m[t[x]])` | `print x`, `print "text"` |
  Print,
}

impl Opcode {
  /// Look up a line's first token. Anything not in the vocabulary is `None`,
  /// and the line is dropped.
  pub fn from_keyword(keyword: &str) -> Option<Self> {
    let op = match keyword {
      "int" => Self::Int,
      "bool" => Self::Bool,
      "string" => Self::String,
      "charArr" => Self::CharArr,
      "je" => Self::Je,
      "if" => Self::If,
      "else" => Self::Else,
      "sys" => Self::Sys,
      "from" => Self::From,
      "add" => Self::Add,
      "sub" => Self::Sub,
      "mul" => Self::Mul,
      "dev" => Self::Dev,
      "print" => Self::Print,
      _ => return None,
    };
    Some(op)
  }

  pub fn keyword(&self) -> &'static str {
    match self {
      Self::Int => "int",
      Self::Bool => "bool",
      Self::String => "string",
      Self::CharArr => "charArr",
      Self::Je => "je",
      Self::If => "if",
      Self::Else => "else",
      Self::Sys => "sys",
      Self::From => "from",
      Self::Add => "add",
      Self::Sub => "sub",
      Self::Mul => "mul",
      Self::Dev => "dev",
      Self::Print => "print",
    }
  }
}

/// The four arithmetic instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
  Add,
  Sub,
  Mul,
  Dev,
}

impl BinaryKind {
  /// `None` on overflow or a zero divisor
  pub fn apply(self, a: i64, b: i64) -> Option<i64> {
    match self {
      Self::Add => a.checked_add(b),
      Self::Sub => a.checked_sub(b),
      Self::Mul => a.checked_mul(b),
      Self::Dev => a.checked_div(b),
    }
  }
}

/// What a `print` line refers to, settled when the line is parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintArg {
  Literal(String),
  Name(String),
}

impl PrintArg {
  pub fn from_text(text: &str) -> Self {
    match text
      .strip_prefix('"')
      .and_then(|rest| rest.strip_suffix('"'))
    {
      Some(inner) => Self::Literal(inner.to_owned()),
      None => Self::Name(text.to_owned()),
    }
  }
}

/// A single parsed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
  DeclareInt { name: String, value: i64 },
  DeclareBool { name: String, value: bool },
  DeclareString { name: String, text: String },
  DeclareArray { name: String, size: usize },
  JumpIfZero { name: String, label: String },
  If { name: String, label: String },
  Else,
  SysExit { code: i64 },
  Move { src: String, dst: String },
  BinaryOp {
    kind: BinaryKind,
    a: String,
    b: String,
    result: String,
  },
  Print(PrintArg),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keywords_round_trip() {
    for keyword in [
      "int", "bool", "string", "charArr", "je", "if", "else", "sys", "from", "add", "sub", "mul",
      "dev", "print",
    ] {
      let op = Opcode::from_keyword(keyword).unwrap();
      assert_eq!(op.keyword(), keyword);
    }
  }

  #[test]
  fn unknown_keywords() {
    assert_eq!(Opcode::from_keyword("goto"), None);
    assert_eq!(Opcode::from_keyword("INT"), None);
    assert_eq!(Opcode::from_keyword("chararr"), None);
  }

  #[test]
  fn binary_apply() {
    assert_eq!(BinaryKind::Add.apply(2, 3), Some(5));
    assert_eq!(BinaryKind::Sub.apply(2, 3), Some(-1));
    assert_eq!(BinaryKind::Mul.apply(-4, 3), Some(-12));
    assert_eq!(BinaryKind::Dev.apply(7, 2), Some(3));
    assert_eq!(BinaryKind::Dev.apply(-7, 2), Some(-3));
    assert_eq!(BinaryKind::Dev.apply(1, 0), None);
    assert_eq!(BinaryKind::Add.apply(i64::MAX, 1), None);
  }

  #[test]
  fn print_arg_shapes() {
    assert_eq!(
      PrintArg::from_text("\"hello world\""),
      PrintArg::Literal("hello world".into())
    );
    assert_eq!(PrintArg::from_text("\"\""), PrintArg::Literal(String::new()));
    assert_eq!(PrintArg::from_text("x"), PrintArg::Name("x".into()));
    // a lone quote is not a literal
    assert_eq!(PrintArg::from_text("\""), PrintArg::Name("\"".into()));
    assert_eq!(PrintArg::from_text("\"open"), PrintArg::Name("\"open".into()));
  }
}
