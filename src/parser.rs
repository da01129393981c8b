//! Turns script text into a [`Program`].
//!
//! Each line is split on whitespace and its first token picks the instruction.
//! Blank lines and lines starting with an unknown keyword are dropped without
//! complaint, but a known keyword missing its operands is an error.

use tracing::{debug, trace};

use crate::opcode::{BinaryKind, Instruction, Opcode, PrintArg};
use crate::region::{Line, Program};

/// An error that occurred while parsing a script
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("line {line}: malformed `{opcode}` instruction, expected {expected}")]
  MalformedInstruction {
    line: usize,
    opcode: &'static str,
    expected: &'static str,
  },

  #[error("line {line}: `{token}` is not an integer literal")]
  InvalidInteger { line: usize, token: String },

  #[error("line {line}: `{token}` is not `true` or `false`")]
  InvalidBool { line: usize, token: String },
}

/// Parse a whole script
pub fn parse(source: &str) -> Result<Program, Error> {
  let mut lines = Vec::new();
  for (i, text) in source.lines().enumerate() {
    let number = i + 1;
    if let Some(instruction) = parse_line(number, text)? {
      trace!(line = number, ?instruction, "parsed");
      lines.push(Line {
        number,
        instruction,
      });
    }
  }
  debug!(instructions = lines.len(), "parsed program");
  Ok(lines.into())
}

/// Parse one line, `Ok(None)` meaning the line produces no instruction
pub fn parse_line(number: usize, text: &str) -> Result<Option<Instruction>, Error> {
  let mut tokens = Tokens::new(number, text);
  let Some(keyword) = tokens.peek() else {
    return Ok(None);
  };
  let Some(op) = Opcode::from_keyword(keyword) else {
    debug!(line = number, keyword, "dropping line with unknown keyword");
    return Ok(None);
  };
  tokens.begin(op);

  let instruction = match op {
    Opcode::Int => Instruction::DeclareInt {
      name: tokens.eat()?.to_owned(),
      value: tokens.eat_int()?,
    },
    Opcode::Bool => Instruction::DeclareBool {
      name: tokens.eat()?.to_owned(),
      value: tokens.eat_bool()?,
    },
    Opcode::String => {
      let name = tokens.eat()?.to_owned();
      let rest = tokens.rest();
      let rest = rest.strip_prefix('"').unwrap_or(rest);
      let text = rest.strip_suffix('"').unwrap_or(rest);
      Instruction::DeclareString {
        name,
        text: text.to_owned(),
      }
    }
    Opcode::CharArr => Instruction::DeclareArray {
      name: tokens.eat()?.to_owned(),
      size: tokens.eat_size()?,
    },
    Opcode::Je => Instruction::JumpIfZero {
      name: tokens.eat()?.to_owned(),
      label: tokens.eat()?.to_owned(),
    },
    Opcode::If => Instruction::If {
      name: tokens.eat()?.to_owned(),
      label: tokens.eat()?.to_owned(),
    },
    Opcode::Else => Instruction::Else,
    Opcode::Sys => {
      let call = tokens.eat()?;
      let code = tokens.eat_int()?;
      if call != "out" {
        debug!(line = number, call, "dropping unknown system call");
        return Ok(None);
      }
      Instruction::SysExit { code }
    }
    Opcode::From => {
      let src = tokens.eat()?.to_owned();
      // conventionally `to`, never checked
      let _ = tokens.eat()?;
      let dst = tokens.eat()?.to_owned();
      Instruction::Move { src, dst }
    }
    Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Dev => {
      let kind = match op {
        Opcode::Add => BinaryKind::Add,
        Opcode::Sub => BinaryKind::Sub,
        Opcode::Mul => BinaryKind::Mul,
        _ => BinaryKind::Dev,
      };
      Instruction::BinaryOp {
        kind,
        a: tokens.eat()?.to_owned(),
        b: tokens.eat()?.to_owned(),
        result: tokens.eat()?.to_owned(),
      }
    }
    Opcode::Print => {
      let words: Vec<&str> = tokens.rest().split_whitespace().collect();
      if words.is_empty() {
        return Err(tokens.malformed());
      }
      Instruction::Print(PrintArg::from_text(&words.join(" ")))
    }
  };
  Ok(Some(instruction))
}

/// What each keyword must be followed by, for error messages
fn operands(op: Opcode) -> &'static str {
  match op {
    Opcode::Int => "a name and an integer",
    Opcode::Bool => "a name and `true` or `false`",
    Opcode::String => "a name",
    Opcode::CharArr => "a name and a size",
    Opcode::Je | Opcode::If => "a name and a label",
    Opcode::Else => "nothing",
    Opcode::Sys => "`out` and an integer",
    Opcode::From => "`from <src> to <dst>`",
    Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Dev => "two operands and a result name",
    Opcode::Print => "a quoted literal or a name",
  }
}

struct Tokens<'a> {
  line: usize,
  rest: &'a str,
  op: Opcode,
}

impl<'a> Tokens<'a> {
  fn new(line: usize, text: &'a str) -> Self {
    Self {
      line,
      rest: text,
      op: Opcode::Else,
    }
  }

  fn peek(&self) -> Option<&'a str> {
    self.rest.split_whitespace().next()
  }

  /// Consume the keyword, remembering which instruction is being read
  fn begin(&mut self, op: Opcode) {
    self.op = op;
    let _ = self.eat();
  }

  fn malformed(&self) -> Error {
    Error::MalformedInstruction {
      line: self.line,
      opcode: self.op.keyword(),
      expected: operands(self.op),
    }
  }

  #[inline]
  fn eat(&mut self) -> Result<&'a str, Error> {
    let rest = self.rest.trim_start();
    if rest.is_empty() {
      return Err(self.malformed());
    }
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let (token, rest) = rest.split_at(end);
    self.rest = rest;
    Ok(token)
  }

  fn eat_int(&mut self) -> Result<i64, Error> {
    let token = self.eat()?;
    token.parse().map_err(|_| Error::InvalidInteger {
      line: self.line,
      token: token.to_owned(),
    })
  }

  fn eat_size(&mut self) -> Result<usize, Error> {
    let token = self.eat()?;
    token.parse().map_err(|_| Error::InvalidInteger {
      line: self.line,
      token: token.to_owned(),
    })
  }

  fn eat_bool(&mut self) -> Result<bool, Error> {
    match self.eat()? {
      "true" => Ok(true),
      "false" => Ok(false),
      token => Err(Error::InvalidBool {
        line: self.line,
        token: token.to_owned(),
      }),
    }
  }

  /// Everything after the tokens eaten so far, trimmed
  fn rest(&mut self) -> &'a str {
    let rest = self.rest.trim();
    self.rest = "";
    rest
  }
}
