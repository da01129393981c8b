use crate::opcode::Instruction;

/// An instruction together with the source line it came from (1-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
  pub number: usize,
  pub instruction: Instruction,
}

/// A region of instructions
pub trait Region {
  fn instructions(&self) -> &[Line];
}

/// A `Program` is the ordered, immutable list of instructions parsed from a
/// single script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
  lines: Vec<Line>,
}

impl Program {
  pub fn len(&self) -> usize {
    self.lines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }
}

impl From<Vec<Line>> for Program {
  fn from(lines: Vec<Line>) -> Self {
    Self { lines }
  }
}

/// Number instructions from 1, as if each sat on its own line
impl From<Vec<Instruction>> for Program {
  fn from(instructions: Vec<Instruction>) -> Self {
    let lines = instructions
      .into_iter()
      .enumerate()
      .map(|(i, instruction)| Line {
        number: i + 1,
        instruction,
      })
      .collect();
    Self { lines }
  }
}

impl Region for Program {
  fn instructions(&self) -> &[Line] {
    &self.lines
  }
}
