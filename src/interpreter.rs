use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use tracing::{debug, info};

use crate::memory::{self, Cell, Memory};
use crate::opcode::{BinaryKind, Instruction, PrintArg};
use crate::region::Region;

/// How a run came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// Every instruction was executed
  Completed,
  /// `sys out` was reached; the code is only echoed, never used as a status
  Exited(i64),
  /// A `je` guard read zero on the given line
  Stopped { line: usize },
  /// A fatal error was raised on the given line
  Failed { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
  Active,
  Halted(Outcome),
}

/// A fatal error, aborting the run
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("line {line}: undefined variable `{name}`")]
  UndefinedVariable { line: usize, name: String },

  #[error("line {line}: memory access out of bounds")]
  OutOfBounds {
    line: usize,
    #[source]
    source: memory::OutOfBounds,
  },

  #[error("failed to write program output")]
  Io(#[from] std::io::Error),
}

/// A recoverable problem. It is reported on the output and the run carries on
/// with the next instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
  /// `print` of a name that was never declared
  UndefinedVariable { name: String },
  /// An arithmetic operand or result that was never declared
  UnboundOperand { name: String },
  /// An arithmetic operand holding text
  NonIntegerOperand { name: String },
  DivisionByZero,
  Overflow,
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UndefinedVariable { name } => write!(f, "Undefined variable: {name}"),
      Self::UnboundOperand { name } => write!(f, "Error: Undefined variable: {name}"),
      Self::NonIntegerOperand { name } => write!(f, "Error: Non-integer operand: {name}"),
      Self::DivisionByZero => f.write_str("Error: Division by zero."),
      Self::Overflow => f.write_str("Error: Integer overflow."),
    }
  }
}

/// Executes a program once, top to bottom, against a fixed memory bank.
///
/// Variables are handed addresses in declaration order: the next address is
/// always the number of names bound so far, so an array only advances the
/// allocator by one even though it fills several cells. Nothing is ever freed.
///
/// Everything the program prints, diagnostics included, goes to `out`.
#[derive(Debug)]
pub struct Interpreter<W> {
  // index of the next instruction in the region
  ip: usize,
  memory: Memory,
  variables: HashMap<String, usize>,
  // set by `if`, flipped by `else`, never read by anything else
  pending_else: bool,
  diagnostics: Vec<Diagnostic>,
  state: State,
  out: W,
}

impl<W> Interpreter<W>
where
  W: Write,
{
  /// Create an interpreter over a zeroed bank of the default size
  pub fn new(out: W) -> Self {
    Self::with_memory(Memory::default(), out)
  }

  pub fn with_memory(memory: Memory, out: W) -> Self {
    Self {
      ip: 0,
      memory,
      variables: HashMap::new(),
      pending_else: false,
      diagnostics: Vec::new(),
      state: State::Active,
      out,
    }
  }

  /// Execute a single instruction. `Ok(None)` once the machine has halted,
  /// either by running off the end, by an earlier stop or by a fatal error.
  pub fn step<R>(&mut self, region: &R) -> Result<Option<()>, Error>
  where
    R: Region,
  {
    if let State::Halted(_) = self.state {
      return Ok(None);
    }
    let Some(line) = region.instructions().get(self.ip) else {
      self.state = State::Halted(Outcome::Completed);
      return Ok(None);
    };
    self.ip += 1;
    let number = line.number;
    debug!(line = number, instruction = ?line.instruction, "step");
    let result = Task::new(self, number).run(&line.instruction);
    if let Err(err) = result {
      self.state = State::Halted(Outcome::Failed { line: number });
      return Err(err);
    }
    Ok(Some(()))
  }

  /// Execute the whole region, stopping early on `sys out` or a zero `je`
  pub fn run<R>(&mut self, region: &R) -> Result<Outcome, Error>
  where
    R: Region,
  {
    info!(instructions = region.instructions().len(), "run started");
    while self.step(region)?.is_some() {}
    let outcome = self.outcome().unwrap_or(Outcome::Completed);
    info!(?outcome, "run finished");
    Ok(outcome)
  }

  pub fn into_output(self) -> W {
    self.out
  }
}

impl<W> Interpreter<W> {
  /// `None` while there is still something to execute
  pub fn outcome(&self) -> Option<Outcome> {
    match self.state {
      State::Active => None,
      State::Halted(outcome) => Some(outcome),
    }
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  pub fn address_of(&self, name: &str) -> Option<usize> {
    self.variables.get(name).copied()
  }

  /// Current content of a variable's cell
  pub fn value_of(&self, name: &str) -> Option<&Cell> {
    let address = self.address_of(name)?;
    self.memory.get(address).ok()
  }

  pub fn pending_else(&self) -> bool {
    self.pending_else
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  pub fn output(&self) -> &W {
    &self.out
  }
}

struct Task<'vm, W> {
  vm: &'vm mut Interpreter<W>,
  line: usize,
}

impl<'vm, W> Task<'vm, W>
where
  W: Write,
{
  fn new(vm: &'vm mut Interpreter<W>, line: usize) -> Self {
    Self { vm, line }
  }

  fn run(&mut self, instruction: &Instruction) -> Result<(), Error> {
    match instruction {
      Instruction::DeclareInt { name, value } => declare(self, name, Cell::from(*value))?,
      Instruction::DeclareBool { name, value } => declare(self, name, Cell::from(*value))?,
      Instruction::DeclareString { name, text } => declare(self, name, Cell::from(text.clone()))?,
      Instruction::DeclareArray { name, size } => declare_array(self, name, *size)?,
      Instruction::JumpIfZero { name, .. } => jump_if_zero(self, name)?,
      Instruction::If { name, .. } => if_(self, name)?,
      Instruction::Else => else_(self),
      Instruction::SysExit { code } => sys_exit(self, *code)?,
      Instruction::Move { src, dst } => move_(self, src, dst)?,
      Instruction::BinaryOp { kind, a, b, result } => binary_op(self, *kind, a, b, result)?,
      Instruction::Print(arg) => print(self, arg)?,
    }
    Ok(())
  }

  fn halt(&mut self, outcome: Outcome) {
    info!(line = self.line, ?outcome, "halting");
    self.vm.state = State::Halted(outcome);
  }

  /// Address of a name that must already be bound
  fn lookup(&self, name: &str) -> Result<usize, Error> {
    self
      .vm
      .address_of(name)
      .ok_or_else(|| Error::UndefinedVariable {
        line: self.line,
        name: name.to_owned(),
      })
  }

  fn read(&self, address: usize) -> Result<&Cell, Error> {
    self.vm.memory.get(address).map_err(|source| Error::OutOfBounds {
      line: self.line,
      source,
    })
  }

  fn write(&mut self, address: usize, value: Cell) -> Result<(), Error> {
    let line = self.line;
    self
      .vm
      .memory
      .set(address, value)
      .map_err(|source| Error::OutOfBounds { line, source })
  }

  fn emit(&mut self, text: impl fmt::Display) -> Result<(), Error> {
    writeln!(self.vm.out, "{text}")?;
    Ok(())
  }

  fn report(&mut self, diagnostic: Diagnostic) -> Result<(), Error> {
    debug!(line = self.line, "{diagnostic}");
    self.emit(&diagnostic)?;
    self.vm.diagnostics.push(diagnostic);
    Ok(())
  }
}

// m[next] ← v; t[x] ← next
fn declare<W: Write>(task: &mut Task<'_, W>, name: &str, value: Cell) -> Result<(), Error> {
  let address = task.vm.variables.len();
  task.write(address, value)?;
  task.vm.variables.insert(name.to_owned(), address);
  Ok(())
}

// m[next..next+n] ← 0; t[x] ← next
fn declare_array<W: Write>(task: &mut Task<'_, W>, name: &str, size: usize) -> Result<(), Error> {
  let base = task.vm.variables.len();
  for offset in 0..size {
    task.write(base + offset, Cell::default())?;
  }
  task.vm.variables.insert(name.to_owned(), base);
  Ok(())
}

// if m[t[x]] == 0 : (stop run)
fn jump_if_zero<W: Write>(task: &mut Task<'_, W>, name: &str) -> Result<(), Error> {
  let address = task.lookup(name)?;
  let zero = !task.read(address)?.is_truthy();
  if zero {
    let line = task.line;
    task.halt(Outcome::Stopped { line });
  }
  Ok(())
}

// flag ← m[t[x]] == 0
fn if_<W: Write>(task: &mut Task<'_, W>, name: &str) -> Result<(), Error> {
  let address = task.lookup(name)?;
  let zero = !task.read(address)?.is_truthy();
  task.vm.pending_else = zero;
  Ok(())
}

// flag ← ¬flag
fn else_<W: Write>(task: &mut Task<'_, W>) {
  task.vm.pending_else = !task.vm.pending_else;
}

fn sys_exit<W: Write>(task: &mut Task<'_, W>, code: i64) -> Result<(), Error> {
  task.emit(format_args!("Exit with code {code}"))?;
  task.halt(Outcome::Exited(code));
  Ok(())
}

// m[t[d]] ← m[t[s]]
fn move_<W: Write>(task: &mut Task<'_, W>, src: &str, dst: &str) -> Result<(), Error> {
  let from = task.lookup(src)?;
  let to = task.lookup(dst)?;
  let value = task.read(from)?.clone();
  task.write(to, value)
}

// m[t[r]] ← m[t[a]] op m[t[b]]
fn binary_op<W: Write>(
  task: &mut Task<'_, W>,
  kind: BinaryKind,
  a: &str,
  b: &str,
  result: &str,
) -> Result<(), Error> {
  let mut addresses = [0; 3];
  for (slot, name) in addresses.iter_mut().zip([a, b, result]) {
    match task.vm.address_of(name) {
      Some(address) => *slot = address,
      None => {
        return task.report(Diagnostic::UnboundOperand {
          name: name.to_owned(),
        })
      }
    }
  }
  let [x, y, target] = addresses;

  let mut operands = [0; 2];
  for (slot, (address, name)) in operands.iter_mut().zip([(x, a), (y, b)]) {
    let value = task.read(address)?.as_int();
    match value {
      Some(value) => *slot = value,
      None => {
        return task.report(Diagnostic::NonIntegerOperand {
          name: name.to_owned(),
        })
      }
    }
  }
  let [lhs, rhs] = operands;

  if kind == BinaryKind::Dev && rhs == 0 {
    return task.report(Diagnostic::DivisionByZero);
  }
  match kind.apply(lhs, rhs) {
    Some(value) => task.write(target, Cell::Int(value)),
    None => task.report(Diagnostic::Overflow),
  }
}

// (print "text") ∨ (print m[t[x]])
fn print<W: Write>(task: &mut Task<'_, W>, arg: &PrintArg) -> Result<(), Error> {
  match arg {
    PrintArg::Literal(text) => task.emit(text),
    PrintArg::Name(name) => match task.vm.address_of(name) {
      Some(address) => {
        let value = task.read(address)?.clone();
        task.emit(value)
      }
      None => task.report(Diagnostic::UndefinedVariable {
        name: name.to_owned(),
      }),
    },
  }
}
