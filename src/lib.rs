//! Interpreter for `.kaf` scripts
//!
//! A script is one instruction per line, working on a flat bank of 256 cells.
//! Variables get addresses in the order they are declared and are never
//! freed. There are no loops or jumps: `je` and `sys out` can only stop the
//! run early.
//!
//! ```text
//! int a 6
//! int b 3
//! int c 0
//! dev a b c
//! print c
//! sys out 0
//! ```

pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod parser;
pub mod region;

use std::io::Write;

use interpreter::{Interpreter, Outcome};

/// An error from either stage of running a script
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error(transparent)]
  Parse(#[from] parser::Error),

  #[error(transparent)]
  Runtime(#[from] interpreter::Error),
}

/// Parse `source` and run it against a fresh default-sized memory, writing
/// everything the script prints to `out`
pub fn run_source<W>(source: &str, out: W) -> Result<Outcome, Error>
where
  W: Write,
{
  let program = parser::parse(source)?;
  let mut vm = Interpreter::new(out);
  Ok(vm.run(&program)?)
}
