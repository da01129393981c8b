use std::fmt;

/// Number of cells in a freshly created bank
pub const DEFAULT_SIZE: usize = 256;

/// The content of a single memory slot.
///
/// Cells are untyped storage: a declaration decides how the value is produced,
/// the cell does not remember it. Booleans are lowered to `Int(0)`/`Int(1)`
/// before they get here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
  Int(i64),
  Text(String),
}

impl Cell {
  /// Integer content, if any
  pub fn as_int(&self) -> Option<i64> {
    match self {
      Cell::Int(v) => Some(*v),
      Cell::Text(_) => None,
    }
  }

  /// Whether a guard reading this cell passes
  pub fn is_truthy(&self) -> bool {
    match self {
      Cell::Int(v) => *v != 0,
      Cell::Text(s) => !s.is_empty(),
    }
  }
}

impl Default for Cell {
  fn default() -> Self {
    Cell::Int(0)
  }
}

impl From<i64> for Cell {
  fn from(value: i64) -> Self {
    Cell::Int(value)
  }
}

impl From<bool> for Cell {
  fn from(value: bool) -> Self {
    Cell::Int(value as i64)
  }
}

impl From<String> for Cell {
  fn from(value: String) -> Self {
    Cell::Text(value)
  }
}

impl fmt::Display for Cell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Cell::Int(v) => write!(f, "{v}"),
      Cell::Text(s) => f.write_str(s),
    }
  }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("address {address} is out of bounds for memory of size {size}")]
pub struct OutOfBounds {
  pub address: usize,
  pub size: usize,
}

/// A fixed-size bank of cells, zeroed on creation. It never grows.
#[derive(Debug, Clone)]
pub struct Memory {
  cells: Vec<Cell>,
}

impl Memory {
  pub fn new(size: usize) -> Self {
    Self {
      cells: vec![Cell::default(); size],
    }
  }

  pub fn size(&self) -> usize {
    self.cells.len()
  }

  pub fn get(&self, address: usize) -> Result<&Cell, OutOfBounds> {
    self.cells.get(address).ok_or(OutOfBounds {
      address,
      size: self.cells.len(),
    })
  }

  /// Overwrite a cell, whatever it held before
  pub fn set(&mut self, address: usize, value: impl Into<Cell>) -> Result<(), OutOfBounds> {
    let size = self.cells.len();
    self
      .cells
      .get_mut(address)
      .map(|prev| {
        *prev = value.into();
      })
      .ok_or(OutOfBounds { address, size })
  }
}

impl Default for Memory {
  fn default() -> Self {
    Self::new(DEFAULT_SIZE)
  }
}
