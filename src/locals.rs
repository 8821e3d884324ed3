//! Local variable table.
//!
//! Every name seen anywhere in the program lives in one flat namespace and
//! gets a slot below `rbp` the first time it is referenced.

use log::trace;

/// Size in bytes of one frame slot.
pub const SLOT_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVar {
  pub name: char,
  /// Distance below the frame base; always a positive multiple of 8.
  pub offset: usize,
}

/// Local variables in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Locals {
  vars: Vec<LocalVar>,
}

impl Locals {
  pub fn new() -> Self {
    Self::default()
  }

  /// Return the frame offset for `name`, allocating the next slot on first use.
  pub fn resolve(&mut self, name: char) -> usize {
    if let Some(var) = self.find(name) {
      return var.offset;
    }

    let offset = self.vars.last().map_or(0, |var| var.offset) + SLOT_SIZE;
    trace!("allocated local '{name}' at offset {offset}");
    self.vars.push(LocalVar { name, offset });
    offset
  }

  fn find(&self, name: char) -> Option<&LocalVar> {
    self.vars.iter().find(|var| var.name == name)
  }

  pub fn len(&self) -> usize {
    self.vars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }
}
