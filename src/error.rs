//! Diagnostics shared by every stage of the pipeline.
//!
//! Each failure is fatal and anchored at a byte offset in the original
//! input. Rendering follows the usual caret layout: the quoted input on one
//! line, a `^` under the offending character on the next.

use std::num::ParseIntError;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

/// What went wrong, independent of where.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ErrorKind {
  #[snafu(display("invalid token: '{found}'"))]
  UnexpectedChar { found: char },

  #[snafu(display("expected \"{expected}\", but got \"{found}\""))]
  Expected { expected: String, found: String },

  #[snafu(display("expected a number, but got \"{found}\""))]
  NumberExpected { found: String },

  #[snafu(display("number literal {text} does not fit in 64 bits"))]
  NumberOutOfRange { text: String, source: ParseIntError },

  #[snafu(display("left-hand side of assignment is not a variable"))]
  NotAssignable,

  #[snafu(display("expression nests deeper than {limit} levels"))]
  TooDeep { limit: usize },
}

#[derive(Debug, Snafu)]
pub enum CompileError {
  #[snafu(display("{}\n{}^ {kind}", quoted(input), marker(input, *loc)))]
  WithLocation {
    input: String,
    loc: usize,
    #[snafu(source)]
    kind: ErrorKind,
  },
}

impl CompileError {
  /// Construct an error anchored at a specific byte offset in the source.
  pub fn at(input: &str, loc: usize, kind: ErrorKind) -> Self {
    Self::WithLocation {
      input: input.to_string(),
      loc: loc.min(input.len()),
      kind,
    }
  }

  /// Byte offset of the offending character or token.
  pub fn loc(&self) -> usize {
    let Self::WithLocation { loc, .. } = self;
    *loc
  }

  pub fn kind(&self) -> &ErrorKind {
    let Self::WithLocation { kind, .. } = self;
    kind
  }
}

fn quoted(input: &str) -> String {
  format!("'{input}'")
}

fn marker(input: &str, loc: usize) -> String {
  let loc = floor_char_boundary(input, loc);
  // One extra column for the opening quote.
  let column = input[..loc].chars().count() + 1;
  " ".repeat(column)
}

fn floor_char_boundary(input: &str, mut loc: usize) -> usize {
  while !input.is_char_boundary(loc) {
    loc -= 1;
  }
  loc
}
