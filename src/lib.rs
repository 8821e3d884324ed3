//! Crate root: wires together the compilation pipeline.
//!
//! - `tokenizer` performs lexical analysis and produces a flat token stream.
//! - `parser` owns all syntactic knowledge and returns a [`ast::Program`]:
//!   one tree per statement plus the locals they reference.
//! - `locals` assigns frame slots to variable names.
//! - `codegen` lowers the program into x86-64 Intel-syntax assembly.
//! - `error` holds the diagnostics shared by the other modules.
//!
//! Each stage runs to completion before the next one starts.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod locals;
pub mod parser;
pub mod tokenizer;

pub use ast::Program;
pub use error::{CompileError, CompileResult, ErrorKind};

/// Run the front end only: tokenize and parse `source`.
pub fn compile(source: &str) -> CompileResult<Program> {
  let tokens = tokenizer::tokenize(source)?;
  parser::parse(tokens, source)
}

/// Compile a source string into a complete assembly listing.
pub fn generate_assembly(source: &str) -> CompileResult<String> {
  let program = compile(source)?;
  Ok(codegen::generate(&program))
}
