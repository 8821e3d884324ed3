//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer knows nothing about the grammar beyond the shape of each
//! lexeme. Two-character punctuators are tried before single-character ones
//! so `<=` never lexes as `<` followed by `=`.

use log::debug;
use snafu::ResultExt;

use crate::error::{CompileError, CompileResult, ErrorKind, NumberOutOfRangeSnafu};

const TWO_CHAR_PUNCTUATORS: [&str; 4] = ["<=", ">=", "==", "!="];
const ONE_CHAR_PUNCTUATORS: &[u8] = b"+-*/()<>;=";

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Punctuator,
  Ident,
  Num,
  Eof,
}

/// A classified slice of the input. `loc` and `len` are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub value: Option<i64>,
  pub loc: usize,
  pub len: usize,
}

impl Token {
  fn punct(loc: usize, len: usize) -> Self {
    Self {
      kind: TokenKind::Punctuator,
      value: None,
      loc,
      len,
    }
  }

  fn ident(loc: usize) -> Self {
    Self {
      kind: TokenKind::Ident,
      value: None,
      loc,
      len: 1,
    }
  }

  fn num(loc: usize, len: usize, value: i64) -> Self {
    Self {
      kind: TokenKind::Num,
      value: Some(value),
      loc,
      len,
    }
  }

  fn eof(loc: usize) -> Self {
    Self {
      kind: TokenKind::Eof,
      value: None,
      loc,
      len: 0,
    }
  }
}

/// Lex the input into a flat vector of tokens terminated by a single `Eof`.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];
    if c.is_ascii_whitespace() {
      i += 1;
      continue;
    }

    if let Some(op) = TWO_CHAR_PUNCTUATORS
      .into_iter()
      .find(|op| input[i..].starts_with(op))
    {
      tokens.push(Token::punct(i, op.len()));
      i += op.len();
      continue;
    }

    if c.is_ascii_lowercase() {
      tokens.push(Token::ident(i));
      i += 1;
      continue;
    }

    if ONE_CHAR_PUNCTUATORS.contains(&c) {
      tokens.push(Token::punct(i, 1));
      i += 1;
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      let text = &input[start..i];
      let value = text
        .parse::<i64>()
        .context(NumberOutOfRangeSnafu { text })
        .map_err(|kind| CompileError::at(input, start, kind))?;
      tokens.push(Token::num(start, i - start, value));
      continue;
    }

    // `i` only ever advances over ASCII, so it sits on a char boundary.
    let found = input[i..].chars().next().unwrap_or('\0');
    return Err(CompileError::at(input, i, ErrorKind::UnexpectedChar { found }));
  }

  tokens.push(Token::eof(input.len()));
  debug!("tokenized {} bytes into {} tokens", input.len(), tokens.len());
  Ok(tokens)
}

/// Return the slice from the source that produced this token.
pub fn token_text<'a>(token: &Token, source: &'a str) -> &'a str {
  &source[token.loc..token.loc + token.len]
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: &Token, source: &str) -> String {
  match token.kind {
    TokenKind::Eof => "EOF".to_string(),
    _ => token_text(token, source).to_string(),
  }
}
