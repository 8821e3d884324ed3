//! Recursive-descent parser producing a statement list and expression AST.
//!
//! One helper per precedence level, loosest first:
//!
//! ```text
//! program    = stmt* EOF
//! stmt       = expr ";"
//! expr       = assign
//! assign     = equality ("=" assign)?
//! equality   = relational ("==" relational | "!=" relational)*
//! relational = add ("<" add | "<=" add | ">" add | ">=" add)*
//! add        = mul ("+" mul | "-" mul)*
//! mul        = unary ("*" unary | "/" unary)*
//! unary      = ("+" | "-")? primary
//! primary    = "(" expr ")" | ident | num
//! ```
//!
//! All parsing state (token cursor, node arena, locals) lives in a [`Parser`]
//! value threaded through the helpers.

use log::{debug, trace};

use crate::ast::{Ast, BinaryOp, NodeId, Program};
use crate::error::{CompileError, CompileResult, ErrorKind};
use crate::locals::Locals;
use crate::tokenizer::{Token, TokenKind, describe_token, token_text};

/// A binary operator as written, plus whether its operands are swapped
/// before building the node.
struct OpSpelling {
  text: &'static str,
  op: BinaryOp,
  swap: bool,
}

const fn spelled(text: &'static str, op: BinaryOp) -> OpSpelling {
  OpSpelling {
    text,
    op,
    swap: false,
  }
}

const fn swapped(text: &'static str, op: BinaryOp) -> OpSpelling {
  OpSpelling {
    text,
    op,
    swap: true,
  }
}

const EQUALITY_OPS: &[OpSpelling] = &[spelled("==", BinaryOp::Eq), spelled("!=", BinaryOp::Ne)];

// `a > b` is `b < a` and `a >= b` is `b <= a`.
const RELATIONAL_OPS: &[OpSpelling] = &[
  spelled("<", BinaryOp::Lt),
  spelled("<=", BinaryOp::Le),
  swapped(">", BinaryOp::Lt),
  swapped(">=", BinaryOp::Le),
];

const ADD_OPS: &[OpSpelling] = &[spelled("+", BinaryOp::Add), spelled("-", BinaryOp::Sub)];

const MUL_OPS: &[OpSpelling] = &[spelled("*", BinaryOp::Mul), spelled("/", BinaryOp::Div)];

/// Deepest run of open parentheses and chained `=` accepted in one expression.
/// Each level costs about a dozen stack frames, so this stays well inside a
/// 2 MiB thread stack even in debug builds.
pub const MAX_NESTING: usize = 200;

/// Parse a whole program from the token stream.
pub fn parse(tokens: Vec<Token>, source: &str) -> CompileResult<Program> {
  let mut parser = Parser::new(tokens, source);
  let mut stmts = Vec::new();

  while !parser.is_eof() {
    stmts.push(parse_stmt(&mut parser)?);
  }

  let Parser { ast, locals, .. } = parser;
  let program = Program { ast, stmts, locals };
  debug!(
    "parsed {} statements ({} nodes, {} locals)",
    program.stmt_count(),
    program.ast.len(),
    program.local_count()
  );
  if log::log_enabled!(log::Level::Trace) {
    for stmt in program.dump_stmts() {
      trace!("stmt {stmt}");
    }
  }
  Ok(program)
}

fn parse_stmt(parser: &mut Parser) -> CompileResult<NodeId> {
  let node = parse_expr(parser)?;
  parser.skip(";")?;
  Ok(node)
}

fn parse_expr(parser: &mut Parser) -> CompileResult<NodeId> {
  parse_assign(parser)
}

fn parse_assign(parser: &mut Parser) -> CompileResult<NodeId> {
  let node = parse_equality(parser)?;

  let assign_loc = parser.peek().loc;
  if parser.equal("=") {
    if !parser.ast.is_var(node) {
      return Err(CompileError::at(
        parser.source,
        assign_loc,
        ErrorKind::NotAssignable,
      ));
    }
    let rhs = parser.nested(assign_loc, parse_assign)?;
    return Ok(parser.ast.binary(BinaryOp::Assign, node, rhs));
  }

  Ok(node)
}

fn parse_equality(parser: &mut Parser) -> CompileResult<NodeId> {
  parse_left_assoc(parser, EQUALITY_OPS, parse_relational)
}

fn parse_relational(parser: &mut Parser) -> CompileResult<NodeId> {
  parse_left_assoc(parser, RELATIONAL_OPS, parse_add)
}

fn parse_add(parser: &mut Parser) -> CompileResult<NodeId> {
  parse_left_assoc(parser, ADD_OPS, parse_mul)
}

fn parse_mul(parser: &mut Parser) -> CompileResult<NodeId> {
  parse_left_assoc(parser, MUL_OPS, parse_unary)
}

/// Fold `operand (op operand)*` to the left.
fn parse_left_assoc(
  parser: &mut Parser,
  ops: &[OpSpelling],
  operand: fn(&mut Parser) -> CompileResult<NodeId>,
) -> CompileResult<NodeId> {
  let mut node = operand(parser)?;

  while let Some(spelling) = ops.iter().find(|spelling| parser.equal(spelling.text)) {
    let rhs = operand(parser)?;
    node = if spelling.swap {
      parser.ast.binary(spelling.op, rhs, node)
    } else {
      parser.ast.binary(spelling.op, node, rhs)
    };
  }

  Ok(node)
}

fn parse_unary(parser: &mut Parser) -> CompileResult<NodeId> {
  if parser.equal("+") {
    return parse_primary(parser);
  }

  if parser.equal("-") {
    let zero = parser.ast.num(0);
    let operand = parse_primary(parser)?;
    return Ok(parser.ast.binary(BinaryOp::Sub, zero, operand));
  }

  parse_primary(parser)
}

fn parse_primary(parser: &mut Parser) -> CompileResult<NodeId> {
  let open_loc = parser.peek().loc;
  if parser.equal("(") {
    let node = parser.nested(open_loc, parse_expr)?;
    parser.skip(")")?;
    return Ok(node);
  }

  if let Some(name) = parser.get_ident() {
    let offset = parser.locals.resolve(name);
    return Ok(parser.ast.var(offset));
  }

  let value = parser.get_number()?;
  Ok(parser.ast.num(value))
}

/// Parsing context: a cursor over the token vector plus everything the
/// parse builds up.
struct Parser<'a> {
  tokens: Vec<Token>,
  source: &'a str,
  pos: usize,
  depth: usize,
  ast: Ast,
  locals: Locals,
}

impl<'a> Parser<'a> {
  /// `tokens` must end with an `Eof` token, as produced by `tokenize`.
  fn new(tokens: Vec<Token>, source: &'a str) -> Self {
    Self {
      tokens,
      source,
      pos: 0,
      depth: 0,
      ast: Ast::new(),
      locals: Locals::new(),
    }
  }

  /// Current token. The cursor never moves past `Eof`, so this always exists
  /// for a well-formed stream; a stream without `Eof` reads as ending here.
  fn peek(&self) -> Token {
    self
      .tokens
      .get(self.pos)
      .cloned()
      .unwrap_or(Token {
        kind: TokenKind::Eof,
        value: None,
        loc: self.source.len(),
        len: 0,
      })
  }

  /// Run `parse` one nesting level deeper, failing at `loc` past [`MAX_NESTING`].
  fn nested(
    &mut self,
    loc: usize,
    parse: fn(&mut Parser) -> CompileResult<NodeId>,
  ) -> CompileResult<NodeId> {
    if self.depth >= MAX_NESTING {
      return Err(CompileError::at(
        self.source,
        loc,
        ErrorKind::TooDeep { limit: MAX_NESTING },
      ));
    }

    self.depth += 1;
    let result = parse(self);
    self.depth -= 1;
    result
  }

  fn advance(&mut self) {
    if self.peek().kind != TokenKind::Eof {
      self.pos += 1;
    }
  }

  /// Consume the current token if it is the punctuator `op`.
  fn equal(&mut self, op: &str) -> bool {
    let token = self.peek();
    if token.kind == TokenKind::Punctuator && token_text(&token, self.source) == op {
      self.advance();
      return true;
    }
    false
  }

  /// Consume the punctuator `op` or fail pointing at whatever is there instead.
  fn skip(&mut self, op: &str) -> CompileResult<()> {
    if self.equal(op) {
      return Ok(());
    }

    let token = self.peek();
    Err(CompileError::at(
      self.source,
      token.loc,
      ErrorKind::Expected {
        expected: op.to_string(),
        found: describe_token(&token, self.source),
      },
    ))
  }

  fn get_number(&mut self) -> CompileResult<i64> {
    let token = self.peek();
    match (token.kind, token.value) {
      (TokenKind::Num, Some(value)) => {
        self.advance();
        Ok(value)
      }
      _ => Err(CompileError::at(
        self.source,
        token.loc,
        ErrorKind::NumberExpected {
          found: describe_token(&token, self.source),
        },
      )),
    }
  }

  /// Consume an identifier if one is next.
  fn get_ident(&mut self) -> Option<char> {
    let token = self.peek();
    if token.kind != TokenKind::Ident {
      return None;
    }
    let name = token_text(&token, self.source).chars().next()?;
    self.advance();
    Some(name)
  }

  fn is_eof(&self) -> bool {
    self.peek().kind == TokenKind::Eof
  }
}
