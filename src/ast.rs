//! Syntax tree storage.
//!
//! Nodes for one compilation live in a single [`Ast`] arena and refer to
//! their children by [`NodeId`]. The tree is built bottom-up by the parser
//! and only read afterwards.

use std::ops::Index;

use crate::locals::Locals;

/// Binary operators after parsing. `>` and `>=` never appear here: the
/// parser swaps their operands into `Lt`/`Le`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Lt,
  Le,
  Eq,
  Ne,
  Assign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Num(i64),
  /// A local variable, identified by its frame offset.
  Var(usize),
  Binary {
    op: BinaryOp,
    lhs: NodeId,
    rhs: NodeId,
  },
}

#[derive(Debug, Clone, Default)]
pub struct Ast {
  nodes: Vec<Node>,
}

impl Ast {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn push(&mut self, node: Node) -> NodeId {
    self.nodes.push(node);
    NodeId(self.nodes.len() - 1)
  }

  pub(crate) fn num(&mut self, value: i64) -> NodeId {
    self.push(Node::Num(value))
  }

  pub(crate) fn var(&mut self, offset: usize) -> NodeId {
    self.push(Node::Var(offset))
  }

  pub(crate) fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> NodeId {
    self.push(Node::Binary { op, lhs, rhs })
  }

  pub(crate) fn is_var(&self, id: NodeId) -> bool {
    matches!(self[id], Node::Var(_))
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }
}

impl Index<NodeId> for Ast {
  type Output = Node;

  fn index(&self, NodeId(index): NodeId) -> &Node {
    &self.nodes[index]
  }
}

/// Everything the code generator needs: the node arena, one root per
/// statement in source order, and the locals those statements touch.
///
/// Only the parser builds a non-empty `Program`, so every assignment in it
/// targets a variable.
#[derive(Debug, Clone, Default)]
pub struct Program {
  pub(crate) ast: Ast,
  pub(crate) stmts: Vec<NodeId>,
  pub(crate) locals: Locals,
}

impl Program {
  pub fn stmt_count(&self) -> usize {
    self.stmts.len()
  }

  pub fn local_count(&self) -> usize {
    self.locals.len()
  }

  /// Each statement rendered by [`Program::dump`], in source order.
  pub fn dump_stmts(&self) -> Vec<String> {
    self.stmts.iter().map(|&id| self.dump(id)).collect()
  }

  /// Render a node as a fully parenthesised s-expression, mostly for tests
  /// and debug logging. Variables print by frame offset, e.g. `(= @8 3)`.
  pub(crate) fn dump(&self, id: NodeId) -> String {
    match &self.ast[id] {
      Node::Num(value) => value.to_string(),
      Node::Var(offset) => format!("@{offset}"),
      Node::Binary { op, lhs, rhs } => {
        format!("({} {} {})", op.symbol(), self.dump(*lhs), self.dump(*rhs))
      }
    }
  }
}

impl BinaryOp {
  pub fn symbol(self) -> &'static str {
    match self {
      BinaryOp::Add => "+",
      BinaryOp::Sub => "-",
      BinaryOp::Mul => "*",
      BinaryOp::Div => "/",
      BinaryOp::Lt => "<",
      BinaryOp::Le => "<=",
      BinaryOp::Eq => "==",
      BinaryOp::Ne => "!=",
      BinaryOp::Assign => "=",
    }
  }
}
