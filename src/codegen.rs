//! Code generation: lower the parsed program into Intel-syntax x86-64 assembly.
//!
//! The emitter is a plain stack machine. Every expression leaves exactly one
//! value on the hardware stack; each statement's leftover value is popped
//! into `rax` before the next one starts, so the last statement's value ends
//! up as the return value of `main`. Locals live below `rbp`.

use log::debug;

use crate::ast::{BinaryOp, Node, NodeId, Program};
use crate::locals::SLOT_SIZE;

/// Slots reserved in every frame, one per possible variable name.
pub const FRAME_SLOTS: usize = 26;

/// Bytes reserved below `rbp` for locals.
pub const FRAME_SIZE: usize = FRAME_SLOTS * SLOT_SIZE;

/// Emit the complete listing for `program`, prologue and epilogue included.
pub fn generate(program: &Program) -> String {
  let mut asm = Asm::default();
  asm.directive(".intel_syntax noprefix");
  asm.directive(".globl main");
  asm.label("main");
  asm.ins("push rbp");
  asm.ins("mov rbp, rsp");
  asm.ins(format!("sub rsp, {FRAME_SIZE}"));

  asm.lines.extend(generate_body(program));

  if program.stmts.is_empty() {
    asm.ins("mov rax, 0");
  }
  asm.ins("mov rsp, rbp");
  asm.ins("pop rbp");
  asm.ins("ret");

  debug!("emitted {} lines of assembly", asm.lines.len());
  asm.into_text()
}

/// Emit the instruction lines for every statement, each followed by the pop
/// that discards its value into `rax`.
pub fn generate_body(program: &Program) -> Vec<String> {
  let mut asm = Asm::default();
  for &stmt in &program.stmts {
    emit_expr(program, stmt, &mut asm);
    asm.ins("pop rax");
  }
  asm.lines
}

/// Push the value of `id`.
fn emit_expr(program: &Program, id: NodeId, asm: &mut Asm) {
  match program.ast[id] {
    Node::Num(value) => {
      // `push imm` only takes 32 bits, so go through a register.
      asm.ins(format!("mov rax, {value}"));
      asm.ins("push rax");
    }
    Node::Var(offset) => {
      emit_addr(offset, asm);
      asm.ins("pop rax");
      asm.ins("mov rax, [rax]");
      asm.ins("push rax");
    }
    Node::Binary {
      op: BinaryOp::Assign,
      lhs,
      rhs,
    } => {
      let Node::Var(offset) = program.ast[lhs] else {
        unreachable!("parser only builds assignments to variables");
      };
      emit_addr(offset, asm);
      emit_expr(program, rhs, asm);
      asm.ins("pop rdi");
      asm.ins("pop rax");
      asm.ins("mov [rax], rdi");
      asm.ins("push rdi");
    }
    Node::Binary { op, lhs, rhs } => {
      emit_expr(program, lhs, asm);
      emit_expr(program, rhs, asm);
      asm.ins("pop rdi");
      asm.ins("pop rax");
      emit_binary(op, asm);
      asm.ins("push rax");
    }
  }
}

/// Push the address of the local at `offset`.
fn emit_addr(offset: usize, asm: &mut Asm) {
  asm.ins(format!("lea rax, [rbp-{offset}]"));
  asm.ins("push rax");
}

/// Combine `rax` (left) and `rdi` (right) into `rax`.
fn emit_binary(op: BinaryOp, asm: &mut Asm) {
  let set = match op {
    BinaryOp::Add => return asm.ins("add rax, rdi"),
    BinaryOp::Sub => return asm.ins("sub rax, rdi"),
    BinaryOp::Mul => return asm.ins("imul rax, rdi"),
    BinaryOp::Div => {
      asm.ins("cqo");
      return asm.ins("idiv rdi");
    }
    BinaryOp::Eq => "sete",
    BinaryOp::Ne => "setne",
    BinaryOp::Lt => "setl",
    BinaryOp::Le => "setle",
    BinaryOp::Assign => unreachable!("assignment is lowered separately"),
  };

  asm.ins("cmp rax, rdi");
  asm.ins(format!("{set} al"));
  asm.ins("movzb rax, al");
}

/// Accumulated assembly lines.
#[derive(Debug, Default)]
struct Asm {
  lines: Vec<String>,
}

impl Asm {
  fn ins(&mut self, text: impl AsRef<str>) {
    self.lines.push(format!("    {}", text.as_ref()));
  }

  fn directive(&mut self, text: &str) {
    self.lines.push(text.to_string());
  }

  fn label(&mut self, name: &str) {
    self.lines.push(format!("{name}:"));
  }

  fn into_text(self) -> String {
    let mut text = self.lines.join("\n");
    text.push('\n');
    text
  }
}
