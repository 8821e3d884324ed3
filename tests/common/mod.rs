//! A tiny interpreter for the instruction subset `stackcc` emits, so the
//! generated listings can be checked without an assembler.

use std::collections::HashMap;

const STACK_TOP: i64 = 0x10_0000;

/// Result of running a listing up to its `ret`.
#[derive(Debug)]
pub struct Outcome {
  /// Value of `rax` at `ret`.
  pub value: i64,
  /// Bytes between `rsp` and `rbp` right before the frame is torn down.
  pub depth_at_epilogue: i64,
}

#[derive(Debug, Clone, Copy)]
enum Operand<'a> {
  Reg(&'a str),
  Imm(i64),
  Mem { base: &'a str, disp: i64 },
}

fn operand(text: &str) -> Operand<'_> {
  if let Some(inner) = text.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
    return match inner.split_once('-') {
      Some((base, disp)) => Operand::Mem {
        base,
        disp: -disp.parse::<i64>().unwrap(),
      },
      None => Operand::Mem {
        base: inner,
        disp: 0,
      },
    };
  }

  match text.parse::<i64>() {
    Ok(value) => Operand::Imm(value),
    Err(_) => Operand::Reg(text),
  }
}

#[derive(Default)]
struct Machine {
  regs: HashMap<String, i64>,
  memory: HashMap<i64, i64>,
  flags: (i64, i64),
  depth_at_epilogue: Option<i64>,
}

impl Machine {
  fn reg(&self, name: &str) -> i64 {
    self.regs.get(name).copied().unwrap_or(0)
  }

  fn set(&mut self, name: &str, value: i64) {
    self.regs.insert(name.to_string(), value);
  }

  fn address(&self, base: &str, disp: i64) -> i64 {
    self.reg(base) + disp
  }

  fn read(&self, op: Operand) -> i64 {
    match op {
      Operand::Reg(name) => self.reg(name),
      Operand::Imm(value) => value,
      Operand::Mem { base, disp } => {
        let addr = self.address(base, disp);
        self.memory.get(&addr).copied().unwrap_or(0)
      }
    }
  }

  fn push(&mut self, value: i64) {
    let rsp = self.reg("rsp") - 8;
    self.set("rsp", rsp);
    self.memory.insert(rsp, value);
  }

  fn pop(&mut self) -> i64 {
    let rsp = self.reg("rsp");
    assert!(rsp < STACK_TOP, "stack underflow");
    let value = self.memory.get(&rsp).copied().unwrap_or(0);
    self.set("rsp", rsp + 8);
    value
  }

  fn set_al(&mut self, bit: bool) {
    let rax = self.reg("rax") & !0xff;
    self.set("rax", rax | i64::from(bit));
  }
}

/// Execute `asm` from `main:` to `ret`.
pub fn run(asm: &str) -> Outcome {
  let mut m = Machine::default();
  m.set("rsp", STACK_TOP);

  for line in asm.lines().map(str::trim) {
    if line.is_empty() || line.starts_with('.') || line.ends_with(':') {
      continue;
    }

    let (op, rest) = line.split_once(' ').unwrap_or((line, ""));
    let args: Vec<Operand> = rest
      .split(", ")
      .filter(|arg| !arg.is_empty())
      .map(operand)
      .collect();

    match (op, args.as_slice()) {
      ("push", [src]) => {
        let value = m.read(*src);
        m.push(value);
      }
      ("pop", [Operand::Reg(dst)]) => {
        let value = m.pop();
        m.set(dst, value);
      }
      ("mov", [Operand::Reg("rsp"), Operand::Reg("rbp")]) => {
        m.depth_at_epilogue = Some(m.reg("rbp") - m.reg("rsp"));
        let rbp = m.reg("rbp");
        m.set("rsp", rbp);
      }
      ("mov", [Operand::Reg(dst), src]) => {
        let value = m.read(*src);
        m.set(dst, value);
      }
      ("mov", [Operand::Mem { base, disp }, src]) => {
        let addr = m.address(base, *disp);
        let value = m.read(*src);
        m.memory.insert(addr, value);
      }
      ("lea", [Operand::Reg(dst), Operand::Mem { base, disp }]) => {
        let addr = m.address(base, *disp);
        m.set(dst, addr);
      }
      ("add", [Operand::Reg(dst), src]) => {
        let value = m.reg(dst).wrapping_add(m.read(*src));
        m.set(dst, value);
      }
      ("sub", [Operand::Reg(dst), src]) => {
        let value = m.reg(dst).wrapping_sub(m.read(*src));
        m.set(dst, value);
      }
      ("imul", [Operand::Reg(dst), src]) => {
        let value = m.reg(dst).wrapping_mul(m.read(*src));
        m.set(dst, value);
      }
      ("cqo", []) => {}
      ("idiv", [src]) => {
        let divisor = m.read(*src);
        assert_ne!(divisor, 0, "division by zero");
        let value = m.reg("rax").wrapping_div(divisor);
        m.set("rax", value);
      }
      ("cmp", [lhs, rhs]) => m.flags = (m.read(*lhs), m.read(*rhs)),
      ("sete", [Operand::Reg("al")]) => m.set_al(m.flags.0 == m.flags.1),
      ("setne", [Operand::Reg("al")]) => m.set_al(m.flags.0 != m.flags.1),
      ("setl", [Operand::Reg("al")]) => m.set_al(m.flags.0 < m.flags.1),
      ("setle", [Operand::Reg("al")]) => m.set_al(m.flags.0 <= m.flags.1),
      ("movzb", [Operand::Reg(dst), Operand::Reg("al")]) => {
        let value = m.reg("rax") & 0xff;
        m.set(dst, value);
      }
      ("ret", []) => {
        assert_eq!(m.reg("rsp"), STACK_TOP, "unbalanced stack at ret");
        return Outcome {
          value: m.reg("rax"),
          depth_at_epilogue: m.depth_at_epilogue.expect("epilogue restores rsp"),
        };
      }
      _ => panic!("unsupported instruction: {line}"),
    }
  }

  panic!("listing never returned");
}

/// Compile `source` and run it, returning `main`'s result.
pub fn eval(source: &str) -> i64 {
  let asm = stackcc::generate_assembly(source).unwrap();
  run(&asm).value
}
