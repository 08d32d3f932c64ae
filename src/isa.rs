//!
//! The fixed instruction set: opcodes, operands, and the decoded instruction form.
//!

use crate::error::{Error, ErrorType, Result};
use std::fmt::{self, Display};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Ax,
    Bx,
    Cx,
    Dx,
}

impl Register {
    pub const ALL: [Register; 4] = [Register::Ax, Register::Bx, Register::Cx, Register::Dx];

    pub fn name(&self) -> &'static str {
        use Register::*;

        match self {
            Ax => "ax",
            Bx => "bx",
            Cx => "cx",
            Dx => "dx",
        }
    }
}

impl FromStr for Register {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Register::ALL
            .into_iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| {
                Error::new(
                    ErrorType::UnknownRegister,
                    format!("'{}' is not a register", name),
                )
            })
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A value consumed by an instruction.
///
/// Names that are not registers are kept as symbols and only rejected when they are resolved
/// at execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    Literal(i64),
    Symbol(String),
}

impl Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "{}", r),
            Operand::Literal(value) => write!(f, "{}", value),
            Operand::Symbol(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Condition {
    pub fn holds(&self, flag: i64) -> bool {
        use Condition::*;

        match self {
            Equal => flag == 0,
            NotEqual => flag != 0,
            Less => flag < 0,
            LessEqual => flag <= 0,
            Greater => flag > 0,
            GreaterEqual => flag >= 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Mov,
    Inc,
    Dec,
    Cmp,
    Jmp,
    Je,
    Jne,
    Jl,
    Jle,
    Jg,
    Jge,
}

impl Opcode {
    pub const ALL: [Opcode; 11] = [
        Opcode::Mov,
        Opcode::Inc,
        Opcode::Dec,
        Opcode::Cmp,
        Opcode::Jmp,
        Opcode::Je,
        Opcode::Jne,
        Opcode::Jl,
        Opcode::Jle,
        Opcode::Jg,
        Opcode::Jge,
    ];

    pub fn mnemonic(&self) -> &'static str {
        use Opcode::*;

        match self {
            Mov => "mov",
            Inc => "inc",
            Dec => "dec",
            Cmp => "cmp",
            Jmp => "jmp",
            Je => "je",
            Jne => "jne",
            Jl => "jl",
            Jle => "jle",
            Jg => "jg",
            Jge => "jge",
        }
    }

    /// Minimum and maximum number of operands accepted.
    pub fn arity(&self) -> (usize, usize) {
        use Opcode::*;

        match self {
            Mov | Cmp => (2, 2),
            Inc | Dec => (1, 2),
            Jmp | Je | Jne | Jl | Jle | Jg | Jge => (1, 1),
        }
    }

    /// The condition tested by a conditional jump, `None` for every other opcode.
    pub fn condition(&self) -> Option<Condition> {
        use Opcode::*;

        match self {
            Je => Some(Condition::Equal),
            Jne => Some(Condition::NotEqual),
            Jl => Some(Condition::Less),
            Jle => Some(Condition::LessEqual),
            Jg => Some(Condition::Greater),
            Jge => Some(Condition::GreaterEqual),
            _ => None,
        }
    }
}

impl FromStr for Opcode {
    type Err = Error;

    fn from_str(mnemonic: &str) -> Result<Self> {
        Opcode::ALL
            .into_iter()
            .find(|op| op.mnemonic() == mnemonic)
            .ok_or_else(|| {
                Error::new(
                    ErrorType::UnknownInstruction,
                    format!("Unknown instruction '{}'", mnemonic),
                )
            })
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// A decoded instruction. Operands are stored unresolved and read from the register file
/// every time the instruction executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Mov(Operand, Operand),
    Inc(Operand, Operand),
    Dec(Operand, Operand),
    Cmp(Operand, Operand),
    Jmp(String),
    CondJmp(Condition, String),
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        use Condition::*;
        use Instruction::*;

        match self {
            Mov(_, _) => Opcode::Mov,
            Inc(_, _) => Opcode::Inc,
            Dec(_, _) => Opcode::Dec,
            Cmp(_, _) => Opcode::Cmp,
            Jmp(_) => Opcode::Jmp,
            CondJmp(Equal, _) => Opcode::Je,
            CondJmp(NotEqual, _) => Opcode::Jne,
            CondJmp(Less, _) => Opcode::Jl,
            CondJmp(LessEqual, _) => Opcode::Jle,
            CondJmp(Greater, _) => Opcode::Jg,
            CondJmp(GreaterEqual, _) => Opcode::Jge,
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        let opcode = self.opcode();
        match self {
            Mov(a, b) | Inc(a, b) | Dec(a, b) | Cmp(a, b) => write!(f, "{} {}, {}", opcode, a, b),
            Jmp(label) | CondJmp(_, label) => write!(f, "{} {}", opcode, label),
        }
    }
}
