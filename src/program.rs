use crate::{
    error::{Error, ErrorType, Result},
    isa::{Instruction, Opcode, Operand, Register},
    lexer::SourceRange,
};
use std::collections::HashMap;
use std::fmt::{self, Display};

/// An operand as written in a declaration, before it is checked against the instruction set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Name(String),
    Integer(i64),
}

impl Argument {
    fn into_operand(self) -> Operand {
        match self {
            Argument::Integer(value) => Operand::Literal(value),
            Argument::Name(name) => match name.parse::<Register>() {
                Ok(register) => Operand::Register(register),
                Err(_) => Operand::Symbol(name),
            },
        }
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Name(name) => write!(f, "{}", name),
            Argument::Integer(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Argument {
    fn from(name: &str) -> Self {
        Argument::Name(name.to_string())
    }
}

impl From<String> for Argument {
    fn from(name: String) -> Self {
        Argument::Name(name)
    }
}

impl From<Register> for Argument {
    fn from(register: Register) -> Self {
        Argument::Name(register.name().to_string())
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Argument::Integer(value)
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Argument::Integer(value as i64)
    }
}

/// One entry of the declaration stream consumed by [`ProgramBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Instruction {
        mnemonic: String,
        arguments: Vec<Argument>,
        range: Option<SourceRange>,
    },
    Label {
        name: String,
        range: Option<SourceRange>,
    },
}

/// An immutable instruction sequence together with its label table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
    ranges: Vec<Option<SourceRange>>,
    labels: HashMap<String, usize>,
}

impl Program {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn instruction(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Where the instruction at `index` was declared, if it came from source text.
    pub fn range(&self, index: usize) -> Option<SourceRange> {
        self.ranges.get(index).copied().flatten()
    }

    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().map(|(name, index)| (name.as_str(), *index))
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels = self.labels().collect::<Vec<_>>();
        labels.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));

        let mut pending = labels.into_iter().peekable();
        for index in 0..=self.instructions.len() {
            while let Some((name, _)) = pending.next_if(|(_, target)| *target == index) {
                writeln!(f, "{}:", name)?;
            }

            if let Some(instr) = self.instructions.get(index) {
                writeln!(f, "    {:>3}  {}", index, instr)?;
            }
        }

        Ok(())
    }
}

/// Collects declarations into a [`Program`].
///
/// The chaining methods remember the first error they hit and ignore every later call;
/// [`ProgramBuilder::build`] reports it.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
    ranges: Vec<Option<SourceRange>>,
    labels: HashMap<String, usize>,
    error: Option<Error>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, declaration: Declaration) -> Result<()> {
        match declaration {
            Declaration::Instruction {
                mnemonic,
                arguments,
                range,
            } => self.append(&mnemonic, arguments, range),
            Declaration::Label { name, .. } => {
                self.bind_label(name);
                Ok(())
            }
        }
    }

    pub fn instruction(&mut self, mnemonic: &str, arguments: Vec<Argument>) -> &mut Self {
        if self.error.is_none() {
            if let Err(e) = self.append(mnemonic, arguments, None) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Binds `name` to the index of the next instruction. Redeclaring a name rebinds it.
    pub fn label(&mut self, name: &str) -> &mut Self {
        if self.error.is_none() {
            self.bind_label(name.to_string());
        }
        self
    }

    pub fn mov(&mut self, dst: impl Into<Argument>, src: impl Into<Argument>) -> &mut Self {
        self.instruction("mov", vec![dst.into(), src.into()])
    }

    pub fn inc(&mut self, dst: impl Into<Argument>) -> &mut Self {
        self.instruction("inc", vec![dst.into()])
    }

    pub fn inc_by(&mut self, dst: impl Into<Argument>, amount: impl Into<Argument>) -> &mut Self {
        self.instruction("inc", vec![dst.into(), amount.into()])
    }

    pub fn dec(&mut self, dst: impl Into<Argument>) -> &mut Self {
        self.instruction("dec", vec![dst.into()])
    }

    pub fn dec_by(&mut self, dst: impl Into<Argument>, amount: impl Into<Argument>) -> &mut Self {
        self.instruction("dec", vec![dst.into(), amount.into()])
    }

    pub fn cmp(&mut self, a: impl Into<Argument>, b: impl Into<Argument>) -> &mut Self {
        self.instruction("cmp", vec![a.into(), b.into()])
    }

    pub fn jmp(&mut self, label: &str) -> &mut Self {
        self.instruction("jmp", vec![label.into()])
    }

    pub fn je(&mut self, label: &str) -> &mut Self {
        self.instruction("je", vec![label.into()])
    }

    pub fn jne(&mut self, label: &str) -> &mut Self {
        self.instruction("jne", vec![label.into()])
    }

    pub fn jl(&mut self, label: &str) -> &mut Self {
        self.instruction("jl", vec![label.into()])
    }

    pub fn jle(&mut self, label: &str) -> &mut Self {
        self.instruction("jle", vec![label.into()])
    }

    pub fn jg(&mut self, label: &str) -> &mut Self {
        self.instruction("jg", vec![label.into()])
    }

    pub fn jge(&mut self, label: &str) -> &mut Self {
        self.instruction("jge", vec![label.into()])
    }

    pub fn build(self) -> Result<Program> {
        if let Some(error) = self.error {
            return Err(error);
        }

        Ok(Program {
            instructions: self.instructions,
            ranges: self.ranges,
            labels: self.labels,
        })
    }

    fn bind_label(&mut self, name: String) {
        self.labels.insert(name, self.instructions.len());
    }

    fn append(
        &mut self,
        mnemonic: &str,
        arguments: Vec<Argument>,
        range: Option<SourceRange>,
    ) -> Result<()> {
        let opcode = mnemonic.parse::<Opcode>().map_err(|e| e.or_range(range))?;
        let instr = decode(opcode, arguments).map_err(|e| e.or_range(range))?;

        self.instructions.push(instr);
        self.ranges.push(range);

        Ok(())
    }
}

fn decode(opcode: Opcode, arguments: Vec<Argument>) -> Result<Instruction> {
    let instr = match (opcode, arguments.as_slice()) {
        (Opcode::Mov, [dst, src]) => Instruction::Mov(destination(opcode, dst)?, operand(src)),
        (Opcode::Inc, [dst]) => Instruction::Inc(destination(opcode, dst)?, Operand::Literal(1)),
        (Opcode::Inc, [dst, amount]) => {
            Instruction::Inc(destination(opcode, dst)?, operand(amount))
        }
        (Opcode::Dec, [dst]) => Instruction::Dec(destination(opcode, dst)?, Operand::Literal(1)),
        (Opcode::Dec, [dst, amount]) => {
            Instruction::Dec(destination(opcode, dst)?, operand(amount))
        }
        (Opcode::Cmp, [a, b]) => Instruction::Cmp(operand(a), operand(b)),
        (Opcode::Jmp, [target]) => Instruction::Jmp(label(opcode, target)?),
        (_, [target]) => match opcode.condition() {
            Some(condition) => Instruction::CondJmp(condition, label(opcode, target)?),
            None => return Err(arity_error(opcode, arguments.len())),
        },
        _ => return Err(arity_error(opcode, arguments.len())),
    };

    Ok(instr)
}

fn arity_error(opcode: Opcode, got: usize) -> Error {
    let (min, max) = opcode.arity();
    let expected = if min == max {
        format!("{}", min)
    } else {
        format!("{} to {}", min, max)
    };

    Error::new(
        ErrorType::MalformedInstruction,
        format!("'{}' expects {} operand(s), got {}", opcode, expected, got),
    )
}

fn operand(argument: &Argument) -> Operand {
    argument.clone().into_operand()
}

fn label(opcode: Opcode, argument: &Argument) -> Result<String> {
    match argument {
        Argument::Name(name) => Ok(name.clone()),
        Argument::Integer(_) => Err(Error::new(
            ErrorType::MalformedInstruction,
            format!("'{}' expects a label, got '{}'", opcode, argument),
        )),
    }
}

fn destination(opcode: Opcode, argument: &Argument) -> Result<Operand> {
    match argument {
        Argument::Name(_) => Ok(operand(argument)),
        Argument::Integer(_) => Err(Error::new(
            ErrorType::MalformedInstruction,
            format!(
                "'{}' expects a register destination, got '{}'",
                opcode, argument
            ),
        )),
    }
}
