use crate::{
    error::{Error, ErrorType, Result},
    isa::Instruction,
    program::Program,
    registers::RegisterFile,
    trace,
};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Finished,
    Failed,
}

enum InstructionExecuteResult {
    Normal,
    Jump(usize),
}

/// Drives one run of a [`Program`] against a register file it owns exclusively.
///
/// There is no step limit: a program that loops forever keeps [`Executor::run`] busy forever.
/// Callers that need a bound should call [`Executor::step`] themselves.
///
/// A runtime error is fatal: the executor keeps it and every later step returns it again.
pub struct Executor<'a> {
    program: &'a Program,
    registers: RegisterFile,
    failure: Option<Error>,
}

impl<'a> Executor<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            registers: RegisterFile::new(),
            failure: None,
        }
    }

    pub fn state(&self) -> State {
        if self.failure.is_some() {
            State::Failed
        } else if self.registers.pointer() >= self.program.len() {
            State::Finished
        } else {
            State::Running
        }
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn into_registers(self) -> RegisterFile {
        self.registers
    }

    pub fn failure(&self) -> Option<&Error> {
        self.failure.as_ref()
    }

    fn jump_target(&self, label: &str) -> Result<usize> {
        self.program.label(label).ok_or_else(|| {
            Error::new(
                ErrorType::UndefinedLabel,
                format!("Label '{}' is not defined", label),
            )
        })
    }

    fn execute_instruction(&mut self, instr: &Instruction) -> Result<InstructionExecuteResult> {
        use Instruction::*;

        let regs = &mut self.registers;
        match instr {
            Mov(dst, src) => {
                let value = regs.resolve(src)?;
                regs.set(regs.destination(dst)?, value);
            }
            Inc(dst, amount) => {
                let register = regs.destination(dst)?;
                let value = regs.get(register).wrapping_add(regs.resolve(amount)?);
                regs.set(register, value);
            }
            Dec(dst, amount) => {
                let register = regs.destination(dst)?;
                let value = regs.get(register).wrapping_sub(regs.resolve(amount)?);
                regs.set(register, value);
            }
            Cmp(a, b) => {
                let flag = match regs.resolve(a)?.cmp(&regs.resolve(b)?) {
                    Ordering::Less => -1,
                    Ordering::Equal => 0,
                    Ordering::Greater => 1,
                };
                regs.set_flag(flag);
            }
            Jmp(label) => {
                return Ok(InstructionExecuteResult::Jump(self.jump_target(label)?));
            }
            CondJmp(condition, label) => {
                if condition.holds(regs.flag()) {
                    return Ok(InstructionExecuteResult::Jump(self.jump_target(label)?));
                }
            }
        }

        Ok(InstructionExecuteResult::Normal)
    }

    /// Executes the instruction under the pointer.
    ///
    /// The pointer is advanced before dispatch, so a jump overwrites it with an absolute index.
    /// A failing instruction leaves every register except the pointer as it was.
    pub fn step(&mut self) -> Result<State> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        let program = self.program;
        let index = self.registers.pointer();
        let instr = match program.instruction(index) {
            Some(instr) => instr,
            None => return Ok(State::Finished),
        };

        self.registers.set_pointer(index + 1);

        let result = match self.execute_instruction(instr) {
            Ok(result) => result,
            Err(e) => {
                let e = e.or_range(program.range(index));
                self.failure = Some(e.clone());
                return Err(e);
            }
        };

        if let InstructionExecuteResult::Jump(target) = result {
            self.registers.set_pointer(target);
        }

        trace!("{:>3}  {:<16} {}", index, instr.to_string(), self.registers);

        Ok(self.state())
    }

    pub fn run(&mut self) -> Result<()> {
        while self.step()? == State::Running {}
        Ok(())
    }
}
