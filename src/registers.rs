use crate::{
    error::{Error, ErrorType, Result},
    isa::{Operand, Register},
};
use std::fmt::{self, Display};

/// Final register values in `ax, bx, cx, dx` order.
pub type Registers = (i64, i64, i64, i64);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    ax: i64,
    bx: i64,
    cx: i64,
    dx: i64,
    flag: i64,
    instruction_pointer: usize,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            ax: 0,
            bx: 0,
            cx: 0,
            dx: 0,
            flag: 0,
            instruction_pointer: 0,
        }
    }

    pub fn get(&self, register: Register) -> i64 {
        match register {
            Register::Ax => self.ax,
            Register::Bx => self.bx,
            Register::Cx => self.cx,
            Register::Dx => self.dx,
        }
    }

    pub fn set(&mut self, register: Register, value: i64) {
        match register {
            Register::Ax => self.ax = value,
            Register::Bx => self.bx = value,
            Register::Cx => self.cx = value,
            Register::Dx => self.dx = value,
        }
    }

    pub fn get_by_name(&self, name: &str) -> Result<i64> {
        Ok(self.get(name.parse()?))
    }

    pub fn set_by_name(&mut self, name: &str, value: i64) -> Result<()> {
        self.set(name.parse()?, value);
        Ok(())
    }

    /// Reads the current value of an operand: registers are looked up, literals pass through.
    pub fn resolve(&self, operand: &Operand) -> Result<i64> {
        match operand {
            Operand::Register(register) => Ok(self.get(*register)),
            Operand::Literal(value) => Ok(*value),
            Operand::Symbol(name) => self.get_by_name(name),
        }
    }

    /// Resolves an operand used as a destination.
    pub fn destination(&self, operand: &Operand) -> Result<Register> {
        match operand {
            Operand::Register(register) => Ok(*register),
            Operand::Symbol(name) => name.parse(),
            Operand::Literal(value) => Err(Error::new(
                ErrorType::UnknownRegister,
                format!("'{}' is not a register", value),
            )),
        }
    }

    pub fn flag(&self) -> i64 {
        self.flag
    }

    pub fn set_flag(&mut self, flag: i64) {
        self.flag = flag;
    }

    pub fn pointer(&self) -> usize {
        self.instruction_pointer
    }

    pub fn set_pointer(&mut self, pointer: usize) {
        self.instruction_pointer = pointer;
    }

    pub fn snapshot(&self) -> Registers {
        (self.ax, self.bx, self.cx, self.dx)
    }
}

impl Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ax={} bx={} cx={} dx={} flag={} ip={}",
            self.ax, self.bx, self.cx, self.dx, self.flag, self.instruction_pointer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let registers = RegisterFile::new();
        assert_eq!(registers.snapshot(), (0, 0, 0, 0));
        assert_eq!(registers.flag(), 0);
        assert_eq!(registers.pointer(), 0);
        assert_eq!(registers, RegisterFile::default());
    }

    #[test]
    fn set_and_get() {
        let mut registers = RegisterFile::new();
        registers.set(Register::Bx, 7);
        registers.set_by_name("dx", -2).unwrap();

        assert_eq!(registers.get(Register::Bx), 7);
        assert_eq!(registers.get_by_name("dx").unwrap(), -2);
        assert_eq!(registers.snapshot(), (0, 7, 0, -2));
    }

    #[test]
    fn unknown_register_name() {
        let mut registers = RegisterFile::new();

        let error = registers.set_by_name("ex", 1).unwrap_err();
        assert_eq!(error.error_type, ErrorType::UnknownRegister);
        assert_eq!(registers, RegisterFile::new());
    }

    #[test]
    fn resolve_operands() {
        let mut registers = RegisterFile::new();
        registers.set(Register::Cx, 42);

        assert_eq!(registers.resolve(&Operand::Register(Register::Cx)).unwrap(), 42);
        assert_eq!(registers.resolve(&Operand::Literal(-5)).unwrap(), -5);
        assert_eq!(
            registers
                .resolve(&Operand::Symbol("nowhere".to_string()))
                .unwrap_err()
                .error_type,
            ErrorType::UnknownRegister
        );
    }
}
