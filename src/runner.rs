use crate::{
    error::Result,
    executor::{Executor, State},
    parser::parse,
    program::{Program, ProgramBuilder},
    registers::Registers,
};

/// Runs `program` from a fresh, zeroed register file until it finishes.
pub fn run(program: &Program) -> Result<Registers> {
    let mut executor = Executor::new(program);
    executor.run()?;
    Ok(executor.registers().snapshot())
}

/// Like [`run`], but gives up after `max_steps` executed instructions and returns `None`.
pub fn run_bounded(program: &Program, max_steps: usize) -> Result<Option<Registers>> {
    let mut executor = Executor::new(program);
    let mut state = executor.state();

    for _ in 0..max_steps {
        if state == State::Finished {
            break;
        }
        state = executor.step()?;
    }

    Ok(match state {
        State::Finished => Some(executor.registers().snapshot()),
        State::Running | State::Failed => None,
    })
}

/// Builds a program from the declarations made by `declare` and runs it.
pub fn asm(declare: impl FnOnce(&mut ProgramBuilder)) -> Result<Registers> {
    let mut builder = ProgramBuilder::new();
    declare(&mut builder);
    run(&builder.build()?)
}

pub fn build_source(source: &str) -> Result<Program> {
    let mut builder = ProgramBuilder::new();
    for declaration in parse(source)? {
        builder.declare(declaration)?;
    }
    builder.build()
}

pub fn run_source(source: &str) -> Result<Registers> {
    run(&build_source(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;

    #[test]
    fn mov_literal() {
        for n in [0, 1, -1, 42, i64::MIN, i64::MAX] {
            let result = asm(|b| {
                b.mov("ax", n);
            });
            assert_eq!(result.unwrap(), (n, 0, 0, 0));
        }
    }

    #[test]
    fn inc_and_dec() {
        let result = asm(|b| {
            b.mov("ax", 5).inc_by("ax", 3);
        });
        assert_eq!(result.unwrap(), (8, 0, 0, 0));

        let result = asm(|b| {
            b.mov("ax", 10).dec_by("ax", 2);
        });
        assert_eq!(result.unwrap(), (8, 0, 0, 0));

        let result = asm(|b| {
            b.mov("cx", 10).dec_by("cx", -2).inc("dx").dec("bx");
        });
        assert_eq!(result.unwrap(), (0, -1, 12, 1));
    }

    #[test]
    fn comparison_jumps() {
        let result = asm(|b| {
            b.mov("ax", 0)
                .mov("bx", 1)
                .cmp("ax", "bx")
                .jge("skip_jge")
                .inc("cx")
                .label("skip_jge")
                .jl("skip_jl")
                .inc("dx")
                .label("skip_jl");
        });
        assert_eq!(result.unwrap(), (0, 1, 1, 0));
    }

    #[test]
    fn loop_terminates_at_boundary() {
        let result = asm(|b| {
            b.mov("ax", 0)
                .label("start")
                .inc_by("ax", 1)
                .cmp("ax", 5)
                .jl("start");
        });
        assert_eq!(result.unwrap(), (5, 0, 0, 0));
    }

    #[test]
    fn operands_are_resolved_on_every_use() {
        let result = asm(|b| {
            b.mov("ax", 1)
                .label("again")
                .inc_by("bx", "ax")
                .inc("ax")
                .cmp("ax", 4)
                .jle("again");
        });
        assert_eq!(result.unwrap(), (5, 10, 0, 0));
    }

    #[test]
    fn forward_jump_to_label_at_end() {
        let result = asm(|b| {
            b.mov("ax", 1).jmp("end").mov("ax", 2).label("end");
        });
        assert_eq!(result.unwrap(), (1, 0, 0, 0));
    }

    #[test]
    fn same_program_runs_identically() {
        let program = build_source(
            "mov cx, 6\nloop:\ninc ax, cx\ndec cx\ncmp cx, 0\njne loop\nmov dx, ax",
        )
        .unwrap();

        let first = run(&program).unwrap();
        let second = run(&program).unwrap();
        assert_eq!(first, (21, 0, 0, 21));
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_instruction_never_runs() {
        // Executing the prefix would fail with UndefinedLabel before reaching `add`.
        let error = asm(|b| {
            b.jmp("nowhere").instruction("add", vec!["ax".into(), 1.into()]);
        })
        .unwrap_err();
        assert_eq!(error.error_type, ErrorType::UnknownInstruction);

        // Executing the prefix would never return.
        let error = run_source("label start\njmp start\nadd ax, 1").unwrap_err();
        assert_eq!(error.error_type, ErrorType::UnknownInstruction);
        assert_eq!(error.range.map(|r| (r.start, r.end)), Some((22, 31)));

        let error = run_source("mov ax, 1\nadd ax, 1").unwrap_err();
        assert_eq!(error.error_type, ErrorType::UnknownInstruction);
        assert_eq!(error.range.map(|r| (r.start, r.end)), Some((10, 19)));
    }

    #[test]
    fn label_keyword_only_reserved_in_text() {
        let result = asm(|b| {
            b.jmp("label").mov("ax", 1).label("label").mov("bx", 2);
        });
        assert_eq!(result.unwrap(), (0, 2, 0, 0));

        let error = run_source("label start\njmp label").unwrap_err();
        assert_eq!(error.error_type, ErrorType::Parser);
        assert_eq!(error.message, "Expected operand, found 'label'");
    }

    #[test]
    fn unbounded_loop_hits_the_callers_bound() {
        let program = build_source("label start\njmp start").unwrap();

        assert_eq!(run_bounded(&program, 10_000).unwrap(), None);
    }

    #[test]
    fn bounded_run_that_finishes() {
        let program = build_source("mov ax, 3").unwrap();

        assert_eq!(run_bounded(&program, 1).unwrap(), Some((3, 0, 0, 0)));
        assert_eq!(run_bounded(&program, 0).unwrap(), None);
    }

    #[test]
    fn runtime_error_carries_source_range() {
        let error = run_source("mov ax, 1\njmp nowhere").unwrap_err();

        assert_eq!(error.error_type, ErrorType::UndefinedLabel);
        assert_eq!(error.range.map(|r| (r.start, r.end)), Some((10, 21)));
    }
}
