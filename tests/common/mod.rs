use std::path::PathBuf;
use toyasm::{error::Result, runner::run_source};

fn format_registers(source: &str) -> Result<String> {
    let (ax, bx, cx, dx) = run_source(source)?;
    Ok(format!("ax={} bx={} cx={} dx={}", ax, bx, cx, dx))
}

#[allow(dead_code)]
pub fn run_passing_test(file: &str) -> Result<()> {
    println!("RUNNING '{}'...", file);

    let source = std::fs::read_to_string(file).unwrap();
    let expected = std::fs::read_to_string(PathBuf::from(file).with_extension("txt")).unwrap();

    let output = format_registers(&source)?;
    assert_eq!(output.trim(), expected.trim());

    Ok(())
}

#[allow(dead_code)]
pub fn run_failing_test(file: &str) {
    println!("RUNNING '{}'...", file);

    let source = std::fs::read_to_string(file).unwrap();

    let expected = source
        .lines()
        .find(|x| x.starts_with("; Expected: "))
        .map(|x| x.replace("; Expected: ", ""));

    let result = format_registers(&source);
    assert!(result.is_err());

    if let Some(expected) = expected {
        assert_eq!(result.unwrap_err().to_string().trim(), expected.trim());
    }
}
