//! CLI command implementations.

use std::fs;
use std::io;

use evm_common::Program;
use evm_vm::{VmConfig, VM};

/// Assemble and execute a program, writing its output to stdout.
pub fn run(args: &[String]) -> Result<(), i32> {
    let opts = RunOptions::parse(args)?;
    let program = assemble_file(&opts.input)?;

    let mut vm = VM::with_config(program, opts.config, io::stdout());
    vm.run().map_err(|e| {
        eprintln!("{}: runtime error: {e}", opts.input);
        2
    })
}

/// Assemble a program without running it.
pub fn check(args: &[String]) -> Result<(), i32> {
    let input = single_input("check", args)?;
    let program = assemble_file(input)?;
    eprintln!("OK: {input} ({} words)", program.len());
    Ok(())
}

/// Assemble a program and print its listing.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    let input = single_input("disassemble", args)?;
    let program = assemble_file(input)?;
    print!("{}", evm_assembler::disassemble(&program));
    Ok(())
}

struct RunOptions {
    input: String,
    config: VmConfig,
}

impl RunOptions {
    fn parse(args: &[String]) -> Result<Self, i32> {
        let mut input = None;
        let mut config = VmConfig::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--trace" => config.trace = true,
                "--memory" => {
                    let value = iter.next().ok_or_else(|| {
                        eprintln!("error: --memory requires a size in bytes");
                        1
                    })?;
                    config.memory_capacity = value.parse().map_err(|_| {
                        eprintln!("error: invalid memory size '{value}'");
                        1
                    })?;
                }
                flag if flag.starts_with("--") => {
                    eprintln!("error: unknown option '{flag}'");
                    return Err(1);
                }
                path => {
                    if input.is_some() {
                        eprintln!("error: unexpected argument '{path}'");
                        return Err(1);
                    }
                    input = Some(path.to_string());
                }
            }
        }

        let Some(input) = input else {
            eprintln!("error: run requires an input file");
            eprintln!("Usage: evm run <input.easm> [--trace] [--memory <bytes>]");
            return Err(1);
        };
        Ok(Self { input, config })
    }
}

fn single_input<'a>(command: &str, args: &'a [String]) -> Result<&'a str, i32> {
    match args {
        [input] => Ok(input),
        [] => {
            eprintln!("error: {command} requires an input file");
            eprintln!("Usage: evm {command} <input.easm>");
            Err(1)
        }
        [_, extra, ..] => {
            eprintln!("error: unexpected argument '{extra}'");
            Err(1)
        }
    }
}

/// Read and assemble a source file, reporting any failure on stderr.
fn assemble_file(input: &str) -> Result<Program, i32> {
    let text = fs::read_to_string(input).map_err(|e| {
        eprintln!("error: cannot read '{input}': {e}");
        1
    })?;

    evm_assembler::assemble(&text, input).map_err(|e| {
        eprintln!("{e}");
        1
    })
}
