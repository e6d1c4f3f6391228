//! EVM CLI: assemble, check, run and disassemble `.easm` programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage/input/assembly error
//! - 2: Runtime error

mod commands;

use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "check" => commands::check(&args[2..]),
        "disassemble" => commands::disassemble(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: evm <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <input.easm> [--trace] [--memory <bytes>]   Assemble and execute a program");
    eprintln!("  check <input.easm>                              Assemble only, report errors");
    eprintln!("  disassemble <input.easm>                        Print the assembled listing");
}
