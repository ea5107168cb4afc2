//! Ode CLI - script runner.

use std::env;
use std::fs;
use std::io::Write;
use std::process;

use colored::Colorize;
use ode_interp::{Context, Interpreter};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: ode lex <file.ode>");
                process::exit(1);
            }
            cmd_lex(&args[2]);
        }
        "parse" => {
            if args.len() < 3 {
                eprintln!("Usage: ode parse <file.ode>");
                process::exit(1);
            }
            cmd_parse(&args[2]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("ode 0.1.0");
        }
        path => cmd_run(path),
    }
}

fn print_usage() {
    println!("Ode 0.1.0 - a small indentation-sensitive scripting language");
    println!();
    println!("Usage: ode <file.ode>");
    println!("       ode <command> [args]");
    println!();
    println!("Commands:");
    println!("  lex <file>       Tokenize a file and print tokens");
    println!("  parse <file>     Parse a file and print the AST");
    println!("  help             Show this help");
    println!("  version          Show version");
}

fn cmd_run(path: &str) {
    let source = read_source(path);

    // Stream output as the script produces it; the buffer inside the
    // context keeps accumulating regardless.
    let mut context = Context::with_sink(|fragment| {
        print!("{}", fragment);
        let _ = std::io::stdout().flush();
    });

    if let Err(error) = Interpreter::new(source.as_str()).run(&mut context) {
        eprintln!("{} {}", "error:".red().bold(), error.render(&source));
        process::exit(1);
    }
}

fn cmd_lex(path: &str) {
    let source = read_source(path);

    match ode_lexer::Lexer::new(&source).tokenize() {
        Ok(tokens) => {
            for token in &tokens {
                println!("{:4}:{:<4} {:?}", token.span.start, token.span.end, token.kind);
            }
        }
        Err(error) => {
            let (line, col) = ode_ast::LineMap::new(&source).line_col(error.span.start);
            eprintln!("{} {}:{} | {}", "error:".red().bold(), line, col, error);
            process::exit(1);
        }
    }
}

fn cmd_parse(path: &str) {
    let source = read_source(path);

    match Interpreter::new(source.as_str()).parse() {
        Ok(program) => {
            println!("{:#?}", program);
        }
        Err(error) => {
            eprintln!("{} {}", "error:".red().bold(), error.render(&source));
            process::exit(1);
        }
    }
}

fn read_source(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            process::exit(1);
        }
    }
}
