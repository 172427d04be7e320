use ansi_rgb::{green, Foreground};
use clap::{arg, command};
use lox::interpreter::Interpreter;
use lox::reporter::Reporter;
use lox::run;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::fs;
use std::process;

// BSD sysexits(3) codes, matching the usual Lox driver conventions.
const EX_USAGE: i32 = 64;
const EX_DATAERR: i32 = 65;
const EX_SOFTWARE: i32 = 70;

const USAGE: &str = "Usage: lox [script]";
const HISTORY_PATH: &str = "history.txt";

fn main() {
    let matches = command!()
        .arg(arg!([script] "Lox script to execute").multiple_values(true))
        .get_matches();
    let scripts: Vec<&str> = matches
        .values_of("script")
        .map(|values| values.collect())
        .unwrap_or_default();
    match scripts.as_slice() {
        [] => run_prompt(),
        [path] => run_file(path),
        _ => {
            println!("{}", USAGE);
            process::exit(EX_USAGE);
        }
    }
}

fn run_file(path: &str) {
    let contents = fs::read_to_string(path).expect("Something went wrong reading the file");
    let mut interpreter = Interpreter::new();
    let mut reporter = Reporter::new();
    run(&contents, &mut interpreter, &mut reporter, false);
    if reporter.had_error {
        process::exit(EX_DATAERR);
    }
    if reporter.had_runtime_error {
        process::exit(EX_SOFTWARE);
    }
}

fn run_prompt() {
    let mut rl = Editor::<()>::new();
    if rl.load_history(HISTORY_PATH).is_err() {
        println!("No previous history.");
    }
    let mut interpreter = Interpreter::new();
    let mut reporter = Reporter::new();
    loop {
        match rl.readline(&"> ".fg(green()).to_string()) {
            Ok(line) => {
                rl.add_history_entry(line.as_str());
                run(&line, &mut interpreter, &mut reporter, true);
                // A bad line should not poison the next one.
                reporter.had_error = false;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }
    let _ = rl.save_history(HISTORY_PATH);
}
