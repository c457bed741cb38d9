//! clean-text: print text as the synthesizer would receive it with --clean
//!
//! Usage: clean-text "TEXT"

use piper_cli::clean::clean_text;
use std::process;

fn main() {
    let Some(arg) = std::env::args_os().nth(1) else {
        eprintln!("Usage: clean-text \"TEXT\"");
        process::exit(1);
    };

    match arg.into_string() {
        Ok(text) => println!("{}", clean_text(&text)),
        Err(_) => {
            eprintln!("Error: argument is not valid UTF-8");
            process::exit(1);
        }
    }
}
