//! Binary entry point for the worktree-guard stop hook.

use std::io::Read;
use std::process::ExitCode;
use worktree_guard::cli;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // Only commands that consume a payload read stdin; reading it
    // unconditionally would hang interactive invocations.
    let stdin = match cli::parse_args(&args) {
        cli::ParseResult::Command(cmd) if cmd.needs_stdin() => {
            let mut buffer = String::new();
            let _ = std::io::stdin().read_to_string(&mut buffer);
            buffer
        }
        _ => String::new(),
    };

    let output = cli::run(&args, &stdin);

    if let Some(payload) = output.stdout {
        println!("{payload}");
    }
    for message in &output.messages {
        eprintln!("{message}");
    }

    cli::exit_code_from_i32(output.exit_code)
}
