//! Terminal output helpers

use colored::*;
use std::io::{self, Write};

pub const PROMPT: &str = "Your query: ";

pub fn print_banner(server: &str) {
    println!(
        "{} {}",
        "Connected to PostgreSQL database via".green(),
        server.bold()
    );
    println!("{}", "Type 'exit' to quit.".dimmed());
}

pub fn print_prompt() -> io::Result<()> {
    print!("\n{}", PROMPT.cyan().bold());
    io::stdout().flush()
}

pub fn print_answer(answer: &str) {
    println!("\n{} {}", "Assistant:".blue().bold(), answer);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.red());
}

pub fn print_notice(message: &str) {
    eprintln!("{}", message.yellow());
}

/// Whether a line typed at the prompt ends the session
pub fn is_exit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("exit")
}
