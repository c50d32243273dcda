//! Terminal operator — approval prompts and clarification questions
//! answered over stdin.

use codecrew_core::approval::{Confirmation, Operator};
use std::io::Write;

pub struct StdinOperator;

impl StdinOperator {
    fn read_line(prompt: &str) -> String {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return String::new();
        }
        line.trim().to_string()
    }
}

impl Operator for StdinOperator {
    fn confirm(&self, message: &str) -> Confirmation {
        println!("\nWARNING: {message}");
        loop {
            let answer = Self::read_line("(y)es / (n)o / (a)pprove all > ").to_lowercase();
            match answer.as_str() {
                "y" | "yes" => return Confirmation::Yes,
                "n" | "no" => return Confirmation::No,
                "a" => return Confirmation::ApproveAll,
                _ => continue,
            }
        }
    }

    fn ask(&self, question: &str) -> String {
        println!("\nAGENT NEEDS YOUR INPUT:\n{question}");
        Self::read_line("Your response (or 'exit' to stop) > ")
    }
}
