use dialogue_core::{TurnFailure, TurnRecord, TurnReporter};

fn separator() -> String {
    "─".repeat(50)
}

/// Prints each exchange to stdout between separator rules
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl TurnReporter for ConsoleReporter {
    fn on_prompt(&mut self, turn: usize, total: usize, prompt: &str) {
        println!("[{}/{}] You: {}", turn, total, prompt);
    }

    fn on_answer(&mut self, record: &TurnRecord) {
        println!("{}", separator());
        println!("{}", record.answer);
        println!("{}", separator());
        println!();
    }

    fn on_failure(&mut self, failure: &TurnFailure) {
        eprintln!("Error: {}", failure);
        if let Some(hint) = failure.error.hint() {
            eprintln!("\n{}", hint);
        }
    }
}
