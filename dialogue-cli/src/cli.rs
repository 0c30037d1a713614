use clap::{Parser, ValueEnum};
use dialogue_core::SessionKind;
use std::path::PathBuf;

/// Prompts used when none are given on the command line
pub const DEFAULT_PROMPTS: [&str; 3] = [
    "What is JavaScript?",
    "How does it differ from TypeScript?",
    "Which of the two would you recommend for a first project?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Resend the whole transcript on every turn
    Transcript,
    /// Chain each turn to the previous exchange by reference
    Chained,
}

impl From<Mode> for SessionKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Transcript => SessionKind::Transcript,
            Mode::Chained => SessionKind::Chained,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dialogue")]
#[command(about = "Run a multi-turn dialogue against an Azure OpenAI deployment")]
#[command(long_about = None)]
pub struct Args {
    #[arg(
        short = 'm',
        long = "mode",
        value_enum,
        default_value_t = Mode::Transcript,
        help = "How conversation state is carried between turns"
    )]
    pub mode: Mode,

    #[arg(
        short = 'c',
        long = "config",
        help = "Load configuration from a YAML or JSON file instead of the environment"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'p',
        long = "prompt",
        help = "A user prompt; repeat for additional turns"
    )]
    pub prompts: Vec<String>,

    #[arg(long = "system", help = "Override the system prompt")]
    pub system: Option<String>,
}

impl Args {
    pub fn prompts(&self) -> Vec<String> {
        if self.prompts.is_empty() {
            DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect()
        } else {
            self.prompts.clone()
        }
    }

    /// First line printed when the configuration cannot be loaded
    pub fn config_failure_headline(&self) -> String {
        match &self.config {
            Some(path) => format!("Could not load configuration from '{}'", path.display()),
            None => "Environment variables not set properly!".to_string(),
        }
    }
}
