//! Drives a fixed list of prompts through one session
//!
//! Turns run strictly in order; turn N+1 starts only after turn N's answer
//! has been folded into the session state. The first failing turn ends the
//! run.

use crate::error::TurnError;
use crate::session::{Session, SessionKind};
use thiserror::Error;
use tracing::{error, info};

/// A completed turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    /// 1-based position in the prompt list
    pub turn: usize,
    pub prompt: String,
    pub answer: String,
}

/// The turn that stopped a run, with everything that completed before it
#[derive(Debug, Error)]
#[error("Turn {turn} of {session_kind} session failed: {error}")]
pub struct TurnFailure {
    /// 1-based position of the failing prompt
    pub turn: usize,
    pub session_kind: SessionKind,
    pub prompt: String,
    #[source]
    pub error: TurnError,
    /// Turns that completed before the failure
    pub completed: Vec<TurnRecord>,
}

/// Receives progress from a [`TurnRunner`]
pub trait TurnReporter: Send {
    /// A prompt is about to be sent
    fn on_prompt(&mut self, _turn: usize, _total: usize, _prompt: &str) {}

    /// A prompt was answered
    fn on_answer(&mut self, _record: &TurnRecord) {}

    /// A turn failed; no further prompts will be sent
    fn on_failure(&mut self, _failure: &TurnFailure) {}
}

/// Reports progress through `tracing`
#[derive(Debug, Default)]
pub struct TracingReporter;

impl TurnReporter for TracingReporter {
    fn on_prompt(&mut self, turn: usize, total: usize, prompt: &str) {
        info!("Turn {}/{}: {}", turn, total, prompt);
    }

    fn on_answer(&mut self, record: &TurnRecord) {
        info!("Turn {} answered: {}", record.turn, record.answer);
    }
}

/// Runs prompts through a session in order, stopping at the first failure
#[derive(Debug, Clone)]
pub struct TurnRunner {
    prompts: Vec<String>,
}

impl TurnRunner {
    pub fn new<I, S>(prompts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompts: prompts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Ask every prompt in order
    ///
    /// Returns all turns on success. On the first failing turn nothing else
    /// is attempted and the failure is returned with the turns completed so far.
    pub async fn run<S>(
        &self,
        session: &mut S,
        reporter: &mut dyn TurnReporter,
    ) -> Result<Vec<TurnRecord>, TurnFailure>
    where
        S: Session + ?Sized,
    {
        let total = self.prompts.len();
        let session_kind = session.kind();
        let mut completed = Vec::with_capacity(total);

        for (index, prompt) in self.prompts.iter().enumerate() {
            let turn = index + 1;
            reporter.on_prompt(turn, total, prompt);

            match session.take_turn(prompt).await {
                Ok(answer) => {
                    let record = TurnRecord {
                        turn,
                        prompt: prompt.clone(),
                        answer,
                    };
                    reporter.on_answer(&record);
                    completed.push(record);
                }
                Err(err) => {
                    error!(
                        turn,
                        session = %session_kind,
                        class = err.class(),
                        "Turn failed, halting run: {}",
                        err
                    );
                    let failure = TurnFailure {
                        turn,
                        session_kind,
                        prompt: prompt.clone(),
                        error: err,
                        completed,
                    };
                    reporter.on_failure(&failure);
                    return Err(failure);
                }
            }
        }

        info!("Completed {} turns on {} session", completed.len(), session_kind);
        Ok(completed)
    }
}
