//! Quiet-period buffering for text input.

use std::time::Duration;

use tokio::time::Instant;

use crate::builder::Intent;

/// A text edit waiting for its quiet period to pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingInput {
    Intent(Intent),
    /// Header quick-filter text for a field.
    QuickFilter { field: String, text: String },
}

impl PendingInput {
    /// Two inputs target the same box when the later one replaces the earlier.
    fn same_target(&self, other: &PendingInput) -> bool {
        match (self, other) {
            (
                PendingInput::Intent(Intent::SetFilterText { index: a, .. }),
                PendingInput::Intent(Intent::SetFilterText { index: b, .. }),
            )
            | (
                PendingInput::Intent(Intent::SetAlias { index: a, .. }),
                PendingInput::Intent(Intent::SetAlias { index: b, .. }),
            ) => a == b,
            (
                PendingInput::QuickFilter { field: a, .. },
                PendingInput::QuickFilter { field: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

/// Holds at most one pending text edit.
///
/// Typing into the same box restarts the quiet period and keeps only the
/// latest text. Typing into a different box releases the earlier edit for
/// immediate application.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(PendingInput, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Buffer `input`. Returns an earlier edit for a different box, which
    /// the caller must apply now.
    pub fn push(&mut self, input: PendingInput) -> Option<PendingInput> {
        let deadline = Instant::now() + self.delay;
        match self.pending.take() {
            Some((previous, _)) if !previous.same_target(&input) => {
                self.pending = Some((input, deadline));
                Some(previous)
            }
            _ => {
                self.pending = Some((input, deadline));
                None
            }
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending edit if its quiet period is over.
    pub fn take_due(&mut self) -> Option<PendingInput> {
        match &self.pending {
            Some((_, at)) if *at <= Instant::now() => self.take(),
            _ => None,
        }
    }

    /// The pending edit, regardless of its deadline.
    pub fn take(&mut self) -> Option<PendingInput> {
        self.pending.take().map(|(input, _)| input)
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
