//! Tuple status machine.
//!
//! ```text
//! waiting ──► todo ──► doing ──► done
//!    │          │        │         │
//!    └──────────┴────────┴─────────┴──► failed
//! ```
//!
//! Success is linear; failure is reachable from every other state.

use core::fmt;

use crate::{Error, Result};

/// Status of a traintuple or testtuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Waiting for at least one parent to complete
    Waiting,
    /// Runnable, not yet picked up by its worker
    Todo,
    /// Being executed by its worker
    Doing,
    /// Completed successfully
    Done,
    /// Failed, either directly or through a failed parent
    Failed,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Waiting,
        Status::Todo,
        Status::Doing,
        Status::Done,
        Status::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Waiting => "waiting",
            Status::Todo => "todo",
            Status::Doing => "doing",
            Status::Done => "done",
            Status::Failed => "failed",
        }
    }

    /// The single successful successor of this status, if any.
    pub fn next_on_success(&self) -> Option<Status> {
        match self {
            Status::Waiting => Some(Status::Todo),
            Status::Todo => Some(Status::Doing),
            Status::Doing => Some(Status::Done),
            Status::Done | Status::Failed => None,
        }
    }

    /// Whether `self -> next` is in the transition table.
    pub fn can_transition_to(&self, next: Status) -> bool {
        if *self == next {
            return false;
        }
        next == Status::Failed || self.next_on_success() == Some(next)
    }

    /// Validate `self -> next`, rejecting no-op and out-of-table transitions.
    pub fn check_transition(&self, next: Status) -> Result<()> {
        if *self == next {
            return Err(Error::bad_request(format!("status already {next}")));
        }
        if !self.can_transition_to(next) {
            return Err(Error::bad_request(format!(
                "cannot change status from {self} to {next}"
            )));
        }
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Done | Status::Failed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "waiting" => Ok(Status::Waiting),
            "todo" => Ok(Status::Todo),
            "doing" => Ok(Status::Doing),
            "done" => Ok(Status::Done),
            "failed" => Ok(Status::Failed),
            other => Err(Error::bad_request(format!("invalid status: {other}"))),
        }
    }
}
