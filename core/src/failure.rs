use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    ReadFailure,
    ResourceNotFound,
    EndOfStream,
    ConnectionUnavailable,
    MissingTypeDefinition,
    ArithmeticInvalid,
    NullDereference,
    OutOfBoundsAccess,
    InvalidTypeConversion,
    IllegalArgument,
    InterruptedWait,
    MalformedInput,
}

impl FailureKind {
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::ReadFailure => "read-failure",
            FailureKind::ResourceNotFound => "resource-not-found",
            FailureKind::EndOfStream => "end-of-stream",
            FailureKind::ConnectionUnavailable => "connection-unavailable",
            FailureKind::MissingTypeDefinition => "missing-type-definition",
            FailureKind::ArithmeticInvalid => "arithmetic-invalid",
            FailureKind::NullDereference => "null-dereference",
            FailureKind::OutOfBoundsAccess => "out-of-bounds-access",
            FailureKind::InvalidTypeConversion => "invalid-type-conversion",
            FailureKind::IllegalArgument => "illegal-argument",
            FailureKind::InterruptedWait => "interrupted-wait",
            FailureKind::MalformedInput => "malformed-input",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One report line produced by a scenario.
///
/// `caught` is false only when an environment-dependent operation succeeded
/// where it was expected to fail; the report then says so instead of
/// claiming a caught failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub kind: FailureKind,
    pub message: String,
    pub caught: bool,
}

impl Report {
    pub fn caught(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: single_line(message.into()),
            caught: true,
        }
    }

    pub fn not_triggered(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            message: single_line(detail.into()),
            caught: false,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.caught {
            write!(f, "{} caught: {}", self.kind, self.message)
        } else {
            write!(f, "{} not triggered: {}", self.kind, self.message)
        }
    }
}

// Reports are emitted one per line, so embedded line breaks are folded.
fn single_line(message: String) -> String {
    if message.contains(['\n', '\r']) {
        message.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        message
    }
}
