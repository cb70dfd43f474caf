use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{codec::RecordDefect, model::TimedKind};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while parsing input, decoding records or
/// touching the store file.
#[derive(Debug, Error)]
pub enum Error {
    #[error("a task description cannot be empty")]
    EmptyDescription,

    #[error("a todo shouldn't contain a timestamp")]
    UnexpectedTimestamp,

    /// `marker_found` is false when the `/by` or `/at` marker itself is absent.
    #[error("{} must contain {}", .kind.article_name(), timestamp_hint(.kind, .marker_found))]
    MissingTimestamp { kind: TimedKind, marker_found: bool },

    #[error(
        "could not read `{value}` as a date/time{}; please format it as yyyy/MM/dd HHmm",
        line_suffix(.line)
    )]
    BadDateTime { value: String, line: Option<usize> },

    #[error("I don't know what `{0}` means")]
    UnknownCommand(String),

    #[error("please give me a task number")]
    NotANumber,

    #[error("`{0}` needs an argument")]
    EmptyArgument(&'static str),

    #[error("invalid task in line {line}: {defect}")]
    MalformedRecord { line: usize, defect: RecordDefect },

    #[error("invalid task: {0}")]
    InvalidTask(&'static str),

    /// Index is 0-based; the message shows the number the user typed.
    #[error("task {} doesn't exist (the list has {len})", .index + 1)]
    NoSuchTask { index: usize, len: usize },

    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn timestamp_hint(kind: &TimedKind, marker_found: &bool) -> &'static str {
    if *marker_found { "a timestamp" } else { kind.marker() }
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(" in line {l}")).unwrap_or_default()
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn bad_date_time(value: impl Into<String>) -> Self {
        Error::BadDateTime {
            value: value.into(),
            line: None,
        }
    }

    /// Attach a 1-based store line to errors that know about lines.
    pub(crate) fn at_line(self, line_no: usize) -> Self {
        match self {
            Error::BadDateTime { value, .. } => Error::BadDateTime {
                value,
                line: Some(line_no),
            },
            other => other,
        }
    }

    /// The store line this error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::MalformedRecord { line, .. } => Some(*line),
            Error::BadDateTime { line, .. } => *line,
            _ => None,
        }
    }
}
