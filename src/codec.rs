// --- Line-oriented record codec ---
//
// One task per line:
//   T | <V|X> | <description>
//   D | <V|X> | <description> | <yyyy/MM/dd>[ <HHmm>]
//   E | <V|X> | <description> | <yyyy/MM/dd>[ <HHmm>]

use std::fmt;

use crate::{
    error::{Error, Result},
    model::{FIELD_SEPARATOR, Moment, Schedule, Task, TaskKind},
};

const DONE: &str = "V";
const NOT_DONE: &str = "X";

/// Why a record failed the shape check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDefect {
    TooFewFields,
    BadDoneFlag,
    WrongFieldCount,
    UnknownKind,
    EmptyDescription,
}

impl fmt::Display for RecordDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordDefect::TooFewFields => "expected at least 3 fields",
            RecordDefect::BadDoneFlag => "done flag must be V or X",
            RecordDefect::WrongFieldCount => "wrong number of fields for this kind",
            RecordDefect::UnknownKind => "kind must be T, D or E",
            RecordDefect::EmptyDescription => "description is empty",
        })
    }
}

/// Render a task as one record line (without the trailing newline).
pub fn encode(task: &Task) -> String {
    let flag = if task.is_done() { DONE } else { NOT_DONE };
    let code = task.kind().code().to_string();
    let head = [code.as_str(), flag, task.description()].join(FIELD_SEPARATOR);

    match task.schedule() {
        Schedule::Plain => head,
        Schedule::Deadline(m) | Schedule::Event(m) => {
            format!("{head}{FIELD_SEPARATOR}{}", m.to_record())
        }
    }
}

/// Decode one record. `line_no` is 1-based and only used for diagnostics.
///
/// Shape is checked first ([`Error::MalformedRecord`]), content second
/// ([`Error::BadDateTime`]), so a torn line reports where it broke.
pub fn decode(line: &str, line_no: usize) -> Result<Task> {
    let malformed = |defect| Error::MalformedRecord {
        line: line_no,
        defect,
    };

    let mut fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    // Empty trailing fields carry nothing; "T | X | " has two fields.
    while fields.len() > 1 && fields.last() == Some(&"") {
        fields.pop();
    }

    if fields.len() < 3 {
        return Err(malformed(RecordDefect::TooFewFields));
    }
    let done = match fields[1] {
        DONE => true,
        NOT_DONE => false,
        _ => return Err(malformed(RecordDefect::BadDoneFlag)),
    };
    let Some(kind) = TaskKind::from_code(fields[0]) else {
        return Err(malformed(RecordDefect::UnknownKind));
    };
    // Plain records read the description and ignore anything after it.
    if kind != TaskKind::Plain && fields.len() != 4 {
        return Err(malformed(RecordDefect::WrongFieldCount));
    }
    let description = fields[2];
    if description.trim().is_empty() {
        return Err(malformed(RecordDefect::EmptyDescription));
    }

    let moment = match kind {
        TaskKind::Plain => None,
        TaskKind::Deadline | TaskKind::Event => {
            Some(Moment::parse(fields[3]).map_err(|e| e.at_line(line_no))?)
        }
    };

    Task::new(
        kind,
        description,
        done,
        moment.map(|m| m.date),
        moment.and_then(|m| m.time),
    )
}
