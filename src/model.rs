use std::fmt;

use serde::Serialize;
use time::{Date, Time, format_description::BorrowedFormatItem, macros::format_description};

use crate::error::{Error, Result};

// Self documenting aliases
pub type TaskDate = Date;
pub type TaskTime = Time;

/// Separates record fields on disk. Descriptions must never contain it.
pub const FIELD_SEPARATOR: &str = " | ";

const RECORD_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]/[month]/[day]");
const RECORD_TIME: &[BorrowedFormatItem<'static>] = format_description!("[hour][minute]");
const DISPLAY_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none] [year]");
const DISPLAY_TIME: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

// --- Task Kind ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Plain,
    Deadline,
    Event,
}

impl TaskKind {
    /// Single-letter tag used in records and in the display prefix.
    pub fn code(self) -> char {
        match self {
            TaskKind::Plain => 'T',
            TaskKind::Deadline => 'D',
            TaskKind::Event => 'E',
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "T" => Some(TaskKind::Plain),
            "D" => Some(TaskKind::Deadline),
            "E" => Some(TaskKind::Event),
            _ => None,
        }
    }
}

// --- Timed Kind: the kinds that carry a date ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimedKind {
    Deadline,
    Event,
}

impl TimedKind {
    /// Marker token that introduces the timestamp in user input.
    pub fn marker(self) -> &'static str {
        match self {
            TimedKind::Deadline => "/by",
            TimedKind::Event => "/at",
        }
    }

    pub fn article_name(self) -> &'static str {
        match self {
            TimedKind::Deadline => "a deadline",
            TimedKind::Event => "an event",
        }
    }
}

impl From<TimedKind> for TaskKind {
    fn from(kind: TimedKind) -> Self {
        match kind {
            TimedKind::Deadline => TaskKind::Deadline,
            TimedKind::Event => TaskKind::Event,
        }
    }
}

// --- Moment: a calendar date with an optional time-of-day ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Moment {
    pub date: TaskDate,
    pub time: Option<TaskTime>,
}

impl Moment {
    pub fn new(date: TaskDate, time: Option<TaskTime>) -> Self {
        Self { date, time }
    }

    /// Parse `yyyy/MM/dd` or `yyyy/MM/dd HHmm`.
    ///
    /// The first space splits date from time; anything else that does not
    /// match the two formats exactly is a [`Error::BadDateTime`].
    pub fn parse(payload: &str) -> Result<Self> {
        let (date_part, time_part) = match payload.split_once(' ') {
            Some((date, time)) => (date, Some(time)),
            None => (payload, None),
        };

        let date = Date::parse(date_part, RECORD_DATE)
            .map_err(|_| Error::bad_date_time(payload))?;
        let time = time_part
            .map(|t| Time::parse(t, RECORD_TIME))
            .transpose()
            .map_err(|_| Error::bad_date_time(payload))?;

        Ok(Self { date, time })
    }

    /// Record form: `2023/12/02` or `2023/12/02 1800`, never a trailing space.
    pub fn to_record(&self) -> String {
        let date = format!(
            "{:04}/{:02}/{:02}",
            self.date.year(),
            u8::from(self.date.month()),
            self.date.day()
        );
        match self.time {
            Some(t) => format!("{date} {:02}{:02}", t.hour(), t.minute()),
            None => date,
        }
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.date.format(DISPLAY_DATE).map_err(|_| fmt::Error)?;
        f.write_str(&date)?;
        if let Some(t) = self.time {
            let time = t.format(DISPLAY_TIME).map_err(|_| fmt::Error)?;
            write!(f, " {time}")?;
        }
        Ok(())
    }
}

// --- Schedule: the kind-specific part of a task ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    Plain,
    Deadline(Moment),
    Event(Moment),
}

impl Schedule {
    pub fn kind(&self) -> TaskKind {
        match self {
            Schedule::Plain => TaskKind::Plain,
            Schedule::Deadline(_) => TaskKind::Deadline,
            Schedule::Event(_) => TaskKind::Event,
        }
    }

    pub fn moment(&self) -> Option<&Moment> {
        match self {
            Schedule::Plain => None,
            Schedule::Deadline(m) | Schedule::Event(m) => Some(m),
        }
    }
}

// --- Task Object ---
/// An immutable task value. "Changing" a task means building a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Task {
    description: String,
    done: bool,
    #[serde(flatten)]
    schedule: Schedule,
}

impl Task {
    /// Validating constructor.
    ///
    /// Fails with [`Error::InvalidTask`] when the description is empty or
    /// would break the record format, when a deadline/event has no date, or
    /// when a plain task is given one.
    pub fn new(
        kind: TaskKind,
        description: impl Into<String>,
        done: bool,
        date: Option<TaskDate>,
        time: Option<TaskTime>,
    ) -> Result<Self> {
        let description = description.into();
        validate_description(&description)?;

        let schedule = match (kind, date) {
            (TaskKind::Plain, None) if time.is_none() => Schedule::Plain,
            (TaskKind::Plain, _) => {
                return Err(Error::InvalidTask("a todo carries no date or time"));
            }
            (TaskKind::Deadline, Some(date)) => Schedule::Deadline(Moment::new(date, time)),
            (TaskKind::Event, Some(date)) => Schedule::Event(Moment::new(date, time)),
            (_, None) => return Err(Error::InvalidTask("deadlines and events need a date")),
        };

        Ok(Self {
            description,
            done,
            schedule,
        })
    }

    pub fn plain(description: impl Into<String>) -> Result<Self> {
        Self::new(TaskKind::Plain, description, false, None, None)
    }

    pub fn timed(kind: TimedKind, description: impl Into<String>, moment: Moment) -> Result<Self> {
        Self::new(kind.into(), description, false, Some(moment.date), moment.time)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn kind(&self) -> TaskKind {
        self.schedule.kind()
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn date(&self) -> Option<TaskDate> {
        self.schedule.moment().map(|m| m.date)
    }

    pub fn time(&self) -> Option<TaskTime> {
        self.schedule.moment().and_then(|m| m.time)
    }

    /// Copy of this task with `done` set; `self` is left untouched.
    pub fn mark_done(&self) -> Self {
        Self {
            done: true,
            ..self.clone()
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = if self.done { 'V' } else { 'X' };
        write!(f, "[{}][{}] {}", self.kind().code(), flag, self.description)?;
        match &self.schedule {
            Schedule::Plain => Ok(()),
            Schedule::Deadline(m) => write!(f, " (by: {m})"),
            Schedule::Event(m) => write!(f, " (at: {m})"),
        }
    }
}

/// Descriptions must be non-blank single-line text free of the field separator.
///
/// A trailing ` |` is refused too: followed by the separator it would read
/// back as `" | |"`, and splitting would cut the description one field early.
pub fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(Error::InvalidTask("description is empty"));
    }
    if description.contains(FIELD_SEPARATOR) || description.ends_with(" |") {
        return Err(Error::InvalidTask("description contains ` | `"));
    }
    if description.contains(['\n', '\r']) {
        return Err(Error::InvalidTask("description spans several lines"));
    }
    Ok(())
}
