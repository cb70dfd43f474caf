// --- Command language: one input line -> one Command ---

use std::{fmt::Write as _, str::FromStr};

use log::debug;

use crate::{
    error::{Error, Result},
    model::{Moment, Task, TimedKind, validate_description},
    tasklist::TaskList,
};

/// Shortest tail, measured from the marker's slash, that can hold a
/// timestamp: the marker, one separator character and one more.
const MIN_MARKER_TAIL: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddPlain(String),
    AddTimed {
        kind: TimedKind,
        description: String,
        moment: Moment,
    },
    /// 0-based position.
    Delete(usize),
    /// 0-based position.
    MarkDone(usize),
    List,
    Find(String),
    Exit,
}

/// What the caller shows after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub message: String,
    pub exit: bool,
}

impl Reply {
    fn say(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit: false,
        }
    }
}

// --- Tokenizer: command word plus the raw remainder ---
struct Words<'a> {
    name: &'a str,
    rest: Option<&'a str>,
}

impl<'a> Words<'a> {
    fn split(line: &'a str) -> Self {
        let line = line.trim();
        match line.split_once(' ') {
            Some((name, rest)) => Self {
                name,
                rest: Some(rest),
            },
            None => Self { name: line, rest: None },
        }
    }

    /// First token after the command word as a 0-based index.
    fn index(&self) -> Result<usize> {
        self.rest
            .and_then(|rest| rest.split(' ').next())
            .and_then(|token| token.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .ok_or(Error::NotANumber)
    }
}

impl Command {
    /// Parse one raw input line. Either a whole command comes back or an error;
    /// nothing is applied here.
    pub fn parse(input: &str) -> Result<Self> {
        let words = Words::split(input);
        let command = match words.name {
            "bye" => Command::Exit,
            "list" => Command::List,
            "find" => {
                let keyword = words.rest.ok_or(Error::EmptyArgument("find"))?;
                Command::Find(keyword.to_owned())
            }
            "done" => Command::MarkDone(words.index()?),
            "delete" => Command::Delete(words.index()?),
            "todo" => parse_todo(words.rest)?,
            "deadline" => parse_timed(TimedKind::Deadline, words.rest)?,
            "event" => parse_timed(TimedKind::Event, words.rest)?,
            other => return Err(Error::UnknownCommand(other.to_owned())),
        };
        debug!("event=command_parsed module=command name={}", words.name);
        Ok(command)
    }

    /// Whether applying this command changes the list (and so needs a save).
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::AddPlain(_)
                | Command::AddTimed { .. }
                | Command::Delete(_)
                | Command::MarkDone(_)
        )
    }

    /// Run the command against the list. Index bounds are checked here.
    pub fn apply(self, tasks: &mut TaskList) -> Result<Reply> {
        let reply = match self {
            Command::AddPlain(description) => added(tasks, Task::plain(description)?),
            Command::AddTimed {
                kind,
                description,
                moment,
            } => added(tasks, Task::timed(kind, description, moment)?),
            Command::Delete(index) => {
                let removed = tasks.remove(index)?;
                Reply::say(format!(
                    "Noted. I've removed this task:\n  {removed}\n{}",
                    count_line(tasks)
                ))
            }
            Command::MarkDone(index) => {
                let done = tasks.mark_done(index)?;
                Reply::say(format!("Nice! I've marked this task as done:\n  {done}"))
            }
            Command::List => {
                if tasks.is_empty() {
                    Reply::say("Your list is empty.")
                } else {
                    let numbered = tasks.iter().enumerate();
                    Reply::say(listing("Here are the tasks in your list:", numbered))
                }
            }
            Command::Find(keyword) => {
                let mut hits = tasks.find(&keyword).peekable();
                if hits.peek().is_none() {
                    Reply::say(format!("No tasks match `{keyword}`."))
                } else {
                    Reply::say(listing("Here are the matching tasks in your list:", hits))
                }
            }
            Command::Exit => Reply {
                message: "Bye. Hope to see you again soon!".to_owned(),
                exit: true,
            },
        };
        Ok(reply)
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Command::parse(s)
    }
}

fn parse_todo(rest: Option<&str>) -> Result<Command> {
    let info = rest.ok_or(Error::EmptyDescription)?;
    if info.starts_with('/') {
        return Err(Error::EmptyDescription);
    }
    if info.contains('/') {
        return Err(Error::UnexpectedTimestamp);
    }
    validate_description(info)?;
    Ok(Command::AddPlain(info.to_owned()))
}

fn parse_timed(kind: TimedKind, rest: Option<&str>) -> Result<Command> {
    let info = rest.ok_or(Error::EmptyDescription)?;
    if info.starts_with('/') {
        return Err(Error::EmptyDescription);
    }

    let marker = kind.marker();
    let Some(at) = info.find(marker) else {
        return Err(Error::MissingTimestamp {
            kind,
            marker_found: false,
        });
    };
    let (head, tail) = info.split_at(at);
    if tail.len() < MIN_MARKER_TAIL {
        return Err(Error::MissingTimestamp {
            kind,
            marker_found: true,
        });
    }

    let description = head.strip_suffix(' ').unwrap_or(head);
    if description.trim().is_empty() {
        return Err(Error::EmptyDescription);
    }
    validate_description(description)?;

    // The payload starts one character past the marker, whatever that character is.
    let mut after_marker = tail[marker.len()..].chars();
    after_marker.next();
    let moment = Moment::parse(after_marker.as_str())?;

    Ok(Command::AddTimed {
        kind,
        description: description.to_owned(),
        moment,
    })
}

fn added(tasks: &mut TaskList, task: Task) -> Reply {
    let shown = task.to_string();
    tasks.add(task);
    Reply::say(format!(
        "Got it. I've added this task:\n  {shown}\n{}",
        count_line(tasks)
    ))
}

fn count_line(tasks: &TaskList) -> String {
    match tasks.len() {
        1 => "Now you have 1 task in the list.".to_owned(),
        n => format!("Now you have {n} tasks in the list."),
    }
}

fn listing<'a>(header: &str, numbered: impl Iterator<Item = (usize, &'a Task)>) -> String {
    let mut out = header.to_owned();
    for (index, task) in numbered {
        let _ = write!(out, "\n{}.{task}", index + 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    fn parse_err(input: &str) -> Error {
        Command::parse(input).unwrap_err()
    }

    #[test]
    fn simple_commands() {
        assert_eq!(Command::parse("bye").unwrap(), Command::Exit);
        assert_eq!(Command::parse("  list  ").unwrap(), Command::List);
        assert_eq!(
            Command::parse("find book").unwrap(),
            Command::Find("book".to_owned())
        );
        assert_eq!(
            Command::parse("find two words").unwrap(),
            Command::Find("two words".to_owned())
        );
    }

    #[test]
    fn find_needs_a_keyword() {
        assert!(matches!(parse_err("find"), Error::EmptyArgument("find")));
        assert!(matches!(parse_err("find   "), Error::EmptyArgument(_)));
    }

    #[test]
    fn indices_are_converted_to_zero_based() {
        assert_eq!(Command::parse("done 1").unwrap(), Command::MarkDone(0));
        assert_eq!(Command::parse("delete 12").unwrap(), Command::Delete(11));
        assert_eq!(Command::parse("delete 3 extra").unwrap(), Command::Delete(2));
    }

    #[test]
    fn bad_indices_are_not_numbers() {
        for input in [
            "done",
            "done abc",
            "done 0",
            "done -1",
            "done 1.5",
            "delete  2",
            "delete 99999999999999999999999",
        ] {
            assert!(matches!(parse_err(input), Error::NotANumber), "{input}");
        }
    }

    #[test]
    fn todo_grammar() {
        assert_eq!(
            Command::parse("todo read book").unwrap(),
            Command::AddPlain("read book".to_owned())
        );
        assert!(matches!(parse_err("todo "), Error::EmptyDescription));
        assert!(matches!(parse_err("todo"), Error::EmptyDescription));
        assert!(matches!(parse_err("todo /by x"), Error::EmptyDescription));
        assert!(matches!(
            parse_err("todo read /by 2023/12/02"),
            Error::UnexpectedTimestamp
        ));
        assert!(matches!(parse_err("todo a | b"), Error::InvalidTask(_)));
    }

    #[test]
    fn deadline_with_date_and_time() {
        assert_eq!(
            Command::parse("deadline return book /by 2023/12/02 1800").unwrap(),
            Command::AddTimed {
                kind: TimedKind::Deadline,
                description: "return book".to_owned(),
                moment: Moment::new(date!(2023 - 12 - 02), Some(time!(18:00))),
            }
        );
    }

    #[test]
    fn event_with_date_only() {
        assert_eq!(
            Command::parse("event meeting /at 2023/12/02").unwrap(),
            Command::AddTimed {
                kind: TimedKind::Event,
                description: "meeting".to_owned(),
                moment: Moment::new(date!(2023 - 12 - 02), None),
            }
        );
    }

    #[test]
    fn timed_descriptions_may_contain_other_slashes() {
        let Command::AddTimed { description, .. } =
            Command::parse("deadline read a/b testing /by 2023/12/02").unwrap()
        else {
            panic!("expected a timed command");
        };
        assert_eq!(description, "read a/b testing");
    }

    #[test]
    fn payload_skips_exactly_one_character_after_marker() {
        let Command::AddTimed { moment, .. } = Command::parse("event x /atX2023/12/02").unwrap()
        else {
            panic!("expected a timed command");
        };
        assert_eq!(moment, Moment::new(date!(2023 - 12 - 02), None));
    }

    #[test]
    fn timed_grammar_errors() {
        assert!(matches!(parse_err("deadline"), Error::EmptyDescription));
        assert!(matches!(parse_err("deadline /by 2023/12/02"), Error::EmptyDescription));
        assert!(matches!(parse_err("event  /at 2023/12/02"), Error::EmptyDescription));
        assert!(matches!(
            parse_err("deadline x /by"),
            Error::MissingTimestamp {
                kind: TimedKind::Deadline,
                marker_found: true
            }
        ));
        assert!(matches!(
            parse_err("event x /at1"),
            Error::MissingTimestamp { marker_found: true, .. }
        ));
        assert!(matches!(
            parse_err("deadline x /at 2023/12/02"),
            Error::MissingTimestamp {
                kind: TimedKind::Deadline,
                marker_found: false
            }
        ));
        assert!(matches!(
            parse_err("event x 2023/12/02"),
            Error::MissingTimestamp {
                kind: TimedKind::Event,
                marker_found: false
            }
        ));
    }

    #[test]
    fn timed_bad_payloads() {
        for input in [
            "deadline x /by 02/12/2023",
            "deadline x /by 2023/12/02 6pm",
            "event x /at tomorrow",
            "event x /at 2023/12/02 18:00",
            "deadline x /by2023/12/02",
        ] {
            let err = parse_err(input);
            assert!(matches!(err, Error::BadDateTime { line: None, .. }), "{input}");
            assert!(err.to_string().contains("yyyy/MM/dd HHmm"));
        }
    }

    #[test]
    fn unknown_commands() {
        assert!(matches!(parse_err("foo bar"), Error::UnknownCommand(name) if name == "foo"));
        assert!(matches!(parse_err(""), Error::UnknownCommand(_)));
        assert!(matches!(parse_err("LIST"), Error::UnknownCommand(_)));
    }

    #[test]
    fn only_list_changers_are_mutating() {
        assert!(Command::AddPlain("x".into()).is_mutating());
        assert!(Command::Delete(0).is_mutating());
        assert!(Command::MarkDone(0).is_mutating());
        assert!(!Command::List.is_mutating());
        assert!(!Command::Find("x".into()).is_mutating());
        assert!(!Command::Exit.is_mutating());
    }

    #[test]
    fn apply_walks_through_a_session() {
        let mut tasks = TaskList::new();

        let reply = "todo read book".parse::<Command>().unwrap().apply(&mut tasks).unwrap();
        assert!(reply.message.contains("[T][X] read book"));
        assert!(reply.message.ends_with("Now you have 1 task in the list."));

        "deadline return book /by 2023/12/02 1800"
            .parse::<Command>()
            .unwrap()
            .apply(&mut tasks)
            .unwrap();

        let reply = Command::MarkDone(1).apply(&mut tasks).unwrap();
        assert!(reply.message.contains("[D][V] return book (by: Dec 2 2023 18:00)"));

        let reply = Command::List.apply(&mut tasks).unwrap();
        assert_eq!(
            reply.message,
            "Here are the tasks in your list:\n\
             1.[T][X] read book\n\
             2.[D][V] return book (by: Dec 2 2023 18:00)"
        );

        let reply = Command::Find("return".into()).apply(&mut tasks).unwrap();
        assert!(reply.message.ends_with("\n2.[D][V] return book (by: Dec 2 2023 18:00)"));

        let reply = Command::Find("nothing".into()).apply(&mut tasks).unwrap();
        assert_eq!(reply.message, "No tasks match `nothing`.");

        assert!(matches!(
            Command::Delete(2).apply(&mut tasks),
            Err(Error::NoSuchTask { index: 2, len: 2 })
        ));

        let reply = Command::Delete(0).apply(&mut tasks).unwrap();
        assert!(reply.message.contains("[T][X] read book"));
        assert_eq!(tasks.len(), 1);

        assert!(Command::Exit.apply(&mut tasks).unwrap().exit);
    }

    #[test]
    fn empty_list_reply() {
        let reply = Command::List.apply(&mut TaskList::new()).unwrap();
        assert_eq!(reply.message, "Your list is empty.");
    }
}
