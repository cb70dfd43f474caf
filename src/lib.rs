//! Personal task tracker: a line-based command language over a flat-file store.
//!
//! Input lines become [`Command`]s, commands change a [`TaskList`], and the
//! list is written back through the record [`codec`] by a [`Store`].

pub mod codec;
pub mod command;
pub mod error;
pub mod model;
pub mod session;
pub mod storage;
pub mod tasklist;

pub use command::{Command, Reply};
pub use error::{Error, Result};
pub use model::{Moment, Schedule, Task, TaskKind, TimedKind};
pub use session::Session;
pub use storage::{LoadPolicy, Loaded, Store};
pub use tasklist::TaskList;
