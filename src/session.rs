use log::debug;

use crate::{
    command::{Command, Reply},
    error::Result,
    storage::{LoadPolicy, Store},
    tasklist::TaskList,
};

/// A loaded task list bound to its store: input line in, reply out,
/// file rewritten after every change.
#[derive(Debug)]
pub struct Session {
    store: Store,
    tasks: TaskList,
}

impl Session {
    /// Load the store once. Under [`LoadPolicy::SkipMalformed`] dropped lines
    /// are logged by the store and otherwise forgotten.
    pub fn open(store: Store, policy: LoadPolicy) -> Result<Self> {
        let loaded = store.load(policy)?;
        Ok(Self {
            store,
            tasks: loaded.tasks.into(),
        })
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Parse and run one line. A failed parse or apply leaves list and file
    /// untouched; a failed save is returned after the list changed.
    pub fn handle(&mut self, line: &str) -> Result<Reply> {
        let command = Command::parse(line)?;
        self.execute(command)
    }

    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        let mutating = command.is_mutating();
        let reply = command.apply(&mut self.tasks)?;
        if mutating {
            self.store.save(self.tasks.as_slice())?;
            debug!("event=session_saved module=session tasks={}", self.tasks.len());
        }
        Ok(reply)
    }
}
