use crate::{
    error::{Error, Result},
    model::Task,
};

/// Ordered, in-memory task collection. Positions are 0-based here; the
/// command layer converts from the 1-based numbers users type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Task> {
        self.tasks.get(index).ok_or_else(|| Error::NoSuchTask {
            index,
            len: self.tasks.len(),
        })
    }

    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn remove(&mut self, index: usize) -> Result<Task> {
        self.get(index)?;
        Ok(self.tasks.remove(index))
    }

    /// Swap the task at `index` for its done copy and return the new value.
    pub fn mark_done(&mut self, index: usize) -> Result<&Task> {
        let done = self.get(index)?.mark_done();
        self.tasks[index] = done;
        Ok(&self.tasks[index])
    }

    /// Tasks whose description contains `keyword`, with their 0-based positions.
    pub fn find<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = (usize, &'a Task)> + 'a {
        self.tasks
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.description().contains(keyword))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
