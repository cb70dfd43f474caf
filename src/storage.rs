// --- Flat-file persistence: one record per line, full rewrite on save ---

use std::{
    fs,
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use log::{info, warn};
use tempfile::NamedTempFile; // For atomic writes

use crate::{
    codec,
    error::{Error, Result},
    model::Task,
};

/// What to do with a record that does not decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Abort the load on the first bad line.
    #[default]
    Strict,
    /// Drop bad lines, keep the rest, and report every drop.
    SkipMalformed,
}

/// Result of a load: tasks in file order plus any lines that were skipped.
#[derive(Debug, Default)]
pub struct Loaded {
    pub tasks: Vec<Task>,
    pub skipped: Vec<Error>,
}

/// Owns the store path. Single reader/writer per process.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record. A missing file is an empty store; its parent
    /// directory is created so the first save succeeds.
    pub fn load(&self, policy: LoadPolicy) -> Result<Loaded> {
        let dir = parent_dir(&self.path);
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "event=store_load module=storage status=empty path={}",
                    self.path.display()
                );
                return Ok(Loaded::default());
            }
            Err(e) => return Err(Error::io(&self.path, e)),
        };

        let loaded = decode_all(&text, policy)?;
        info!(
            "event=store_load module=storage status=ok tasks={} skipped={} path={}",
            loaded.tasks.len(),
            loaded.skipped.len(),
            self.path.display()
        );
        Ok(loaded)
    }

    /// Replace the whole file with `tasks`, one record per line.
    ///
    /// Goes through a temp file in the same directory and a rename, so a
    /// crash mid-write leaves the previous contents in place.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let dir = parent_dir(&self.path);
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
        write_synced(&mut tmp, &render(tasks)).map_err(|e| Error::io(tmp.path(), e))?;

        tmp.persist(&self.path)
            .map_err(|e| Error::io(&self.path, e.error))?;

        info!(
            "event=store_save module=storage status=ok tasks={} path={}",
            tasks.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Encode every task, each line newline-terminated.
pub fn render(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|task| codec::encode(task) + "\n")
        .collect()
}

/// Decode a whole store body; line numbers in errors are 1-based.
pub fn decode_all(text: &str, policy: LoadPolicy) -> Result<Loaded> {
    let mut loaded = Loaded::default();
    for (i, line) in text.lines().enumerate() {
        match codec::decode(line, i + 1) {
            Ok(task) => loaded.tasks.push(task),
            Err(e) if policy == LoadPolicy::SkipMalformed => {
                warn!("event=record_skipped module=storage line={} reason=\"{e}\"", i + 1);
                loaded.skipped.push(e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(loaded)
}

fn write_synced(tmp: &mut NamedTempFile, body: &str) -> io::Result<()> {
    tmp.write_all(body.as_bytes())?;
    // push os buffers
    tmp.flush()?;
    tmp.as_file().sync_all()
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
