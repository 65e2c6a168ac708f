//! Append-only chat transcript, one file per session.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

pub struct Transcript {
    path: PathBuf,
}

impl Transcript {
    /// `<dir>/chat_history_<YYYY-MM-DD_HH-MM-SS>.txt`. Nothing is created until
    /// the first exchange is recorded.
    pub fn new(dir: &Path, started: NaiveDateTime) -> Self {
        let name = format!("chat_history_{}.txt", started.format("%Y-%m-%d_%H-%M-%S"));
        Self {
            path: dir.join(name),
        }
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one exchange.
    pub fn record(&self, user: &str, reply: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write!(file, "You: {user}\n\nModel: {reply}\n\n")?;
        file.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
