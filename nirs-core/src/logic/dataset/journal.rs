use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::record::Record;
use crate::logic::error::{PipelineError, PipelineResult};

/// Append-only JSONL file backing a durable `DatasetStore`.
/// One line per batch (`{"batch": n, "records": [..]}`), one `write_all` per
/// line. A line that did not make it to disk whole is dropped on replay, so
/// a batch comes back complete or not at all.
pub struct Journal {
    file: File,
    path: PathBuf,
    len: u64,
    batches: u64,
}

#[derive(Serialize)]
struct FrameOut<'a> {
    batch: u64,
    records: &'a [Record],
}

#[derive(Deserialize)]
struct FrameIn {
    records: Vec<Record>,
}

impl Journal {
    /// Open (or create) the journal and replay its records
    pub fn open(path: &Path) -> PipelineResult<(Self, Vec<Record>)> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = if path.exists() {
            fs::read_to_string(path)?
        } else {
            String::new()
        };
        let Replay { records, batches, valid_len, needs_newline } = replay(&content, path)?;

        let mut file = OpenOptions::new().create(true).read(true).write(true).open(path)?;
        if valid_len < content.len() as u64 {
            log::warn!(
                "Dropping torn tail of journal {} ({} bytes)",
                path.display(),
                content.len() as u64 - valid_len
            );
            file.set_len(valid_len)?;
        }
        file.seek(SeekFrom::Start(valid_len))?;

        let mut len = valid_len;
        if needs_newline {
            file.write_all(b"\n")?;
            len += 1;
        }

        log::info!(
            "Journal {} replayed: {} records in {} batches",
            path.display(),
            records.len(),
            batches
        );

        Ok((
            Self {
                file,
                path: path.to_path_buf(),
                len,
                batches,
            },
            records,
        ))
    }

    /// Write a whole batch; on failure the file is cut back to its previous length
    pub fn append_batch(&mut self, records: &[Record]) -> PipelineResult<()> {
        let frame = FrameOut {
            batch: self.batches,
            records,
        };
        let mut buf = serde_json::to_string(&frame)?;
        buf.push('\n');

        let result = self
            .file
            .write_all(buf.as_bytes())
            .and_then(|_| self.file.flush())
            .and_then(|_| self.file.sync_data());

        match result {
            Ok(()) => {
                self.len += buf.len() as u64;
                self.batches += 1;
                Ok(())
            }
            Err(e) => {
                log::error!("Journal write failed on {}: {}", self.path.display(), e);
                let len = self.len;
                let rollback = self
                    .file
                    .set_len(len)
                    .and_then(|_| self.file.seek(SeekFrom::Start(len)));
                if let Err(e) = rollback {
                    log::error!("Journal rollback failed: {}", e);
                }
                Err(PipelineError::Storage("failed to persist batch".to_string()))
            }
        }
    }
}

/// Records recovered from a journal file
struct Replay {
    records: Vec<Record>,
    batches: u64,
    /// Byte length of the valid prefix
    valid_len: u64,
    /// Last record is not newline-terminated
    needs_newline: bool,
}

/// Parse journal content. Only an unterminated final line may be malformed.
fn replay(content: &str, path: &Path) -> PipelineResult<Replay> {
    let mut records = Vec::new();
    let mut batches = 0u64;
    let mut offset = 0u64;
    let mut needs_newline = false;

    for (line_no, line) in content.split_inclusive('\n').enumerate() {
        let terminated = line.ends_with('\n');
        let body = line.trim();

        if body.is_empty() {
            offset += line.len() as u64;
            continue;
        }

        match serde_json::from_str::<FrameIn>(body) {
            Ok(frame) => {
                records.extend(frame.records);
                batches += 1;
                offset += line.len() as u64;
                needs_newline = !terminated;
            }
            Err(_) if !terminated => break,
            Err(e) => {
                return Err(PipelineError::Storage(format!(
                    "corrupt journal {} at line {}: {}",
                    path.display(),
                    line_no + 1,
                    e
                )));
            }
        }
    }

    Ok(Replay {
        records,
        batches,
        valid_len: offset,
        needs_newline,
    })
}
