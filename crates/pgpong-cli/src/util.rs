use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::Utc;
use pgpong_policy::network::PolicyParameters;
use pgpong_training::checkpoint::{BatchOutcome, CheckpointSink};
use serde::{Serialize, de::DeserializeOwned};

use crate::schema::checkpoint::{HistoryFile, WeightsFile};

/// Where a JSON document goes: a file, or stdout when no path is given.
pub struct JsonOutput {
    writer: Box<dyn Write>,
    target: String,
}

impl JsonOutput {
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self {
                writer: Box::new(io::stdout().lock()),
                target: "stdout".to_owned(),
            });
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
            target: path.display().to_string(),
        })
    }

    /// Writes `value` as pretty JSON followed by a newline, then flushes.
    pub fn write<T>(mut self, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .with_context(|| format!("Failed to write JSON to {}", self.target))?;
        self.writer
            .write_all(b"\n")
            .and_then(|()| self.writer.flush())
            .with_context(|| format!("Failed to finish writing {}", self.target))
    }
}

pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    JsonOutput::create(path)?.write(value)
}

pub fn read_json_file<T>(file_kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

/// Read saved policy weights from a JSON file
pub fn read_weights_file(path: &Path) -> anyhow::Result<WeightsFile> {
    read_json_file("weights", path)
}

/// Read the batch outcome history from a JSON file
pub fn read_history_file(path: &Path) -> anyhow::Result<HistoryFile> {
    read_json_file("history", path)
}

/// Writes checkpoints as JSON files into one directory.
///
/// - `weights-<batch>.json` - a [`WeightsFile`] per checkpoint
/// - `history.json` - the [`HistoryFile`], rewritten every checkpoint
#[derive(Debug, Clone)]
pub struct JsonCheckpointDir {
    dir: PathBuf,
}

impl JsonCheckpointDir {
    pub fn create(dir: PathBuf) -> anyhow::Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create checkpoint directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn weights_path(&self, batch: usize) -> PathBuf {
        self.dir.join(format!("weights-{batch}.json"))
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join("history.json")
    }
}

impl CheckpointSink for JsonCheckpointDir {
    type Error = anyhow::Error;

    fn save(
        &mut self,
        batch: usize,
        params: &PolicyParameters,
        history: &[BatchOutcome],
    ) -> anyhow::Result<()> {
        let weights_path = self.weights_path(batch);
        eprintln!("Writing W1, W2 to {}", weights_path.display());
        let weights = WeightsFile {
            trained_at: Utc::now(),
            batch,
            params: params.clone(),
        };
        save_json(&weights, Some(&weights_path))?;

        let history = HistoryFile {
            batches: history.to_vec(),
        };
        save_json(&history, Some(&self.history_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pgpong-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_checkpoint_dir_writes_weights_and_history() {
        let dir = scratch_dir("checkpoint");
        let mut sink = JsonCheckpointDir::create(dir.clone()).unwrap();
        let params = PolicyParameters::zeros(2, 3);
        let history = [
            BatchOutcome {
                losses: 21.0,
                wins: 1.0,
            },
            BatchOutcome {
                losses: 19.0,
                wins: 4.0,
            },
        ];
        sink.save(3, &params, &history).unwrap();

        let weights = read_weights_file(&dir.join("weights-3.json")).unwrap();
        assert_eq!(weights.batch, 3);
        assert_eq!(weights.params, params);
        let saved = read_history_file(&sink.history_path()).unwrap();
        assert_eq!(saved.batches, history);

        sink.save(4, &params, &history[..1]).unwrap();
        assert!(sink.weights_path(3).exists());
        assert_eq!(read_history_file(&sink.history_path()).unwrap().batches.len(), 1);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_json_file_ends_with_newline() {
        let dir = scratch_dir("newline");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("history.json");
        save_json(&HistoryFile::default(), Some(&path)).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_reports_kind_and_path() {
        let path = scratch_dir("missing").join("weights-0.json");
        let err = read_weights_file(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("weights"), "{message}");
        assert!(message.contains("weights-0.json"), "{message}");
    }
}
