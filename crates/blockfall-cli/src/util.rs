use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use blockfall_engine::SessionConfig;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }

    /// Writes `value` as a single compact JSON line.
    pub fn write_json_line<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON line to {}", self.display_path()))?;
        writeln!(&mut *self)
            .with_context(|| format!("Failed to write newline to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Session config sources shared by subcommands: an optional JSON file,
/// then individual flag overrides.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SessionConfigArg {
    /// Session config JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of pieces in the next queue (1-7)
    #[arg(long)]
    next_queue_len: Option<usize>,
    /// Lock delay in milliseconds
    #[arg(long)]
    lock_delay_ms: Option<u64>,
    /// Grounded resets allowed before a forced lock
    #[arg(long)]
    max_lock_resets: Option<u32>,
    /// Countdown length in seconds
    #[arg(long, conflicts_with = "untimed")]
    time_limit_secs: Option<u64>,
    /// Play without a countdown
    #[arg(long)]
    untimed: bool,
}

impl SessionConfigArg {
    pub fn load(&self) -> anyhow::Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => read_json_file("session config", path)?,
            None => SessionConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate().context("Invalid session config")?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut SessionConfig) {
        if let Some(len) = self.next_queue_len {
            config.next_queue_len = len;
        }
        if let Some(ms) = self.lock_delay_ms {
            config.lock_delay_ms = ms;
        }
        if let Some(resets) = self.max_lock_resets {
            config.max_lock_resets = resets;
        }
        if let Some(secs) = self.time_limit_secs {
            config.time_limit_secs = Some(secs);
        }
        if self.untimed {
            config.time_limit_secs = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let arg = SessionConfigArg {
            next_queue_len: Some(3),
            untimed: true,
            ..SessionConfigArg::default()
        };
        let mut config = SessionConfig::default();
        arg.apply_overrides(&mut config);
        assert_eq!(config.next_queue_len, 3);
        assert_eq!(config.time_limit_secs, None);
        assert_eq!(config.lock_delay_ms, 500);
    }

    #[test]
    fn test_load_rejects_invalid_overrides() {
        let arg = SessionConfigArg {
            lock_delay_ms: Some(0),
            ..SessionConfigArg::default()
        };
        let err = arg.load().unwrap_err();
        assert!(format!("{err:#}").contains("lock delay must be positive"));
    }
}
