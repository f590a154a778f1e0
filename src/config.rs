use crate::error::{KeyTallyError, KtResult};
use crate::export::is_ngram_file_name;
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;
pub const DEFAULT_MAX_SAMPLE_LENGTH: usize = 256;
pub const DEFAULT_OUTPUT_NAME: &str = "dfko.tsv";

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Print a progress dot to stderr after this many files (0 disables).
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    pub progress_interval: usize,

    /// Longest sample text written to the n-gram files, in characters.
    #[arg(long, default_value_t = DEFAULT_MAX_SAMPLE_LENGTH)]
    pub max_sample_length: usize,

    /// File name of the key frequency table inside the destination directory.
    #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
    pub output_name: String,

    /// Show the N most frequent pairs as a table on stdout (0 disables).
    #[arg(long, default_value_t = 0)]
    pub top: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            max_sample_length: DEFAULT_MAX_SAMPLE_LENGTH,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            top: 0,
        }
    }
}

impl RunConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> KtResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            KeyTallyError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Copies values the user typed on the command line over file values.
    pub fn merge_from_cli(&mut self, cli: &RunConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(progress_interval, "progress_interval");
        update_if_present!(max_sample_length, "max_sample_length");
        update_if_present!(output_name, "output_name");
        update_if_present!(top, "top");
    }

    pub fn validate(&self) -> KtResult<()> {
        if self.max_sample_length == 0 {
            return Err(KeyTallyError::Config(
                "max_sample_length must be at least 1".into(),
            ));
        }
        let name = Path::new(&self.output_name);
        if self.output_name.is_empty() || name.file_name() != Some(name.as_os_str()) {
            return Err(KeyTallyError::Config(format!(
                "output_name must be a plain file name, got '{}'",
                self.output_name
            )));
        }
        if is_ngram_file_name(&self.output_name) {
            return Err(KeyTallyError::Config(format!(
                "output_name '{}' collides with the n-gram output files",
                self.output_name
            )));
        }
        Ok(())
    }
}

/// Expands a leading `~` and makes the path absolute, resolving symlinks when
/// the path exists.
pub fn resolve_path(raw: &str) -> PathBuf {
    let expanded = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(raw),
        },
        _ => PathBuf::from(raw),
    };
    fs::canonicalize(&expanded)
        .or_else(|_| std::path::absolute(&expanded))
        .unwrap_or(expanded)
}
