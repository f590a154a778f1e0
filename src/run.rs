use crate::aggregate::{Aggregator, FrequencyCounter, NgramTable};
use crate::config::RunConfig;
use crate::error::{KeyTallyError, KtResult};
use crate::export::{export_ngrams, write_frequency_file};
use crate::parser::KeystrokeReader;
use crate::source::iter_files;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Feeds every record of one keystroke log into `aggregator`.
/// Returns the number of records read.
pub fn process_keystroke_file<R: BufRead>(reader: R, aggregator: &mut Aggregator) -> KtResult<u64> {
    let mut records = 0;
    for record in KeystrokeReader::new(reader)? {
        aggregator.observe(&record?);
        records += 1;
    }
    Ok(records)
}

/// Dot-per-N-files progress indicator.
pub struct Progress<W: Write> {
    sink: W,
    interval: usize,
    printed: bool,
}

impl<W: Write> Progress<W> {
    pub fn new(sink: W, interval: usize) -> Self {
        Self {
            sink,
            interval,
            printed: false,
        }
    }

    /// Called with the running file count, before the file is processed.
    pub fn tick(&mut self, files: usize) {
        if self.interval > 0 && files % self.interval == 0 {
            // Progress is best effort; a closed stderr must not fail the run.
            let _ = write!(self.sink, ".");
            let _ = self.sink.flush();
            self.printed = true;
        }
    }

    /// Ends the dot line if any dots were written.
    pub fn finish(&mut self) {
        if self.printed {
            let _ = writeln!(self.sink);
            let _ = self.sink.flush();
        }
    }
}

/// Statistics over a fully parsed corpus.
#[derive(Debug)]
pub struct CorpusTally {
    pub files: usize,
    pub records: u64,
    pub counter: FrequencyCounter,
    pub ngrams: NgramTable,
}

/// Parses and aggregates every matching file under `root`.
///
/// The first failure aborts the run and comes back as
/// [`KeyTallyError::InFile`] naming `root` and the file being processed; no
/// partial statistics escape.
pub fn tally_corpus<W: Write>(
    root: &Path,
    patterns: &[String],
    progress: &mut Progress<W>,
) -> KtResult<CorpusTally> {
    let mut aggregator = Aggregator::new();
    let mut files = 0;
    let mut name: Option<String> = None;

    let result = (|| -> KtResult<()> {
        for source in iter_files(root, patterns)? {
            let source = source?;
            name = Some(source.name.clone());
            files += 1;
            progress.tick(files);

            let records = process_keystroke_file(source.open()?, &mut aggregator)?;
            debug!("{}: {} records", source.name, records);
        }
        Ok(())
    })();

    if let Err(e) = result {
        return Err(KeyTallyError::InFile {
            root: root.display().to_string(),
            name: name.unwrap_or_else(|| "<none>".to_string()),
            source: Box::new(e),
        });
    }
    progress.finish();

    let records = aggregator.records();
    let (counter, ngrams) = aggregator.into_parts();
    info!(
        "Tallied {} records from {} files ({} distinct pairs)",
        records,
        files,
        counter.len()
    );
    Ok(CorpusTally {
        files,
        records,
        counter,
        ngrams,
    })
}

/// Writes the frequency table and the n-gram files into `dest`.
/// Returns every path written, frequency table first.
pub fn write_outputs(tally: &CorpusTally, dest: &Path, config: &RunConfig) -> KtResult<Vec<PathBuf>> {
    let table_path = dest.join(&config.output_name);
    write_frequency_file(&table_path, &tally.counter)?;

    let mut written = vec![table_path];
    written.extend(export_ngrams(
        &tally.ngrams,
        config.max_sample_length,
        dest,
    )?);
    info!("Wrote {} output files to {}", written.len(), dest.display());
    Ok(written)
}
