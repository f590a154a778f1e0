use crate::aggregate::{FrequencyCounter, NgramKey, NgramTable};
use crate::error::KtResult;
use crate::escape::escape_string;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Serialize)]
struct FrequencyRow<'a> {
    key_name: String,
    key_code: &'a str,
    count: u64,
}

#[derive(Serialize)]
struct SampleRow {
    sample: String,
    count: u64,
}

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer)
}

/// Writes `<escaped key name>\t<key code>\t<count>` rows, most frequent first.
pub fn write_frequency_table<W: Write>(writer: W, counter: &FrequencyCounter) -> KtResult<()> {
    let mut wtr = tsv_writer(writer);
    for (key, count) in counter.most_common() {
        wtr.serialize(FrequencyRow {
            key_name: escape_string(&key.key_name),
            key_code: &key.key_code,
            count,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_frequency_file(path: &Path, counter: &FrequencyCounter) -> KtResult<()> {
    let file = File::create(path)?;
    write_frequency_table(file, counter)?;
    debug!("Wrote {} pairs to {}", counter.len(), path.display());
    Ok(())
}

fn bounded_sample(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

const NGRAM_FILE_PREFIX: &str = "ngrams-";
const NGRAM_FILE_SUFFIX: &str = ".tsv";

/// File name used for one n-gram table, e.g. `ngrams-1-ci.tsv`.
pub fn ngram_file_name(key: NgramKey) -> String {
    format!("{}{}-{}{}", NGRAM_FILE_PREFIX, key.length, key.fold, NGRAM_FILE_SUFFIX)
}

/// True when `name` falls in the `ngrams-*.tsv` namespace of [`export_ngrams`].
pub fn is_ngram_file_name(name: &str) -> bool {
    name.starts_with(NGRAM_FILE_PREFIX) && name.ends_with(NGRAM_FILE_SUFFIX)
}

/// Writes every table in `ngrams` to its own file under `dest`.
///
/// Rows are `<escaped sample>\t<count>`, most frequent first. Sample text is cut
/// to `max_sample_length` characters before escaping. Returns the written
/// paths in table order.
pub fn export_ngrams(
    ngrams: &NgramTable,
    max_sample_length: usize,
    dest: &Path,
) -> KtResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(ngrams.len());
    for (key, tally) in ngrams.iter() {
        let path = dest.join(ngram_file_name(*key));
        let mut wtr = tsv_writer(File::create(&path)?);
        for (ch, count) in tally.most_common() {
            wtr.serialize(SampleRow {
                sample: escape_string(&bounded_sample(&ch.to_string(), max_sample_length)),
                count,
            })?;
        }
        wtr.flush()?;
        debug!("Wrote {} samples to {}", tally.len(), path.display());
        written.push(path);
    }
    Ok(written)
}
