use crate::decode::Latin1Lines;
use crate::error::{KeyTallyError, KtResult};
use crate::record::{
    KeystrokeRecord, EXPECTED_HEADER_LINE, FIELD_COUNT, KEY_NAME_LITERAL_LF, KEY_NAME_LITERAL_TAB,
};
use std::io::BufRead;
use std::iter::FusedIterator;

const COLUMN_COUNT_LITERAL_LF: usize = 8;
const COLUMN_COUNT_NORMAL: usize = FIELD_COUNT;
const COLUMN_COUNT_LITERAL_TAB: usize = 10;

// Slots that hold the split artifact in both recovery shapes.
const ARTIFACT_SLOT: usize = 7;

/// Lazy reader of keystroke records from a single log file.
///
/// The header is checked by [`KeystrokeReader::new`]. Iteration yields one
/// record per logical keystroke; a line split by a literal LF is merged with
/// the following physical line, and a literal TAB column is collapsed. The
/// first error ends the sequence and carries the physical line number where it
/// was detected.
pub struct KeystrokeReader<R> {
    lines: Latin1Lines<R>,
    line_index: usize,
    done: bool,
}

impl<R: BufRead> KeystrokeReader<R> {
    pub fn new(reader: R) -> KtResult<Self> {
        let mut this = Self {
            lines: Latin1Lines::new(reader),
            line_index: 0,
            done: false,
        };
        if let Err(e) = this.check_header() {
            return Err(KeyTallyError::at_line(this.line_index, e));
        }
        Ok(this)
    }

    /// Number of physical lines consumed so far, header included.
    pub fn line_index(&self) -> usize {
        self.line_index
    }

    fn check_header(&mut self) -> KtResult<()> {
        self.line_index += 1;
        let header = self.lines.next_line()?.unwrap_or_default();
        if header != EXPECTED_HEADER_LINE {
            return Err(KeyTallyError::Format(format!(
                "unexpected header line: '{}'",
                header
            )));
        }
        Ok(())
    }

    fn read_record(&mut self) -> KtResult<Option<KeystrokeRecord>> {
        self.line_index += 1;
        let Some(line) = self.lines.next_line()? else {
            return Ok(None);
        };

        let mut fields = split_fields(&line);
        match fields.len() {
            COLUMN_COUNT_NORMAL => {}
            COLUMN_COUNT_LITERAL_LF => {
                // Line feed inside a field: the record continues on the next line.
                self.line_index += 1;
                let Some(next_line) = self.lines.next_line()? else {
                    return Err(unexpected_format(&fields));
                };
                fields.extend(split_fields(&next_line));
                collapse_artifact(&mut fields, KEY_NAME_LITERAL_LF)?;
            }
            COLUMN_COUNT_LITERAL_TAB => collapse_artifact(&mut fields, KEY_NAME_LITERAL_TAB)?,
            _ => return Err(unexpected_format(&fields)),
        }

        let fields: [String; FIELD_COUNT] = fields
            .try_into()
            .map_err(|fields: Vec<String>| unexpected_format(&fields))?;
        KeystrokeRecord::try_from_fields(fields).map(Some)
    }
}

impl<R: BufRead> Iterator for KeystrokeReader<R> {
    type Item = KtResult<KeystrokeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(KeyTallyError::at_line(self.line_index, e)))
            }
        }
    }
}

impl<R: BufRead> FusedIterator for KeystrokeReader<R> {}

fn split_fields(line: &str) -> Vec<String> {
    line.split('\t').map(str::to_owned).collect()
}

fn unexpected_format(fields: &[String]) -> KeyTallyError {
    KeyTallyError::Format(format!("unexpected format: {:?}", fields))
}

/// Drops the empty artifact column and writes `sentinel` into the key name slot.
fn collapse_artifact(fields: &mut Vec<String>, sentinel: &str) -> KtResult<()> {
    if fields.len() != COLUMN_COUNT_LITERAL_TAB
        || !fields[ARTIFACT_SLOT].is_empty()
        || !fields[ARTIFACT_SLOT + 1].is_empty()
    {
        return Err(unexpected_format(fields));
    }
    fields.remove(ARTIFACT_SLOT);
    fields[ARTIFACT_SLOT] = sentinel.to_string();
    Ok(())
}
