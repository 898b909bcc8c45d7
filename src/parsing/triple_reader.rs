//! Line reader for tab-separated triple dumps.
//!
//! Each data line is `subject<TAB>predicate<TAB>value<TAB>.`; lines starting
//! with `#` are comments. Files ending in `.gz` are decompressed on the fly.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::warn;

use crate::core::Triple;
use crate::error::{Error, Result};

/// Classification of a single input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Comment,
    Blank,
    Triple(Triple),
}

/// Splits one line into a triple.
///
/// Anything after the third tab-separated field is ignored. Fewer than three
/// fields is a fatal format error.
pub fn parse_triple_line(line: &str, line_no: u64) -> Result<Line> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.starts_with('#') {
        return Ok(Line::Comment);
    }
    if line.trim().is_empty() {
        return Ok(Line::Blank);
    }

    let mut fields = line.split('\t');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(subject), Some(predicate), Some(value)) => {
            Ok(Line::Triple(Triple::new(subject, predicate, value, line_no)))
        }
        _ => Err(Error::Format {
            line: line_no,
            message: format!("expected subject, predicate and value separated by tabs: {}", line),
        }),
    }
}

/// Opens a text file for buffered reading, decompressing `.gz` files.
pub fn open_text_file(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path).map_err(Error::io(format!("opening {}", path.display())))?;
    let is_gzip = path.extension().map_or(false, |ext| ext == "gz");
    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Reads a list of non-empty, non-comment lines, stopping after `max` entries if given.
pub fn read_list<R: BufRead>(reader: R, max: Option<usize>) -> Result<Vec<String>> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        if max.map_or(false, |max| entries.len() >= max) {
            break;
        }
        let line = line.map_err(Error::io("reading list"))?;
        let entry = line.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }
        entries.push(entry.to_string());
    }
    Ok(entries)
}

/// Reads a list file, see [`read_list`].
pub fn read_list_file(path: &Path) -> Result<Vec<String>> {
    read_list(open_text_file(path)?, None)
}

/// Iterator over the triples of a dump, skipping comments and blank lines.
///
/// Stops after `max_lines` physical lines when a limit is set.
pub struct TripleReader<R> {
    reader: R,
    buffer: String,
    line_no: u64,
    max_lines: Option<u64>,
    blank_lines: u64,
    finished: bool,
}

impl<R: BufRead> TripleReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
            line_no: 0,
            max_lines: None,
            blank_lines: 0,
            finished: false,
        }
    }

    pub fn with_max_lines(mut self, max_lines: Option<u64>) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Number of physical lines read so far.
    pub fn lines_read(&self) -> u64 {
        self.line_no
    }

    pub fn blank_lines(&self) -> u64 {
        self.blank_lines
    }

    /// True when reading stopped at the line limit rather than end of input.
    pub fn hit_line_limit(&self) -> bool {
        self.max_lines.map_or(false, |max| self.line_no >= max)
    }
}

impl TripleReader<Box<dyn BufRead + Send>> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(open_text_file(path)?))
    }
}

impl<R: BufRead> Iterator for TripleReader<R> {
    type Item = Result<Triple>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished || self.hit_line_limit() {
                return None;
            }
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.finished = true;
                    let context = format!("reading line {}", self.line_no + 1);
                    return Some(Err(Error::io(context)(e)));
                }
            }
            self.line_no += 1;

            let line = self.buffer.strip_suffix('\n').unwrap_or(&self.buffer);
            match parse_triple_line(line, self.line_no) {
                Ok(Line::Comment) => continue,
                Ok(Line::Blank) => {
                    self.blank_lines += 1;
                    warn!("Skipping blank line {}", self.line_no);
                    continue;
                }
                Ok(Line::Triple(triple)) => return Some(Ok(triple)),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
