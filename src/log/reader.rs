use crate::error::{Error, ExtractError, Result};
use crate::grammar::GrammarSpec;
use crate::log::record::LogRecord;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Longest line, in bytes without the newline, the reader will hold.
pub const MAX_LINE_LEN: usize = 64 * 1024;

const LINE_CAPACITY: usize = 256;

/// Counters kept while reading one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    /// Physical lines consumed from the source.
    pub lines: usize,
    /// Lines carrying a selection marker.
    pub selected: usize,
    pub accepted: usize,
    /// Lines dropped as malformed: selected lines with a field that could
    /// not be extracted, plus every line over the length limit.
    pub skipped: usize,
}

/// Outcome of pulling one physical line.
enum Line {
    Text,
    TooLong,
    End,
}

/// Lazy, single-pass reader turning a text source into telemetry records.
///
/// Lines are pulled one at a time; the source is dropped as soon as the cap is
/// reached, the input is exhausted, or reading fails. Re-reading means opening
/// the source again.
pub struct LogReader<'g, R> {
    source: Option<R>,
    grammar: &'g GrammarSpec,
    cap: Option<usize>,
    strict: bool,
    max_line: usize,
    buf: Vec<u8>,
    stats: ReadStats,
}

impl<'g> LogReader<'g, BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, grammar: &'g GrammarSpec) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("reading {} as {}", path.display(), grammar.name());
        Ok(Self::new(BufReader::new(file), grammar))
    }
}

impl<'g, R: BufRead> LogReader<'g, R> {
    pub fn new(source: R, grammar: &'g GrammarSpec) -> Self {
        Self {
            source: Some(source),
            grammar,
            cap: None,
            strict: false,
            max_line: MAX_LINE_LEN,
            buf: Vec::with_capacity(LINE_CAPACITY),
            stats: ReadStats::default(),
        }
    }

    /// Stop after `cap` accepted records.
    pub fn with_cap(mut self, cap: Option<usize>) -> Self {
        self.cap = cap;
        self
    }

    /// Surface the first malformed telemetry line as an error instead of
    /// skipping it.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Drop lines longer than `max_line` bytes instead of buffering them.
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = max_line;
        self
    }

    pub fn stats(&self) -> ReadStats {
        self.stats
    }

    /// True once the source has been released.
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    fn cap_reached(&self) -> bool {
        self.cap.is_some_and(|cap| self.stats.accepted >= cap)
    }

    fn close(&mut self) {
        if self.source.take().is_some() {
            let s = &self.stats;
            info!(
                "{}: read {} lines, {} selected, {} accepted, {} skipped",
                self.grammar.name(),
                s.lines,
                s.selected,
                s.accepted,
                s.skipped
            );
        }
    }

    /// Read the next raw line into `buf`, holding at most `max_line` bytes
    /// of it. The remainder of an over-long line is consumed unbuffered.
    fn fill_line(&mut self) -> io::Result<Line> {
        let Some(source) = self.source.as_mut() else {
            return Ok(Line::End);
        };
        self.buf.clear();

        let limit = self.max_line as u64 + 1;
        let n = source.by_ref().take(limit).read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(Line::End);
        }
        if n as u64 == limit && self.buf.last() != Some(&b'\n') {
            source.skip_until(b'\n')?;
            self.buf.clear();
            self.buf.shrink_to(LINE_CAPACITY);
            return Ok(Line::TooLong);
        }
        Ok(Line::Text)
    }
}

impl<R: BufRead> Iterator for LogReader<'_, R> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.is_closed() {
                return None;
            }
            if self.cap_reached() {
                self.close();
                return None;
            }

            let line = match self.fill_line() {
                Ok(line) => line,
                Err(e) => {
                    self.close();
                    return Some(Err(Error::Io(e)));
                }
            };
            if let Line::End = line {
                self.close();
                return None;
            }
            self.stats.lines += 1;
            let lno = self.stats.lines;

            if let Line::TooLong = line {
                self.stats.skipped += 1;
                let source = ExtractError::LineTooLong {
                    limit: self.max_line,
                };
                if self.strict {
                    self.close();
                    return Some(Err(Error::Malformed { line: lno, source }));
                }
                warn!("skipping line {}: {}", lno, source);
                continue;
            }

            // Solver logs are not guaranteed UTF-8 when a write is cut short.
            let line = String::from_utf8_lossy(&self.buf).into_owned();
            let line = line.trim_end_matches(['\r', '\n']);

            if !self.grammar.selects(line) {
                continue;
            }
            self.stats.selected += 1;

            match LogRecord::parse(line, self.grammar) {
                Ok(record) => {
                    self.stats.accepted += 1;
                    if self.cap_reached() {
                        self.close();
                    }
                    return Some(Ok(record));
                }
                Err(source) if self.strict => {
                    self.stats.skipped += 1;
                    self.close();
                    return Some(Err(Error::Malformed { line: lno, source }));
                }
                Err(err) => {
                    self.stats.skipped += 1;
                    debug!("skipping malformed line {}: {} ({:?})", lno, err, line);
                }
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for LogReader<'_, R> {}
