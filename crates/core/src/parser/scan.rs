//! Line-oriented scan state machine.
//!
//! One [`ScanState`] value is threaded through a fold over the input
//! lines; each line produces the next state. Keeping the transition
//! function explicit makes the individual states testable without
//! running a whole document through [`super::parse`].

use std::sync::LazyLock;

use regex::Regex;

use super::SummaryPoint;

/// `H:MM`, `MM:SS`, or `HH:MM:SS`. `find` picks the first occurrence
/// in the line, which is the anchor for a new point.
static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}(?::\d{2})?").unwrap());

/// Markdown heading: one to six `#` followed by whitespace, anchored at
/// the start of the trimmed line.
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,6}\s").unwrap());

/// A fence marker is three or more backticks, optionally preceded by
/// whitespace. Language tags after the backticks are tolerated.
fn is_fence(line: &str) -> bool {
    line.trim_start().chars().take_while(|&c| c == '`').count() >= 3
}

/// Scanner mode. Inside a fenced block every line is opaque content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Mode {
    Normal,
    InFencedBlock,
}

/// Accumulated scan state for one pass over the input lines.
#[derive(Debug)]
pub(super) struct ScanState {
    mode: Mode,
    points: Vec<SummaryPoint>,
    /// Body text of the point currently being accumulated.
    buf: String,
    /// Timestamp carried into the next pushed point. Headings and
    /// double-blank segmentation do not reset it.
    timestamp: String,
    blank_streak: u32,
    /// Set by a timestamp line with no trailing text: the next
    /// non-blank line is consumed verbatim as the body, with no
    /// timestamp, heading, or fence interpretation.
    take_next_as_body: bool,
}

impl ScanState {
    pub(super) fn new() -> Self {
        Self {
            mode: Mode::Normal,
            points: Vec::new(),
            buf: String::new(),
            timestamp: String::new(),
            blank_streak: 0,
            take_next_as_body: false,
        }
    }

    /// Close the accumulating point if it has non-whitespace content.
    fn flush(&mut self) {
        let text = self.buf.trim();
        if !text.is_empty() {
            self.points
                .push(SummaryPoint { timestamp: self.timestamp.clone(), text: text.to_string() });
        }
        self.buf.clear();
    }

    /// Apply one line and return the next state.
    pub(super) fn step(mut self, line: &str) -> Self {
        if self.mode == Mode::InFencedBlock {
            if is_fence(line) {
                self.mode = Mode::Normal;
                self.blank_streak = 0;
            }
            self.buf.push_str(line);
            self.buf.push('\n');
            return self;
        }

        if self.take_next_as_body {
            self.take_next_as_body = false;
            if !line.trim().is_empty() {
                self.blank_streak = 0;
                self.buf.push_str(line);
                self.buf.push('\n');
                return self;
            }
            // Blank lines are not consumed as a body; fall through.
        }

        if is_fence(line) {
            self.mode = Mode::InFencedBlock;
            self.blank_streak = 0;
            self.buf.push_str(line);
            self.buf.push('\n');
            return self;
        }

        if let Some(m) = TIMESTAMP_RE.find(line) {
            self.blank_streak = 0;
            self.flush();
            self.timestamp = m.as_str().to_string();
            // Strip only the leading separator run; digits stay intact.
            let rest = line[m.end()..].trim_start_matches([':', '-', ' ', '\t']);
            if rest.is_empty() {
                self.take_next_as_body = true;
            } else {
                self.buf.push_str(rest);
                self.buf.push('\n');
            }
            return self;
        }

        let trimmed = line.trim();
        if HEADING_RE.is_match(trimmed) {
            self.blank_streak = 0;
            self.flush();
            self.buf.push_str(trimmed);
            self.buf.push('\n');
            return self;
        }

        if trimmed.is_empty() {
            self.blank_streak += 1;
            self.buf.push('\n');
            if self.blank_streak >= 2 {
                // Second consecutive blank line ends the paragraph; the
                // tracked timestamp carries over to any continuation.
                self.flush();
            }
            return self;
        }

        self.blank_streak = 0;
        self.buf.push_str(line);
        self.buf.push('\n');
        self
    }

    /// Close any trailing point and return the finished sequence.
    pub(super) fn finish(mut self) -> Vec<SummaryPoint> {
        self.flush();
        self.points
    }
}
