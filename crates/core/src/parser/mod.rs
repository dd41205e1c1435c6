//! Block parser for free-form generated summary text.
//!
//! Generative models emit unstructured prose with embedded timestamps
//! and the occasional markdown heading. A single line-oriented pass
//! splits that into ordered [`SummaryPoint`]s:
//!
//! - A timestamp (`H:MM`, `MM:SS`, `HH:MM:SS`) starts a new point.
//! - A markdown heading starts a new point but keeps the timestamp
//!   context of the surrounding text.
//! - Two consecutive blank lines split long free-flowing paragraphs.
//! - Fenced code blocks are opaque: their content is never scanned and
//!   never split.
//!
//! Parsing never fails; the worst case is one point covering the whole
//! input.

mod scan;

use serde::{Deserialize, Serialize};

use scan::ScanState;

/// One structured unit of a generated summary.
///
/// `timestamp` may be empty: heading-only or continuation sections
/// before the first timestamp have no anchor. Several points may share
/// a timestamp when a section was segmented without a new anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPoint {
    pub timestamp: String,
    pub text: String,
}

/// Parse generated text into an ordered sequence of points.
///
/// Blank or whitespace-only input yields an empty sequence. Any other
/// input yields at least one point: if the scan produces nothing, the
/// whole trimmed input is returned as a single untimestamped point.
pub fn parse(text: &str) -> Vec<SummaryPoint> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let points = text
        .lines()
        .fold(ScanState::new(), |state, line| state.step(line))
        .finish();

    if points.is_empty() {
        return vec![SummaryPoint { timestamp: String::new(), text: text.trim().to_string() }];
    }

    points
}
