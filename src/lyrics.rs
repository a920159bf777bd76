//! The Line Index: the ordered, immutable lyric lines of one song.
//!
//! Plain text and synced (LRC) lyrics are both accepted. Time tags are
//! stripped and metadata lines dropped so only sung text is matched.

use std::ops::Index;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ScrollError, ScrollResult};
use crate::models::Line;
use crate::normalize::normalize;

/// One or more leading time tags: "[01:02.34]", "[1:02]", "[01:02:345]"
static TIME_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\s*\[\d{1,3}:\d{2}(?:[.:]\d{1,3})?\])+").unwrap());

/// Whole-line metadata tags: "[ar:Artist]", "[length: 3:20]", "[offset:+100]"
static METADATA_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(?i:ar|ti|al|au|by|re|ve|length|offset|#):[^\]]*\]$").unwrap());

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineIndex {
    lines: Vec<Line>,
}

impl LineIndex {
    /// Split on newlines, trim, drop empty lines, number survivors from 0.
    pub fn from_text(text: &str) -> Self {
        let lines = text
            .lines()
            .filter_map(clean_line)
            .enumerate()
            .map(|(index, text)| Line {
                index,
                normalized: normalize(&text),
                text,
            })
            .collect();
        Self { lines }
    }

    pub fn load(path: &Path) -> ScrollResult<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ScrollError::io("read lyrics file", e))?;
        Ok(Self::from_text(&text))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn last_index(&self) -> Option<usize> {
        self.lines.len().checked_sub(1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line> {
        self.lines.iter()
    }
}

impl Index<usize> for LineIndex {
    type Output = Line;

    fn index(&self, index: usize) -> &Line {
        &self.lines[index]
    }
}

impl<'a> IntoIterator for &'a LineIndex {
    type Item = &'a Line;
    type IntoIter = std::slice::Iter<'a, Line>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

fn clean_line(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if METADATA_TAG.is_match(trimmed) {
        return None;
    }
    let text = TIME_TAGS.replace(trimmed, "");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
