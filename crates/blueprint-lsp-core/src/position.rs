//! Resolution of parser source maps to editor positions.
//!
//! The parser reports locations as byte offsets into the original text.
//! Editors want a line and a UTF-16 column, so every location is walked
//! against the document's lines before it is reported.

use crate::types::{Position, Range};
use serde::{Deserialize, Serialize};

/// One contiguous piece of source text, as a byte offset and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub offset: usize,
    pub length: usize,
}

impl SourceSpan {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }
}

/// The ordered spans an element was parsed from.
///
/// Spans may be disjoint, e.g. an annotation that covers two separate tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceMap {
    spans: Vec<SourceSpan>,
}

impl SourceMap {
    pub fn new(spans: Vec<SourceSpan>) -> Self {
        Self { spans }
    }

    pub fn spans(&self) -> &[SourceSpan] {
        &self.spans
    }

    /// The span used for single-range reporting.
    pub fn first(&self) -> Option<SourceSpan> {
        self.spans.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl FromIterator<SourceSpan> for SourceMap {
    fn from_iter<T: IntoIterator<Item = SourceSpan>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Where on a single line a highlight should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LineReference {
    /// Zero-based line index.
    pub line: u32,
    /// Zero-based start column (UTF-16 code units).
    pub start_column: u32,
    /// Highlight width (UTF-16 code units), never past the end of the line.
    pub char_count: u32,
}

impl LineReference {
    pub fn new(line: u32, start_column: u32, char_count: u32) -> Self {
        Self {
            line,
            start_column,
            char_count,
        }
    }

    /// The zero-width reference at the start of the document.
    pub fn document_start() -> Self {
        Self::default()
    }

    pub fn to_range(&self) -> Range {
        Range::new(
            Position::new(self.line, self.start_column),
            Position::new(self.line, self.start_column.saturating_add(self.char_count)),
        )
    }
}

/// Reasons a source map cannot be turned into a position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("element carries no source map")]
    MissingSourceMap,

    #[error("source offset {offset} is outside the document (length {length})")]
    OutOfRange { offset: usize, length: usize },
}

/// Byte layout of one line within the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineSpan {
    start: usize,
    len: usize,
    /// Width of the terminator: 2 for CRLF, 1 for LF, 0 on the last line.
    terminator: usize,
}

/// The document text split into lines on `\r?\n`.
///
/// Keeps each line's terminator width so offsets into the original text can
/// be walked line by line whatever the line-ending style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLines {
    text: String,
    lines: Vec<LineSpan>,
}

impl DocumentLines {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut lines = Vec::new();
        let mut start = 0;

        for (idx, _) in text.match_indices('\n') {
            let (len, terminator) = if idx > start && text.as_bytes()[idx - 1] == b'\r' {
                (idx - 1 - start, 2)
            } else {
                (idx - start, 1)
            };
            lines.push(LineSpan {
                start,
                len,
                terminator,
            });
            start = idx + 1;
        }
        lines.push(LineSpan {
            start,
            len: text.len() - start,
            terminator: 0,
        });

        Self { text, lines }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of lines; an empty document has one empty line.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the document has no text. `len()` is still 1 in that case,
    /// since it counts lines rather than bytes.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text of a line without its terminator.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines
            .get(index)
            .map(|span| &self.text[span.start..span.start + span.len])
    }

    pub fn total_length(&self) -> usize {
        self.text.len()
    }
}

/// Resolve the first span of a source map to a line reference.
///
/// Later spans are ignored: a diagnostic carries exactly one range. The
/// highlight is clipped to the end of the line the span starts on.
pub fn resolve(source_map: &SourceMap, lines: &DocumentLines) -> Result<LineReference, PositionError> {
    let span = source_map.first().ok_or(PositionError::MissingSourceMap)?;
    let length = lines.total_length();
    if span.offset > length {
        return Err(PositionError::OutOfRange {
            offset: span.offset,
            length,
        });
    }

    let mut consumed = 0;
    for (index, line) in lines.lines.iter().enumerate() {
        let width = line.len + line.terminator;
        if consumed + width > span.offset {
            return Ok(reference_on_line(lines, index, span.offset - consumed, span.length));
        }
        consumed += width;
    }

    // An offset equal to the document length points just past the last character.
    let last = lines.lines.len() - 1;
    Ok(reference_on_line(
        lines,
        last,
        span.offset - lines.lines[last].start,
        span.length,
    ))
}

/// Resolve a source map, anchoring at the document start when that fails.
pub fn resolve_or_start(source_map: Option<&SourceMap>, lines: &DocumentLines) -> LineReference {
    let resolved = source_map
        .ok_or(PositionError::MissingSourceMap)
        .and_then(|map| resolve(map, lines));
    match resolved {
        Ok(reference) => reference,
        Err(PositionError::MissingSourceMap) => LineReference::document_start(),
        Err(err) => {
            tracing::warn!(error = %err, "falling back to document start");
            LineReference::document_start()
        }
    }
}

fn reference_on_line(lines: &DocumentLines, index: usize, column: usize, length: usize) -> LineReference {
    let text = lines.line(index).unwrap_or_default();
    // A column inside a CRLF terminator sits at the end of the line.
    let start = floor_char_boundary(text, column.min(text.len()));
    let end = floor_char_boundary(text, column.saturating_add(length).min(text.len())).max(start);

    LineReference::new(
        to_u32(index),
        to_u32(utf16_len(&text[..start])),
        to_u32(utf16_len(&text[start..end])),
    )
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(offset: usize, length: usize) -> SourceMap {
        SourceMap::new(vec![SourceSpan::new(offset, length)])
    }

    #[test]
    fn splits_lf_and_crlf() {
        let lines = DocumentLines::new("one\r\ntwo\nthree");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.line(0), Some("one"));
        assert_eq!(lines.line(1), Some("two"));
        assert_eq!(lines.line(2), Some("three"));
        assert_eq!(lines.line(3), None);
    }

    #[test]
    fn empty_document() {
        let lines = DocumentLines::new("");
        assert!(lines.is_empty());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.line(0), Some(""));
        assert!(!DocumentLines::new("\n").is_empty());

        let reference = resolve(&map(0, 0), &lines).unwrap();
        assert_eq!(reference, LineReference::new(0, 0, 0));
    }

    #[test]
    fn offset_at_start_of_second_line() {
        let lines = DocumentLines::new("A\nB\nC");
        let reference = resolve(&map(2, 1), &lines).unwrap();
        assert_eq!(reference, LineReference::new(1, 0, 1));
    }

    #[test]
    fn offset_on_terminator_stays_on_its_line() {
        let lines = DocumentLines::new("A\nB\nC");
        let reference = resolve(&map(1, 1), &lines).unwrap();
        assert_eq!(reference.line, 0);
        assert_eq!(reference.start_column, 1);
        assert_eq!(reference.char_count, 0);
    }

    #[test]
    fn crlf_offsets_count_both_terminator_bytes() {
        let lines = DocumentLines::new("# API\r\n## Group\r\nbody");
        // "## Group" starts at byte 7
        let reference = resolve(&map(7, 8), &lines).unwrap();
        assert_eq!(reference, LineReference::new(1, 0, 8));

        // "body" starts at byte 17
        let reference = resolve(&map(17, 4), &lines).unwrap();
        assert_eq!(reference, LineReference::new(2, 0, 4));
    }

    #[test]
    fn length_is_clipped_to_the_line() {
        let lines = DocumentLines::new("FORMAT: 1A\n# Widget API\n");
        let reference = resolve(&map(8, 40), &lines).unwrap();
        assert_eq!(reference, LineReference::new(0, 8, 2));
    }

    #[test]
    fn only_first_span_is_resolved() {
        let lines = DocumentLines::new("alpha\nbeta\ngamma");
        let source_map = SourceMap::new(vec![SourceSpan::new(6, 4), SourceSpan::new(11, 5)]);
        let reference = resolve(&source_map, &lines).unwrap();
        assert_eq!(reference, LineReference::new(1, 0, 4));
    }

    #[test]
    fn offset_at_document_end() {
        let lines = DocumentLines::new("A\nBC");
        let reference = resolve(&map(4, 3), &lines).unwrap();
        assert_eq!(reference, LineReference::new(1, 2, 0));
    }

    #[test]
    fn offset_past_document_end() {
        let lines = DocumentLines::new("A\nB");
        assert_eq!(
            resolve(&map(10, 1), &lines),
            Err(PositionError::OutOfRange {
                offset: 10,
                length: 3
            })
        );
    }

    #[test]
    fn empty_source_map() {
        let lines = DocumentLines::new("A");
        assert_eq!(
            resolve(&SourceMap::default(), &lines),
            Err(PositionError::MissingSourceMap)
        );
    }

    #[test]
    fn fallback_to_document_start() {
        let lines = DocumentLines::new("A\nB");
        assert_eq!(
            resolve_or_start(Some(&map(99, 1)), &lines),
            LineReference::document_start()
        );
        assert_eq!(resolve_or_start(None, &lines), LineReference::document_start());
    }

    #[test]
    fn columns_are_utf16() {
        // "é" is two bytes in UTF-8 and one UTF-16 unit; "😀" is four bytes and two units.
        let lines = DocumentLines::new("# café 😀 API");
        let reference = resolve(&map(8, 4), &lines).unwrap();
        assert_eq!(reference.start_column, 7);
        assert_eq!(reference.char_count, 2);

        let reference = resolve(&map(13, 3), &lines).unwrap();
        assert_eq!(reference, LineReference::new(0, 10, 3));
    }

    #[test]
    fn offsets_inside_a_character_snap_back() {
        let lines = DocumentLines::new("é");
        let reference = resolve(&map(1, 1), &lines).unwrap();
        assert_eq!(reference, LineReference::new(0, 0, 1));
    }

    #[test]
    fn every_offset_lands_on_the_line_containing_it() {
        let text = "FORMAT: 1A\r\n\r\n# Widget API\n\n## Group Widgets\n### Widget [/w]\n";
        let lines = DocumentLines::new(text);

        for offset in 0..text.len() {
            let reference = resolve(&map(offset, 1), &lines).unwrap();
            let line = reference.line as usize;
            let line_start: usize = text
                .split_inclusive('\n')
                .take(line)
                .map(str::len)
                .sum();
            let line_end = line_start + text.split_inclusive('\n').nth(line).map_or(0, str::len);
            assert!(
                line_start <= offset && offset < line_end,
                "offset {} resolved to line {} ({}..{})",
                offset,
                line,
                line_start,
                line_end
            );
        }
    }

    #[test]
    fn to_range_spans_the_highlight() {
        let range = LineReference::new(3, 4, 5).to_range();
        assert_eq!(range.start, Position::new(3, 4));
        assert_eq!(range.end, Position::new(3, 9));
    }
}
