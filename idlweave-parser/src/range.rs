//! Positions and ranges inside an IDL block
//!
//! Tokens carry byte spans. Diagnostics want line:column positions, so [LineIndex]
//! records where every line starts and maps offsets through it. Lines and columns are
//! 0-indexed here; [Position]'s `Display` shows them 1-indexed for humans.

use serde::Serialize;
use std::fmt;
use std::ops::Range as ByteSpan;

/// A line and column in a block's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Where a token or construct sits: its byte span plus both ends as positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Range {
    pub span: ByteSpan<usize>,
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(span: ByteSpan<usize>, start: Position, end: Position) -> Self {
        Self { span, start, end }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}-{}", self.start, self.end.column + 1)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Byte offsets of every line start in one block.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(at, _)| at + 1))
            .collect();
        Self { starts }
    }

    pub fn position(&self, offset: usize) -> Position {
        // `starts[0]` is 0, so at least one start is <= offset.
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        Position::new(line, offset - self.starts[line])
    }

    pub fn range(&self, span: &ByteSpan<usize>) -> Range {
        Range::new(
            span.clone(),
            self.position(span.start),
            self.position(span.end),
        )
    }
}
