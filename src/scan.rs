//! Boundary detector. Splits source lines into passthrough code and
//! captured function spans using indentation as the only structural signal.
//!
//! A span opens on a `def` header and runs until the next header, the first
//! non-blank line indented at or left of the header, or end of input.

use regex::Regex;
use std::sync::LazyLock;

// Header: leading whitespace, then the `def` keyword and a space.
static RE_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)def ").unwrap());

/// A single source line with its 0-based position in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl<'a> Line<'a> {
    pub fn new(number: usize, text: &'a str) -> Self {
        Self { number, text }
    }

    /// Count of leading whitespace characters. Tabs count as one.
    pub fn indent(&self) -> usize {
        self.text.chars().take_while(|c| c.is_whitespace()).count()
    }

    /// Whitespace-only lines never open or close a span.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Indentation of the header if this line opens a function.
    pub fn header_indent(&self) -> Option<usize> {
        RE_HEADER
            .captures(self.text)
            .map(|caps| caps[1].chars().count())
    }
}

/// Split source text into numbered lines.
pub fn lines(source: &str) -> impl Iterator<Item = Line<'_>> {
    source
        .lines()
        .enumerate()
        .map(|(number, text)| Line::new(number, text))
}

/// A captured function: its header followed by every body line up to the
/// closing boundary. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpan<'a> {
    indent: usize,
    lines: Vec<Line<'a>>,
}

impl<'a> FunctionSpan<'a> {
    fn open(header: Line<'a>, indent: usize) -> Self {
        Self {
            indent,
            lines: vec![header],
        }
    }

    fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    /// Indentation level of the header line.
    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn header(&self) -> Line<'a> {
        self.lines[0]
    }

    pub fn body(&self) -> &[Line<'a>] {
        &self.lines[1..]
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The span's source text, newline-joined.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Output of the detector, delivered in source order.
#[derive(Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Passthrough(Line<'a>),
    Span(FunctionSpan<'a>),
}

enum ScanState<'a> {
    Idle,
    Capturing(FunctionSpan<'a>),
}

/// Walk `lines` once, handing each passthrough line and each closed span to
/// `on_segment` as soon as it is known. Errors from the callback stop the
/// scan and are returned unchanged.
pub fn scan<'a, I, F, E>(lines: I, mut on_segment: F) -> Result<(), E>
where
    I: IntoIterator<Item = Line<'a>>,
    F: FnMut(Segment<'a>) -> Result<(), E>,
{
    let mut state = ScanState::Idle;

    for line in lines {
        if let Some(indent) = line.header_indent() {
            // Close before reopening so back-to-back headers keep both spans
            if let ScanState::Capturing(span) = std::mem::replace(&mut state, ScanState::Idle) {
                on_segment(Segment::Span(span))?;
            }
            state = ScanState::Capturing(FunctionSpan::open(line, indent));
            continue;
        }

        state = match state {
            ScanState::Capturing(span) if !line.is_blank() && line.indent() <= span.indent => {
                on_segment(Segment::Span(span))?;
                on_segment(Segment::Passthrough(line))?;
                ScanState::Idle
            }
            ScanState::Capturing(mut span) => {
                span.push(line);
                ScanState::Capturing(span)
            }
            ScanState::Idle => {
                on_segment(Segment::Passthrough(line))?;
                ScanState::Idle
            }
        };
    }

    // A function running to end of input is still a function
    if let ScanState::Capturing(span) = state {
        on_segment(Segment::Span(span))?;
    }

    Ok(())
}
