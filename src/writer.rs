//! Reinsertion writer: splices a docstring under a function header.

use crate::scan::FunctionSpan;
use crate::sink::Sink;
use anyhow::Result;

/// Docstring lines hang this many spaces right of their header.
pub const HANG_INDENT: usize = 4;

/// Split a docstring into its lines, dropping any `\r` from CRLF replies.
fn docstring_lines(docstring: &str) -> impl Iterator<Item = &str> {
    docstring.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l))
}

/// Emit `span` with `docstring` placed right after the header.
///
/// Every docstring line is prefixed with `indent(header) + 4` spaces,
/// whatever the body's own indentation style. Original lines pass through
/// untouched. Returns the number of lines written.
pub fn emit_span(span: &FunctionSpan, docstring: &str, sink: &mut dyn Sink) -> Result<usize> {
    let mut written = 0;

    sink.write_line(span.header().text)?;
    written += 1;

    let prefix = " ".repeat(span.indent() + HANG_INDENT);
    for line in docstring_lines(docstring) {
        sink.write_line(&format!("{}{}", prefix, line))?;
        written += 1;
    }

    for line in span.body() {
        sink.write_line(line.text)?;
        written += 1;
    }

    Ok(written)
}

/// Emit the file-level docstring with no added indentation.
pub fn emit_file_docstring(docstring: &str, sink: &mut dyn Sink) -> Result<usize> {
    let mut written = 0;
    for line in docstring_lines(docstring) {
        sink.write_line(line)?;
        written += 1;
    }
    Ok(written)
}
