//! Splice pipeline. Runs the boundary detector over a source file and
//! writes it back out with docstrings inserted.
//!
//! Requests go out strictly in source order: the file docstring first, then
//! one per function as each span closes. Every reply is written before
//! scanning resumes.

use crate::provider::DocstringProvider;
use crate::scan::{self, Line, Segment};
use crate::sink::Sink;
use crate::writer;
use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;

// Interpreter directive: `#!/usr/bin/env python3`
static RE_SHEBANG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#!").unwrap());

/// Counts from one splice run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub lines_in: usize,
    pub lines_out: usize,
    pub functions: usize,
}

/// Write `source` to `sink` with a file docstring at the top and one
/// docstring under every function header.
pub fn splice(
    source: &str,
    provider: &mut dyn DocstringProvider,
    sink: &mut dyn Sink,
) -> Result<Report> {
    let mut report = Report::default();
    let mut lines = scan::lines(source).peekable();

    let file_docstring = provider.fetch_for_file(source)?;

    // The shebang must stay first; the file docstring goes right after it
    if let Some(first) = lines.next_if(|l: &Line| RE_SHEBANG.is_match(l.text)) {
        sink.write_line(first.text)?;
        report.lines_in += 1;
        report.lines_out += 1;
    }
    report.lines_out += writer::emit_file_docstring(&file_docstring, sink)?;

    scan::scan(lines, |segment| -> Result<()> {
        match segment {
            Segment::Passthrough(line) => {
                sink.write_line(line.text)?;
                report.lines_in += 1;
                report.lines_out += 1;
            }
            Segment::Span(span) => {
                let docstring = provider
                    .fetch_for_span(&span.text())
                    .with_context(|| format!("function at line {}", span.header().number + 1))?;
                report.lines_in += span.line_count();
                report.lines_out += writer::emit_span(&span, &docstring, sink)?;
                report.functions += 1;
            }
        }
        Ok(())
    })?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    /// Replies with a fixed docstring and records every request.
    struct Fixed {
        docstring: &'static str,
        requests: Vec<String>,
        fail_on_span: Option<usize>,
    }

    impl Fixed {
        fn new(docstring: &'static str) -> Self {
            Self {
                docstring,
                requests: Vec::new(),
                fail_on_span: None,
            }
        }
    }

    impl DocstringProvider for Fixed {
        fn fetch_for_span(&mut self, text: &str) -> Result<String> {
            let spans = self.requests.iter().filter(|r| r.starts_with("span:")).count();
            if self.fail_on_span == Some(spans) {
                bail!("provider unavailable");
            }
            self.requests.push(format!("span:{}", text));
            Ok(self.docstring.to_string())
        }

        fn fetch_for_file(&mut self, text: &str) -> Result<String> {
            self.requests.push(format!("file:{}", text));
            Ok(self.docstring.to_string())
        }
    }

    fn run(source: &str, docstring: &'static str) -> (Vec<String>, Report, Vec<String>) {
        let mut provider = Fixed::new(docstring);
        let mut sink: Vec<String> = Vec::new();
        let report = splice(source, &mut provider, &mut sink).unwrap();
        (sink, report, provider.requests)
    }

    #[test]
    fn two_functions_scenario() {
        let source = "def f():\n    return 1\ndef g():\n    return 2\n";
        let (out, report, _) = run(source, "\"\"\"X\"\"\"");
        assert_eq!(
            out,
            vec![
                "\"\"\"X\"\"\"",
                "def f():",
                "    \"\"\"X\"\"\"",
                "    return 1",
                "def g():",
                "    \"\"\"X\"\"\"",
                "    return 2",
            ]
        );
        assert_eq!(report.functions, 2);
        assert_eq!(report.lines_in, 4);
        assert_eq!(report.lines_out, 7);
    }

    #[test]
    fn no_functions_conserves_lines() {
        let source = "import os\n\nX = 1\nprint(X)\n";
        let (out, report, requests) = run(source, "\"\"\"\nModule.\n\"\"\"");
        assert_eq!(&out[..3], &["\"\"\"", "Module.", "\"\"\""]);
        assert_eq!(&out[3..], &["import os", "", "X = 1", "print(X)"]);
        assert_eq!(report.functions, 0);
        assert_eq!(requests.len(), 1);
    }

    #[test]
    fn shebang_stays_first() {
        let source = "#!/usr/bin/env python3\nimport sys\n";
        let (out, _, _) = run(source, "\"\"\"Top.\"\"\"");
        assert_eq!(out, vec!["#!/usr/bin/env python3", "\"\"\"Top.\"\"\"", "import sys"]);
    }

    #[test]
    fn shebang_only_counts_on_first_line() {
        let source = "import sys\n#!not-a-directive\n";
        let (out, _, _) = run(source, "\"\"\"Top.\"\"\"");
        assert_eq!(out, vec!["\"\"\"Top.\"\"\"", "import sys", "#!not-a-directive"]);
    }

    #[test]
    fn empty_source_gets_file_docstring() {
        let (out, report, _) = run("", "\"\"\"Empty.\"\"\"");
        assert_eq!(out, vec!["\"\"\"Empty.\"\"\""]);
        assert_eq!(report.lines_in, 0);
    }

    #[test]
    fn requests_follow_source_order() {
        let source = "def a():\n    pass\nclass K:\n    def b(self):\n        pass\ndef c(): pass\n";
        let (_, _, requests) = run(source, "\"\"\"d\"\"\"");
        assert_eq!(
            requests,
            vec![
                format!("file:{}", source),
                "span:def a():\n    pass".to_string(),
                "span:    def b(self):\n        pass".to_string(),
                "span:def c(): pass".to_string(),
            ]
        );
    }

    #[test]
    fn function_at_end_of_file_is_documented() {
        let source = "x = 1\ndef last():\n    return x";
        let (out, report, _) = run(source, "\"\"\"d\"\"\"");
        assert_eq!(report.functions, 1);
        assert_eq!(out.last().unwrap(), "    return x");
    }

    #[test]
    fn back_to_back_headers_are_both_documented() {
        let source = "def a():\ndef b():\n    pass\n";
        let (out, report, _) = run(source, "\"\"\"d\"\"\"");
        assert_eq!(report.functions, 2);
        assert_eq!(
            out,
            vec![
                "\"\"\"d\"\"\"",
                "def a():",
                "    \"\"\"d\"\"\"",
                "def b():",
                "    \"\"\"d\"\"\"",
                "    pass",
            ]
        );
    }

    #[test]
    fn whitespace_only_line_does_not_split_method() {
        let source = "class A:\n    def m(self):\n        a = 1\n \n        return a\n";
        let (out, report, requests) = run(source, "\"\"\"d\"\"\"");
        assert_eq!(report.functions, 1);
        assert_eq!(
            requests[1],
            "span:    def m(self):\n        a = 1\n \n        return a"
        );
        assert_eq!(out.last().unwrap(), "        return a");
    }

    #[test]
    fn every_original_line_survives_in_order() {
        let source = "#!/bin/python\nimport os\n\nclass A:\n    def m(self):\n\n        return 1\n\n    x = 2\ndef f(a,\n      b):\n    return a\n";
        let (out, report, _) = run(source, "\"\"\"\nDoc.\n\"\"\"");
        let kept: Vec<&str> = out
            .iter()
            .map(String::as_str)
            .filter(|l| !l.trim_start().starts_with("\"\"\"") && l.trim() != "Doc.")
            .collect();
        let original: Vec<&str> = source.lines().collect();
        assert_eq!(kept, original);
        assert_eq!(report.lines_in, original.len());
        assert_eq!(report.lines_out, out.len());
    }

    #[test]
    fn provider_error_aborts_midway() {
        let mut provider = Fixed::new("\"\"\"d\"\"\"");
        provider.fail_on_span = Some(1);
        let mut sink: Vec<String> = Vec::new();
        let source = "def a():\n    pass\ndef b():\n    pass\nx = 1\n";
        let err = splice(source, &mut provider, &mut sink).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("function at line 3"), "got: {msg}");
        assert!(msg.contains("provider unavailable"), "got: {msg}");
        // First function was already written, nothing after it
        assert_eq!(sink.last().unwrap(), "    pass");
        assert!(!sink.iter().any(|l| l == "x = 1"));
    }
}
