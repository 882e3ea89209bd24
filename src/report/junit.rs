// src/report/junit.rs
//! JUnit XML report: one `<testsuite>` with a `<testcase>` per check.

use crate::aggregate::Aggregate;
use crate::types::{CheckResult, Finding, Status};
use std::fmt::Write;

#[must_use]
pub fn render(aggregate: &Aggregate) -> String {
    let mut out = String::new();

    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        out,
        r#"<testsuite name="hex-validator" tests="{}" failures="{}">"#,
        aggregate.summary.total, aggregate.summary.failed
    );

    for result in &aggregate.results {
        write_testcase(&mut out, result);
    }

    let _ = writeln!(out, "</testsuite>");
    out
}

fn write_testcase(out: &mut String, result: &CheckResult) {
    let name = escape_xml(&result.name);
    let time = result.duration_ms.unwrap_or(0) as f64 / 1000.0;

    match result.status {
        Status::Pass => {
            let _ = writeln!(out, r#"  <testcase name="{name}" time="{time:.3}"/>"#);
        }
        Status::Fail => {
            let _ = writeln!(out, r#"  <testcase name="{name}" time="{time:.3}">"#);
            let _ = writeln!(
                out,
                r#"    <failure message="{} findings"><![CDATA[{}]]></failure>"#,
                result.findings.len(),
                cdata(&findings_text(&result.findings))
            );
            let _ = writeln!(out, "  </testcase>");
        }
        Status::Warn => {
            let _ = writeln!(out, r#"  <testcase name="{name}" time="{time:.3}">"#);
            let _ = writeln!(
                out,
                r#"    <skipped message="warning"><![CDATA[{}]]></skipped>"#,
                cdata(&findings_text(&result.findings))
            );
            let _ = writeln!(out, "  </testcase>");
        }
        Status::Skipped => {
            let _ = writeln!(out, r#"  <testcase name="{name}" time="{time:.3}">"#);
            let _ = writeln!(out, "    <skipped/>");
            let _ = writeln!(out, "  </testcase>");
        }
    }
}

fn findings_text(findings: &[Finding]) -> String {
    let mut text = String::new();
    for f in findings {
        let location = match (&f.file, f.line) {
            (Some(file), Some(line)) => format!("{}:{line} ", file.display()),
            (Some(file), None) => format!("{} ", file.display()),
            (None, _) => String::new(),
        };
        let _ = writeln!(text, "[{}] {location}{}", f.code, f.message);
    }
    text
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// CDATA cannot contain its own terminator; split it across sections.
fn cdata(text: &str) -> String {
    text.replace("]]>", "]]]]><![CDATA[>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_xml("a < b & c > \"d\""), "a &lt; b &amp; c &gt; &quot;d&quot;");
    }

    #[test]
    fn splits_cdata_terminator() {
        assert_eq!(cdata("x ]]> y"), "x ]]]]><![CDATA[> y");
    }
}
