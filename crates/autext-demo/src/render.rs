//! Terminal report for the `detect` command

use crate::models::{probability_label, summary_line, Highlight, LEGEND};
use autext_core::SessionResult;
use std::fmt::Write;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render `result` as highlighted text; `color` toggles ANSI escapes
pub fn render_report(result: &SessionResult, show_details: bool, color: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Language: {} ({})",
        result.language.name(),
        result.language.code()
    );
    let _ = writeln!(out, "{}", LEGEND);
    let _ = writeln!(out);

    for paragraph in &result.paragraphs {
        let highlight = Highlight::from(paragraph.verdict);
        let (start, end) = match (color, highlight) {
            (false, _) => ("", ""),
            (true, Highlight::Red) => (RED, RESET),
            (true, Highlight::Green) => (GREEN, RESET),
        };

        if color {
            let _ = writeln!(out, "{}{}{}", start, paragraph.text, end);
        } else {
            let _ = writeln!(out, "[{}] {}", paragraph.verdict, paragraph.text);
        }

        if show_details {
            let label = probability_label(paragraph.ai_probability);
            if color {
                let _ = writeln!(out, "{}{}{}{}", start, BOLD, label, RESET);
            } else {
                let _ = writeln!(out, "{}", label);
            }
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{}", summary_line(result));
    out
}
