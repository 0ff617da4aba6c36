use crate::segmenter::LocatedUnit;
use crate::span;
use crate::{Category, GecResponse, Markup};
use colored::*;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// One checked input together with its markup result.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(flatten)]
    pub response: GecResponse,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    files_checked: usize,
    total_issues: usize,
    files: &'a [FileReport],
}

/// 1-based line and column of rune `index` in `text`.
pub fn line_col(text: &str, index: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for ch in text.chars().take(index) {
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn category_label(category: Category, colored_output: bool) -> String {
    let label = match category {
        Category::Grammar => "grammar",
        Category::Spelling => "spelling",
        Category::Profanity => "profanity",
        Category::Gibberish => "gibberish",
    };
    if !colored_output {
        return label.to_string();
    }
    match category {
        Category::Grammar => label.blue().bold().to_string(),
        Category::Spelling => label.red().bold().to_string(),
        Category::Profanity => label.magenta().bold().to_string(),
        Category::Gibberish => label.yellow().bold().to_string(),
    }
}

fn render_markup(text: &str, markup: &Markup, colored_output: bool) -> String {
    let (line, col) = line_col(text, markup.index);
    let location = format!("{}:{}", line, col);
    let snippet = span::substring(text, markup.index, markup.length)
        .unwrap_or("")
        .replace('\n', "\u{21b5}");

    if colored_output {
        format!(
            "  {} {} {} {}",
            location.blue().bold(),
            category_label(markup.category, true),
            format!("\"{}\"", snippet).bold(),
            markup.message.dimmed()
        )
    } else {
        format!(
            "  {} {} \"{}\" {}",
            location,
            category_label(markup.category, false),
            snippet,
            markup.message
        )
    }
}

/// Text report for one input. Empty when the input has no issues.
pub fn render_text(source: &str, text: &str, response: &GecResponse, colored_output: bool) -> String {
    if response.text_markups.is_empty() {
        return String::new();
    }

    let mut out = if colored_output {
        format!("\n{}\n", source.bold().underline())
    } else {
        format!("\n{}\n", source)
    };
    for markup in &response.text_markups {
        out.push_str(&render_markup(text, markup, colored_output));
        out.push('\n');
    }
    if response.corrected_text != text {
        let label = if colored_output {
            "→ corrected:".dimmed().to_string()
        } else {
            "→ corrected:".to_string()
        };
        out.push_str(&format!("    {} {}\n", label, response.corrected_text.trim()));
    }
    out
}

pub fn render_json(reports: &[FileReport]) -> serde_json::Result<String> {
    let output = JsonOutput {
        files_checked: reports.len(),
        total_issues: reports.iter().map(|r| r.response.text_markups.len()).sum(),
        files: reports,
    };
    serde_json::to_string_pretty(&output)
}

pub fn print_summary(total_issues: usize, files_checked: usize, colored_output: bool) {
    println!();
    let files = if files_checked == 1 { "input" } else { "inputs" };
    if total_issues == 0 {
        let msg = format!("✓ No issues found in {} {}!", files_checked, files);
        if colored_output {
            println!("{}", msg.green().bold());
        } else {
            println!("{}", msg);
        }
        return;
    }

    let issue_word = if total_issues == 1 { "issue" } else { "issues" };
    if colored_output {
        println!(
            "{} {} {} found in {} {}",
            "✗".red().bold(),
            total_issues.to_string().red().bold(),
            issue_word,
            files_checked,
            files
        );
    } else {
        println!(
            "✗ {} {} found in {} {}",
            total_issues, issue_word, files_checked, files
        );
    }
}

/// One line per unit: offsets, kind and the unit text with newlines shown.
pub fn render_units(units: &[LocatedUnit], colored_output: bool) -> String {
    let mut out = String::new();
    for located in units {
        let offsets = match located.span {
            Some(span) => format!("{:>5} {:>4}", span.index, span.length),
            None => format!("{:>5} {:>4}", "?", "?"),
        };
        let kind = if located.unit.whitespace_literal {
            "break"
        } else {
            "sentence"
        };
        let shown = located.unit.text.replace('\n', "\\n");
        if colored_output {
            out.push_str(&format!("{} {:<8} {}\n", offsets.dimmed(), kind.cyan(), shown));
        } else {
            out.push_str(&format!("{} {:<8} {}\n", offsets, kind, shown));
        }
    }
    out
}
