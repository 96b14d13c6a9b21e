use anyhow::{Context, Result};
use colored::Colorize;
use rustc_hash::FxHashMap;

use esdown_common::{Diagnostic, DiagnosticCategory, LineMap};

/// Renders diagnostics as text (optionally colored) or JSON.
pub struct Reporter {
    color: bool,
    sources: FxHashMap<String, String>,
    line_maps: FxHashMap<String, LineMap>,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter {
            color,
            sources: FxHashMap::default(),
            line_maps: FxHashMap::default(),
        }
    }

    /// Register the text of `file` so locations and snippets can be shown.
    pub fn add_source(&mut self, file: impl Into<String>, text: impl Into<String>) {
        let file = file.into();
        let text = text.into();
        self.line_maps.insert(file.clone(), LineMap::build(&text));
        self.sources.insert(file, text);
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diagnostic in diagnostics {
            out.push_str(&self.format_diagnostic(diagnostic));
            out.push('\n');
        }
        out
    }

    pub fn render_json(&self, diagnostics: &[Diagnostic]) -> Result<String> {
        let mut out =
            serde_json::to_string_pretty(diagnostics).context("failed to serialize diagnostics")?;
        out.push('\n');
        Ok(out)
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let location = match self.position_for(&diagnostic.file, diagnostic.start) {
            Some((line, column)) => format!("{}:{}:{}", diagnostic.file, line, column),
            None if !diagnostic.file.is_empty() => {
                format!("{}:{}", diagnostic.file, diagnostic.line)
            }
            None => "<unknown>".to_string(),
        };

        let mut output = format!(
            "{} - {} {}: {}",
            location,
            self.format_category(diagnostic.category),
            self.format_code(diagnostic.code),
            diagnostic.message_text
        );
        if let Some(snippet) =
            self.format_snippet(&diagnostic.file, diagnostic.start, diagnostic.length)
        {
            output.push_str(&snippet);
        }
        output
    }

    /// Source line with the span underlined, clipped to the first line.
    ///   2   var {a};
    ///       ~~~
    fn format_snippet(&self, file: &str, start: u32, length: u32) -> Option<String> {
        if length == 0 {
            return None;
        }
        let source = self.sources.get(file)?;
        let line_map = self.line_maps.get(file)?;
        let position = line_map.position_of(start);
        let line_start = line_map.line_start_of(start) as usize;
        let line_text = source
            .get(line_start..)?
            .split(['\n', '\r'])
            .next()
            .unwrap_or_default();

        let column = (position.column - 1) as usize;
        let mut underline = String::new();
        for (offset, ch) in line_text.char_indices() {
            if offset < column {
                underline.push(if ch == '\t' { '\t' } else { ' ' });
            } else if offset < column + length as usize {
                underline.push('~');
            } else {
                break;
            }
        }
        if !underline.contains('~') {
            underline.push('~');
        }

        let underline = if self.color {
            underline.red().to_string()
        } else {
            underline
        };
        Some(format!(
            "\n  {:>3}   {}\n        {}",
            position.line, line_text, underline
        ))
    }

    fn position_for(&self, file: &str, offset: u32) -> Option<(u32, u32)> {
        let position = self.line_maps.get(file)?.position_of(offset);
        Some((position.line, position.column))
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = category.as_str();
        if !self.color {
            return label.to_string();
        }
        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        let label = format!("ESD{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}
