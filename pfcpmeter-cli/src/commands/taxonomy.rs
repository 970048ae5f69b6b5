//! `pfcpmeter taxonomy` command handler

use std::io::Write;

use serde::Serialize;

use pfcpmeter_core::taxonomy::MESSAGE_KINDS;
use pfcpmeter_core::types::AttackLabel;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `taxonomy` command.
pub fn execute(writer: &OutputWriter) -> Result<(), CliError> {
    writer.render(&TaxonomyReport::build())
}

/// Dataset column layout: one column per category, then the label pair.
#[derive(Serialize)]
pub struct TaxonomyReport {
    pub categories: Vec<CategoryEntry>,
    pub labels: Vec<LabelEntry>,
}

#[derive(Serialize)]
pub struct CategoryEntry {
    /// Zero-based dataset column
    pub column: usize,
    /// PFCP message type code
    pub code: u8,
    pub name: &'static str,
}

#[derive(Serialize)]
pub struct LabelEntry {
    pub name: &'static str,
    pub value: u8,
}

impl TaxonomyReport {
    pub fn build() -> Self {
        let categories = MESSAGE_KINDS
            .iter()
            .enumerate()
            .map(|(column, kind)| CategoryEntry {
                column,
                code: kind.code,
                name: kind.name,
            })
            .collect();
        let labels = AttackLabel::ALL
            .iter()
            .map(|label| LabelEntry {
                name: label.as_str(),
                value: label.value(),
            })
            .collect();
        Self { categories, labels }
    }
}

impl Render for TaxonomyReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{}", "Message categories".bold())?;
        writeln!(w, "  {:<6} {:<6} {}", "COLUMN", "CODE", "NAME")?;
        for c in &self.categories {
            writeln!(w, "  {:<6} {:<6} {}", c.column, c.code, c.name)?;
        }

        writeln!(w)?;
        writeln!(w, "{}", "Labels".bold())?;
        for l in &self.labels {
            writeln!(w, "  {:<2} {}", l.value, l.name.cyan())?;
        }

        Ok(())
    }
}
