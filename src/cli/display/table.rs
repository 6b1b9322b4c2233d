//! Table rendering for CLI output

use super::ColorTheme;
use comfy_table::{presets::NOTHING, Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    pub fn theme(&self) -> &ColorTheme {
        &self.theme
    }

    /// Render rows under upper-cased headers as a borderless table
    pub fn render(&self, headers: &[&str], rows: Vec<Vec<Cell>>) -> String {
        let mut table = Table::new();
        table
            .load_preset(NOTHING)
            .set_content_arrangement(ContentArrangement::Disabled)
            .set_header(
                headers
                    .iter()
                    .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
            );

        if colored::control::SHOULD_COLORIZE.should_colorize() {
            table.enforce_styling();
        } else {
            table.force_no_tty();
        }

        for row in rows {
            table.add_row(row);
        }

        let mut output: String = table
            .lines()
            .map(|line| line.trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        output.push('\n');
        output
    }
}
