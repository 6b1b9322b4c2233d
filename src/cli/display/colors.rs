//! Color theme for CLI output

use crate::domain::apis::Condition;
use colored::{ColoredString, Colorize};
use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Get color based on the Ready condition of a resource
    pub fn get_condition_color(&self, ready: Option<&Condition>) -> TableColor {
        match ready {
            None => self.muted,
            Some(condition) if condition.is_true() => self.success,
            Some(condition) if condition.is_false() => self.error,
            Some(_) => self.info,
        }
    }

    pub fn paint(&self, text: &str, color: TableColor) -> ColoredString {
        text.color(table_color_to_colored_str(color))
    }
}

/// Convert comfy_table::Color to colored::Color string representation
pub fn table_color_to_colored_str(color: TableColor) -> &'static str {
    match color {
        TableColor::Green => "green",
        TableColor::Yellow => "yellow",
        TableColor::Red => "red",
        TableColor::Cyan => "cyan",
        TableColor::DarkGrey => "bright black",
        _ => "white",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.success, TableColor::Green);
        assert_eq!(theme.error, TableColor::Red);
    }

    #[test]
    fn test_get_condition_color() {
        let theme = ColorTheme::default();
        assert_eq!(
            theme.get_condition_color(Some(&Condition::new("Ready", "True"))),
            TableColor::Green
        );
        assert_eq!(
            theme.get_condition_color(Some(&Condition::new("Ready", "False"))),
            TableColor::Red
        );
        assert_eq!(
            theme.get_condition_color(Some(&Condition::new("Ready", "Unknown"))),
            TableColor::Cyan
        );
        assert_eq!(theme.get_condition_color(None), TableColor::DarkGrey);
    }
}
