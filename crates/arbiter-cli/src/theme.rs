//! CLI theme and styling.

use colored::Colorize;

const BOX_WIDTH: usize = 60;

/// CLI theme configuration.
pub(crate) struct Theme;

impl Theme {
    /// Format a header.
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Format a success message.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    /// Format an error message.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    /// Format a warning message.
    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    /// Format an info message.
    pub(crate) fn info(text: &str) -> String {
        format!("{} {}", "i".blue(), text)
    }

    /// Format a dimmed message.
    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Format a separator line.
    pub(crate) fn separator() -> String {
        "━".repeat(50).dimmed().to_string()
    }

    /// Format a record id, right-aligned to the ID column.
    pub(crate) fn id(id: u64) -> String {
        format!("{:>6}", format!("#{id}")).cyan().to_string()
    }

    /// Format an enabled/disabled flag.
    pub(crate) fn active(active: bool) -> String {
        if active {
            "active".green().to_string()
        } else {
            "disabled".red().to_string()
        }
    }

    /// Format a box around the step-up notice.
    pub(crate) fn verification_box(title: &str, content: &str) -> String {
        let rule = "─".repeat(BOX_WIDTH.saturating_sub(2));
        let top = format!("╭{rule}╮").yellow().to_string();
        let bottom = format!("╰{rule}╯").yellow().to_string();

        let pad_line = |text: &str, visible_len: usize| -> String {
            let padding = BOX_WIDTH.saturating_sub(4).saturating_sub(visible_len);
            format!("{} {text}{:p$} {}", "│".yellow(), "", "│".yellow(), p = padding)
        };

        let mut lines = vec![top, pad_line(&title.bold().to_string(), title.chars().count())];
        for line in content.lines() {
            lines.push(pad_line(line, line.chars().count()));
        }
        lines.push(bottom);
        lines.join("\n")
    }
}

/// Comma-separated id list, or a dash when empty.
pub(crate) fn id_list(ids: &[u64]) -> String {
    if ids.is_empty() {
        return "-".to_owned();
    }
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_box_lines_align() {
        colored::control::set_override(false);
        let rendered = Theme::verification_box("Verification required", "delete role #3");
        let widths: Vec<usize> = rendered.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{widths:?}");
    }

    #[test]
    fn test_id_list() {
        assert_eq!(id_list(&[1, 2, 3]), "1,2,3");
        assert_eq!(id_list(&[]), "-");
    }
}
