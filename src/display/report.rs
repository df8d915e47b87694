//! Formatting helpers shared by the reports, the CLI tables and the TUI

/// Format a percentage with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    if pct < 0.1 && pct > 0.0 {
        format!("{:.2}%", pct)
    } else if pct.abs() < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Create a simple bar chart representation
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return " ".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Month-over-month change in words, e.g. "up 12% vs last month".
/// Empty when there is nothing to compare against.
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(pct) if pct > 0.0 => format!("up {} vs last month", format_percentage(pct)),
        Some(pct) if pct < 0.0 => format!("down {} vs last month", format_percentage(-pct)),
        Some(_) => "same as last month".to_string(),
        None => String::new(),
    }
}

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

/// Truncate a string to a maximum number of characters, ending in "..."
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.05), "0.05%");
        assert_eq!(format_percentage(5.5), "5.5%");
        assert_eq!(format_percentage(50.0), "50%");
        assert_eq!(format_percentage(-2.5), "-2.5%");
    }

    #[test]
    fn test_format_bar() {
        let bar = format_bar(50.0, 100.0, 10);
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), 5);
        assert_eq!(format_bar(10.0, 0.0, 4), "    ");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(Some(12.0)), "up 12% vs last month");
        assert_eq!(format_change(Some(-4.5)), "down 4.5% vs last month");
        assert_eq!(format_change(Some(0.0)), "same as last month");
        assert_eq!(format_change(None), "");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 5), "He...");
        assert_eq!(truncate("Hi", 5), "Hi");
        assert_eq!(truncate("Test", 4), "Test");
        assert_eq!(truncate("Café crème brûlée", 7), "Café...");
        assert_eq!(truncate("abcdef", 2), "..");
    }
}
