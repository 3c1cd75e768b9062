/// First row to draw so that `selected` stays inside a window of `height`
/// rows out of `total`.
pub(crate) fn scroll_offset(selected: usize, total: usize, height: usize) -> usize {
    if height == 0 || total <= height {
        return 0;
    }
    let max_offset = total - height;
    selected.saturating_sub(height - 1).min(max_offset)
}

/// Cut `value` to at most `width` characters, marking the cut with `…`.
pub(crate) fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = value.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_offset_keeps_selection_visible() {
        assert_eq!(scroll_offset(0, 28, 10), 0);
        assert_eq!(scroll_offset(9, 28, 10), 0);
        assert_eq!(scroll_offset(10, 28, 10), 1);
        assert_eq!(scroll_offset(27, 28, 10), 18);
        assert_eq!(scroll_offset(5, 3, 10), 0);
        assert_eq!(scroll_offset(5, 28, 0), 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Ethiopia", 20), "Ethiopia");
        assert_eq!(truncate("Ethiopia Guji", 6), "Ethio…");
        assert_eq!(truncate("abc", 0), "");
    }
}
