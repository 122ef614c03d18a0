use std::ops::Range;

/// Greedy word wrap: split words of the given display widths into lines of at
/// most `max_width` columns, one space between words. A word wider than the
/// line gets a line of its own.
pub fn wrap_lines(widths: &[usize], max_width: usize) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut used = 0;

    for (i, &width) in widths.iter().enumerate() {
        if i == start {
            used = width;
        } else if used + 1 + width > max_width {
            lines.push(start..i);
            start = i;
            used = width;
        } else {
            used += 1 + width;
        }
    }
    if start < widths.len() {
        lines.push(start..widths.len());
    }

    lines
}

/// Line holding `word`; words past the end map to the last line.
pub fn line_of(lines: &[Range<usize>], word: usize) -> usize {
    lines
        .iter()
        .position(|line| line.contains(&word))
        .unwrap_or(lines.len().saturating_sub(1))
}

/// First line to draw so the active line sits about a third of the way down.
pub fn first_visible_line(active_line: usize, visible_lines: usize) -> usize {
    active_line.saturating_sub(visible_lines / 3)
}
