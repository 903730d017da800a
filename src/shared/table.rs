//! Table and text layout helpers used by the CLI.
//! Width calculations ignore ANSI color codes so painted cells line up.

/// Render a text table. Each column is as wide as its widest cell; cells
/// wider than `max_cell` are cut with an ellipsis before measuring.
pub fn render_table(
    headers: &[&str],
    rows: &[Vec<String>],
    max_cell: usize,
) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .take(cols)
                .map(|cell| fit_cell(cell, max_cell))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| display_len(h)).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(display_len(cell));
        }
    }

    let header_cells: Vec<String> =
        headers.iter().map(|h| h.to_string()).collect();
    let header_line = format_row(&header_cells, &widths);
    let mut out = String::new();
    out.push_str(header_line.trim_end());
    out.push('\n');
    out.push_str(&"-".repeat(display_len(header_line.trim_end())));
    for row in &rows {
        out.push('\n');
        out.push_str(format_row(row, &widths).trim_end());
    }
    out
}

// Painted cells are left alone; truncating through escape codes would
// break them.
fn fit_cell(cell: &str, max_cell: usize) -> String {
    if cell.contains('\x1b') {
        cell.to_string()
    } else {
        truncate_with_ellipsis(cell, max_cell)
    }
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    row.iter()
        .zip(widths.iter())
        .map(|(cell, width)| pad_field(cell, *width))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Right-pad a field based on visible length (ignoring ANSI codes).
pub fn pad_field(display: &str, target: usize) -> String {
    let mut out = display.to_string();
    let padding = target.saturating_sub(display_len(display));
    out.push_str(&" ".repeat(padding));
    out
}

/// Truncate text to a width, appending an ellipsis when needed.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let len = text.chars().count();
    if len <= max_width {
        return text.to_string();
    }
    if max_width == 1 {
        return "…".to_string();
    }
    let mut out =
        text.chars().take(max_width.saturating_sub(1)).collect::<String>();
    out.push('…');
    out
}

/// Compute visible length of a string, ignoring ANSI escape sequences.
pub fn display_len(s: &str) -> usize {
    let mut len = 0;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        len += 1;
    }
    len
}
