/// Greedy word wrap. Returns the row of every word, given each word's display
/// width and the usable line width. Each word is followed by one space; a
/// word wider than the line gets a row to itself.
pub fn wrap_rows(widths: &[usize], max_width: usize) -> Vec<usize> {
    let max_width = max_width.max(1);
    let mut rows = Vec::with_capacity(widths.len());
    let mut row = 0;
    let mut used = 0;

    for &width in widths {
        let needed = width + 1;
        if used > 0 && used + width > max_width {
            row += 1;
            used = 0;
        }
        rows.push(row);
        used += needed;
    }

    rows
}
