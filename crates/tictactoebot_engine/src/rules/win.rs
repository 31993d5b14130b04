//! Win detection.

/// The eight 3-in-a-row lines, as zero-based offsets into a row-major grid.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns true if `value` occupies all three cells of any line.
pub fn has_line<T: PartialEq>(cells: &[T; 9], value: &T) -> bool {
    LINES
        .iter()
        .any(|line| line.iter().all(|&i| cells[i] == *value))
}
