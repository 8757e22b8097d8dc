//! Eye addressing over a row-major grid.

use pumpkin_common::servo::config::LayoutConfig;
use std::fmt;

/// A named subset of the eye table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeSet {
    /// Every eye.
    All,
    /// Columns left of the middle.
    Left,
    /// The middle column onwards.
    Right,
    /// One row, counted from the top.
    Row(usize),
    /// One column, counted from the left.
    Column(usize),
}

impl fmt::Display for EyeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EyeSet::All => write!(f, "all"),
            EyeSet::Left => write!(f, "left"),
            EyeSet::Right => write!(f, "right"),
            EyeSet::Row(row) => write!(f, "row {row}"),
            EyeSet::Column(column) => write!(f, "column {column}"),
        }
    }
}

/// `count` eyes laid out row by row, `columns` per row.
///
/// Slot `i` sits at row `i / columns`, column `i % columns`. The last row
/// may be short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeLayout {
    columns: usize,
    count: usize,
}

impl EyeLayout {
    pub fn new(columns: usize, count: usize) -> Self {
        Self {
            columns: columns.max(1),
            count,
        }
    }

    pub fn from_config(config: &LayoutConfig, count: usize) -> Self {
        Self::new(config.columns, count)
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.count.div_ceil(self.columns)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Eye-table indices belonging to `set`, ascending.
    pub fn indices(&self, set: EyeSet) -> Vec<usize> {
        let half = self.columns / 2;
        (0..self.count)
            .filter(|&slot| {
                let (row, column) = (slot / self.columns, slot % self.columns);
                match set {
                    EyeSet::All => true,
                    EyeSet::Left => column < half,
                    EyeSet::Right => column >= half,
                    EyeSet::Row(r) => row == r,
                    EyeSet::Column(c) => column == c,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_by_four_grid() {
        let layout = EyeLayout::new(4, 8);
        assert_eq!(layout.rows(), 2);
        assert_eq!(layout.indices(EyeSet::All).len(), 8);
        assert_eq!(layout.indices(EyeSet::Left), vec![0, 1, 4, 5]);
        assert_eq!(layout.indices(EyeSet::Right), vec![2, 3, 6, 7]);
        assert_eq!(layout.indices(EyeSet::Row(1)), vec![4, 5, 6, 7]);
        assert_eq!(layout.indices(EyeSet::Column(2)), vec![2, 6]);
        assert!(layout.indices(EyeSet::Row(2)).is_empty());
    }

    #[test]
    fn short_last_row() {
        let layout = EyeLayout::new(3, 5);
        assert_eq!(layout.rows(), 2);
        assert_eq!(layout.indices(EyeSet::Row(1)), vec![3, 4]);
        assert_eq!(layout.indices(EyeSet::Column(2)), vec![2]);
        assert_eq!(layout.indices(EyeSet::Left), vec![0, 3]);
    }

    #[test]
    fn single_column_is_all_right() {
        let layout = EyeLayout::new(1, 3);
        assert!(layout.indices(EyeSet::Left).is_empty());
        assert_eq!(layout.indices(EyeSet::Right), vec![0, 1, 2]);
    }

    #[test]
    fn zero_columns_treated_as_one() {
        assert_eq!(EyeLayout::new(0, 2).columns(), 1);
    }
}
