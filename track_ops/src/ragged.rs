//! Rows of variable length stored in a single flat buffer.
//!
//! Edge and weight columns are ragged: every element has its own list of
//! 0..K entries.  Rows are kept in their logical (unpadded) form.  The dense,
//! right padded form used when data is persisted or compared against a
//! matrix is derived on demand by [`Ragged::to_padded`]; its width is the
//! tightest width that holds every row, with a minimum of one column once
//! the ragged column has at least one row.

use crate::error::{Result, TrackError};

#[derive(Debug, Clone, PartialEq)]
pub struct Ragged<T> {
    data: Vec<T>,
    // offsets[i]..offsets[i + 1] is the extent of row i; offsets[0] == 0
    offsets: Vec<usize>,
}

impl<T> Default for Ragged<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Ragged<T> {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            offsets: vec![0],
        }
    }

    pub fn with_capacity(rows: usize, entries: usize) -> Self {
        let mut offsets = Vec::with_capacity(rows + 1);
        offsets.push(0);
        Self {
            data: Vec::with_capacity(entries),
            offsets,
        }
    }

    pub fn push_row<I: IntoIterator<Item = T>>(&mut self, row: I) {
        self.data.extend(row);
        self.offsets.push(self.data.len())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, i: usize) -> Option<&[T]> {
        if i < self.len() {
            Some(&self.data[self.offsets[i]..self.offsets[i + 1]])
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.offsets
            .windows(2)
            .map(move |w| &self.data[w[0]..w[1]])
    }

    /// Length of each row
    pub fn row_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.offsets.windows(2).map(|w| w[1] - w[0])
    }

    /// Length of the longest row (0 if there are no rows or all rows are empty)
    pub fn width(&self) -> usize {
        self.row_lengths().max().unwrap_or(0)
    }

    /// Width of the padded representation
    pub fn padded_width(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width().max(1)
        }
    }

    /// Total number of entries over all rows
    pub fn n_entries(&self) -> usize {
        self.data.len()
    }

    /// Whether every row has the same length as the corresponding row in other
    pub fn same_shape<U>(&self, other: &Ragged<U>) -> bool {
        self.offsets == other.offsets
    }

    /// Check that self has the same shape as other, reporting the first
    /// row that differs
    pub fn check_aligned<U>(&self, other: &Ragged<U>) -> Result<()> {
        if self.len() != other.len() {
            return Err(TrackError::LengthMismatch {
                column: "weights",
                expected: other.len(),
                found: self.len(),
            });
        }
        match other
            .row_lengths()
            .zip(self.row_lengths())
            .enumerate()
            .find(|(_, (e, w))| e != w)
        {
            Some((row, (edges, weights))) => Err(TrackError::RaggedMismatch {
                row,
                edges,
                weights,
            }),
            None => Ok(()),
        }
    }
}

impl<T: Clone> Ragged<T> {
    pub fn from_rows<R: AsRef<[T]>>(rows: impl IntoIterator<Item = R>) -> Self {
        let mut r = Self::new();
        for row in rows {
            r.push_row(row.as_ref().iter().cloned())
        }
        r
    }

    /// Fancy indexing: row k of the result is row index[k] of self.
    ///
    /// Indices must be in range (checked by the callers).
    pub fn select(&self, index: &[usize]) -> Self {
        let mut r = Self::with_capacity(index.len(), index.len() * self.width());
        for &i in index {
            r.push_row(self.data[self.offsets[i]..self.offsets[i + 1]].iter().cloned())
        }
        r
    }

    /// Right padded dense form.  Every returned row has length padded_width()
    pub fn to_padded(&self, pad: T) -> Vec<Vec<T>> {
        let w = self.padded_width();
        self.rows()
            .map(|row| {
                let mut v = Vec::with_capacity(w);
                v.extend_from_slice(row);
                v.resize(w, pad.clone());
                v
            })
            .collect()
    }
}

impl Ragged<String> {
    /// Build edge rows from a padded form, dropping empty ('') slots
    pub fn from_padded_edges<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut r = Self::new();
        for row in rows {
            r.push_row(
                row.into_iter()
                    .filter(|s| !s.as_ref().is_empty())
                    .map(|s| s.as_ref().to_owned()),
            )
        }
        r
    }
}

impl Ragged<f64> {
    /// Build weight rows from a padded form, keeping for each row as many
    /// leading entries as the matching edge row has edges.
    pub fn from_padded_weights<R: AsRef<[f64]>>(
        rows: impl IntoIterator<Item = R>,
        edges: &Ragged<String>,
    ) -> Result<Self> {
        let rows: Vec<R> = rows.into_iter().collect();
        if rows.len() != edges.len() {
            return Err(TrackError::LengthMismatch {
                column: "weights",
                expected: edges.len(),
                found: rows.len(),
            });
        }
        let mut r = Self::with_capacity(edges.len(), edges.n_entries());
        for (row, (w, n)) in rows.iter().zip(edges.row_lengths()).enumerate() {
            let w = w.as_ref();
            if w.len() < n {
                return Err(TrackError::RaggedMismatch {
                    row,
                    edges: n,
                    weights: w.len(),
                });
            }
            r.push_row(w[..n].iter().copied())
        }
        Ok(r)
    }
}

impl<T> FromIterator<Vec<T>> for Ragged<T> {
    fn from_iter<I: IntoIterator<Item = Vec<T>>>(iter: I) -> Self {
        let mut r = Self::new();
        for row in iter {
            r.push_row(row)
        }
        r
    }
}
