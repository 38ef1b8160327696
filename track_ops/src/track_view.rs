use std::{borrow::Cow, collections::BTreeMap};

use crate::{
    columns::{Columns, ExtraColumn},
    error::{Result, TrackError},
    format::{BorderHandling, Geometry, Strand, TrackFormat},
    ragged::Ragged,
    region::RegionKey,
};

/// TrackView
///
/// The columnar data of one track over one region.  A view is validated on
/// construction and immutable afterwards.
///
/// Coordinates are absolute (not relative to the region start).  Elements of
/// views constructed with allow_overlaps == false are sorted by start and do
/// not overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackView {
    region: RegionKey,
    columns: Columns,
    size: usize,
    border_handling: BorderHandling,
    allow_overlaps: bool,
}

impl TrackView {
    pub fn new(
        region: RegionKey,
        columns: Columns,
        border_handling: BorderHandling,
        allow_overlaps: bool,
    ) -> Result<Self> {
        let size = check_lengths(&region, &columns)?;
        check_ragged(&columns)?;
        let (columns, size) = apply_border_handling(&region, columns, size, border_handling)?;
        if !allow_overlaps {
            check_no_overlaps(&columns)?;
        }
        Ok(Self {
            region,
            columns,
            size,
            border_handling,
            allow_overlaps,
        })
    }

    /// An empty (size 0) segment view
    pub fn empty(region: RegionKey) -> Self {
        Self {
            region,
            columns: Columns {
                starts: Some(Vec::new()),
                ends: Some(Vec::new()),
                ..Default::default()
            },
            size: 0,
            border_handling: BorderHandling::Crop,
            allow_overlaps: false,
        }
    }

    pub fn region(&self) -> &RegionKey {
        &self.region
    }

    /// Number of elements
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn allow_overlaps(&self) -> bool {
        self.allow_overlaps
    }

    pub fn border_handling(&self) -> BorderHandling {
        self.border_handling
    }

    pub fn format(&self) -> TrackFormat {
        let c = &self.columns;
        TrackFormat::new(
            self.geometry(),
            c.values.is_some(),
            c.ids.is_some() || c.edges.is_some(),
        )
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::from_columns(self.columns.starts.is_some(), self.columns.ends.is_some())
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn into_columns(self) -> Columns {
        self.columns
    }

    pub fn starts(&self) -> Option<&[usize]> {
        self.columns.starts.as_deref()
    }

    pub fn ends(&self) -> Option<&[usize]> {
        self.columns.ends.as_deref()
    }

    pub fn values(&self) -> Option<&[f64]> {
        self.columns.values.as_deref()
    }

    pub fn strands(&self) -> Option<&[Strand]> {
        self.columns.strands.as_deref()
    }

    pub fn ids(&self) -> Option<&[String]> {
        self.columns.ids.as_deref()
    }

    pub fn edges(&self) -> Option<&Ragged<String>> {
        self.columns.edges.as_ref()
    }

    pub fn weights(&self) -> Option<&Ragged<f64>> {
        self.columns.weights.as_ref()
    }

    /// Edges as a right padded matrix ('' for empty slots)
    pub fn edges_padded(&self) -> Option<Vec<Vec<String>>> {
        self.edges().map(|e| e.to_padded(String::new()))
    }

    /// Weights as a right padded matrix (NaN for empty slots)
    pub fn weights_padded(&self) -> Option<Vec<Vec<f64>>> {
        self.weights().map(|w| w.to_padded(f64::NAN))
    }

    pub fn extras(&self) -> &BTreeMap<String, ExtraColumn> {
        &self.columns.extras
    }

    pub fn extra(&self, name: &str) -> Option<&ExtraColumn> {
        self.columns.extras.get(name)
    }

    pub fn has_extra(&self, name: &str) -> bool {
        self.columns.extras.contains_key(name)
    }

    /// Start of every element, implied where the format does not store starts
    pub fn interval_starts(&self) -> Cow<'_, [usize]> {
        let base = self.region.start();
        match (&self.columns.starts, &self.columns.ends) {
            (Some(s), _) => Cow::Borrowed(s),
            (None, Some(e)) => Cow::Owned(
                std::iter::once(base)
                    .chain(e.iter().copied())
                    .take(e.len())
                    .collect(),
            ),
            (None, None) => Cow::Owned((base..base + self.size).collect()),
        }
    }

    /// End (exclusive) of every element, implied where the format does not store ends
    pub fn interval_ends(&self) -> Cow<'_, [usize]> {
        let base = self.region.start();
        match (&self.columns.starts, &self.columns.ends) {
            (_, Some(e)) => Cow::Borrowed(e),
            (Some(s), None) => Cow::Owned(s.iter().map(|x| x + 1).collect()),
            (None, None) => Cow::Owned((base + 1..base + self.size + 1).collect()),
        }
    }
}

/// Get the element count and check that all non-ragged columns agree with it
fn check_lengths(region: &RegionKey, c: &Columns) -> Result<usize> {
    let n = match (&c.starts, &c.ends) {
        (Some(s), Some(e)) => {
            if s.len() != e.len() {
                return Err(TrackError::LengthMismatch {
                    column: "ends",
                    expected: s.len(),
                    found: e.len(),
                });
            }
            s.len()
        }
        (Some(s), None) => s.len(),
        (None, Some(e)) => e.len(),
        (None, None) => {
            // Dense tracks cover every base of the region
            let any = c.values.is_some()
                || c.strands.is_some()
                || c.ids.is_some()
                || c.edges.is_some()
                || !c.extras.is_empty();
            if any {
                region.len()
            } else {
                0
            }
        }
    };

    let check = |column: &'static str, found: Option<usize>| match found {
        Some(found) if found != n => Err(TrackError::LengthMismatch {
            column,
            expected: n,
            found,
        }),
        _ => Ok(()),
    };
    check("values", c.values.as_ref().map(|v| v.len()))?;
    check("strands", c.strands.as_ref().map(|v| v.len()))?;
    check("ids", c.ids.as_ref().map(|v| v.len()))?;
    check("edges", c.edges.as_ref().map(|v| v.len()))?;
    check("weights", c.weights.as_ref().map(|v| v.len()))?;
    for extra in c.extras.values() {
        check("extras", Some(extra.len()))?;
    }
    Ok(n)
}

fn check_ragged(c: &Columns) -> Result<()> {
    match (&c.edges, &c.weights) {
        (None, Some(_)) => Err(TrackError::MissingColumn("edges")),
        (Some(e), Some(w)) => w.check_aligned(e),
        _ => Ok(()),
    }
}

/// Check element coordinates against the region, cropping or discarding
/// elements that cross the border
fn apply_border_handling(
    region: &RegionKey,
    mut c: Columns,
    n: usize,
    bh: BorderHandling,
) -> Result<(Columns, usize)> {
    match (c.starts.take(), c.ends.take()) {
        (Some(mut s), Some(mut e)) => {
            if let Some((index, (&start, &end))) =
                s.iter().zip(e.iter()).enumerate().find(|(_, (a, b))| b < a)
            {
                return Err(TrackError::InvalidInterval { index, start, end });
            }
            let keep = match bh {
                BorderHandling::Crop => {
                    for (index, (a, b)) in s.iter_mut().zip(e.iter_mut()).enumerate() {
                        // Empty intervals may sit on either border
                        let outside = if a == b {
                            *a < region.start() || *a > region.end()
                        } else {
                            *a >= region.end() || *b <= region.start()
                        };
                        if outside {
                            return Err(TrackError::OutsideRegion {
                                index,
                                start: *a,
                                end: *b,
                            });
                        }
                        *a = (*a).max(region.start());
                        *b = (*b).min(region.end());
                    }
                    None
                }
                BorderHandling::Discard => Some(
                    s.iter()
                        .zip(e.iter())
                        .enumerate()
                        .filter(|(_, (a, b))| region.contains(**a, **b))
                        .map(|(i, _)| i)
                        .collect(),
                ),
            };
            c.starts = Some(s);
            c.ends = Some(e);
            discard(c, n, keep)
        }
        (Some(s), None) => {
            let inside = |x: usize| region.contains(x, x + 1);
            let keep = match bh {
                BorderHandling::Crop => {
                    if let Some(index) = s.iter().position(|&x| !inside(x)) {
                        return Err(TrackError::OutsideRegion {
                            index,
                            start: s[index],
                            end: s[index] + 1,
                        });
                    }
                    None
                }
                BorderHandling::Discard => Some(
                    s.iter()
                        .enumerate()
                        .filter(|&(_, &x)| inside(x))
                        .map(|(i, _)| i)
                        .collect(),
                ),
            };
            c.starts = Some(s);
            discard(c, n, keep)
        }
        (None, Some(e)) => {
            // Partition ends must be increasing and inside the region
            let mut prev = region.start();
            for (index, &end) in e.iter().enumerate() {
                if end < prev {
                    return Err(TrackError::Unsorted { index });
                }
                if end > region.end() {
                    return Err(TrackError::OutsideRegion {
                        index,
                        start: prev,
                        end,
                    });
                }
                prev = end
            }
            c.ends = Some(e);
            Ok((c, n))
        }
        (None, None) => Ok((c, n)),
    }
}

fn discard(c: Columns, n: usize, keep: Option<Vec<usize>>) -> Result<(Columns, usize)> {
    match keep {
        Some(keep) if keep.len() < n => {
            trace!("Discarding {} elements crossing the region border", n - keep.len());
            let m = keep.len();
            Ok((c.select(&keep), m))
        }
        _ => Ok((c, n)),
    }
}

fn check_no_overlaps(c: &Columns) -> Result<()> {
    if let Some(s) = c.starts.as_deref() {
        for index in 1..s.len() {
            if s[index] < s[index - 1] {
                return Err(TrackError::Unsorted { index });
            }
            let prev_end = match c.ends.as_deref() {
                Some(e) => e[index - 1],
                None => s[index - 1] + 1,
            };
            if s[index] < prev_end {
                return Err(TrackError::Overlap { index });
            }
        }
    }
    Ok(())
}
