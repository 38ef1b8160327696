use std::{collections::BTreeMap, sync::Arc};

use crate::{
    assembler::{assemble, Bases, Overrides},
    collection::TrackCollection,
    error::Result,
    format::{Geometry, Strand},
    pool::map_regions,
    region::RegionKey,
    track_view::TrackView,
    Operation,
};

/// How strands decide which elements of B are subtracted from an element of A
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrandMode {
    /// Every element of B applies to every element of A
    Ignore,
    /// Only elements on the same strand apply.  Missing strands ('.') form a
    /// group of their own unless missing_as_negative is set, in which case
    /// they are grouped with '-'.
    Match { missing_as_negative: bool },
}

impl StrandMode {
    fn key(&self, strands: Option<&[Strand]>, i: usize) -> Option<Strand> {
        match self {
            Self::Ignore => None,
            Self::Match {
                missing_as_negative,
            } => {
                let s = strands.map(|s| s[i]).unwrap_or(Strand::Missing);
                if *missing_as_negative && s == Strand::Missing {
                    Some(Strand::Minus)
                } else {
                    Some(s)
                }
            }
        }
    }
}

/// A set of half open intervals [starts[i], ends[i]) with optional strands
#[derive(Debug, Clone, Copy)]
pub struct Intervals<'a> {
    pub starts: &'a [usize],
    pub ends: &'a [usize],
    pub strands: Option<&'a [Strand]>,
}

/// Result of subtracting one interval set from another.  index[k] is the
/// element of A that the interval [starts[k], ends[k]) comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Difference {
    pub starts: Vec<usize>,
    pub ends: Vec<usize>,
    pub index: Vec<usize>,
}

impl Difference {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Subtract the union of the intervals of b from every interval of a
///
/// Each interval of a gives zero or more disjoint pieces.  Intervals that only
/// touch (a.end == b.start) are not subtracted.  The result is sorted by
/// start, then end, then index.
pub fn subtract_intervals(a: Intervals<'_>, b: Intervals<'_>, mode: StrandMode) -> Difference {
    // Union of the b intervals of each strand group, sorted and disjoint.
    // Empty b intervals cover nothing
    let mut groups: BTreeMap<Option<Strand>, Vec<(usize, usize)>> = BTreeMap::new();
    for (i, (&s, &e)) in b.starts.iter().zip(b.ends).enumerate() {
        if s >= e {
            continue;
        }
        groups
            .entry(mode.key(b.strands, i))
            .or_default()
            .push((s, e))
    }
    let groups: BTreeMap<_, _> = groups
        .into_iter()
        .map(|(k, v)| (k, merge_intervals(v)))
        .collect();

    let mut pieces = Vec::with_capacity(a.starts.len());
    for (i, (&s, &e)) in a.starts.iter().zip(a.ends).enumerate() {
        match groups.get(&mode.key(a.strands, i)) {
            Some(cover) => subtract_one(s, e, cover, |x, y| pieces.push((x, y, i))),
            None => pieces.push((s, e, i)),
        }
    }
    pieces.sort_unstable();

    let mut d = Difference {
        starts: Vec::with_capacity(pieces.len()),
        ends: Vec::with_capacity(pieces.len()),
        index: Vec::with_capacity(pieces.len()),
    };
    for (s, e, i) in pieces {
        d.starts.push(s);
        d.ends.push(e);
        d.index.push(i);
    }
    d
}

/// Sort intervals and merge overlapping or touching ones
fn merge_intervals(mut v: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    v.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(v.len());
    for (s, e) in v {
        match merged.last_mut() {
            Some(last) if s <= last.1 => last.1 = last.1.max(e),
            _ => merged.push((s, e)),
        }
    }
    merged
}

/// Emit the parts of [start, end) not covered by the sorted, disjoint cover
fn subtract_one<F: FnMut(usize, usize)>(start: usize, end: usize, cover: &[(usize, usize)], mut emit: F) {
    let first = cover.partition_point(|&(_, e)| e <= start);
    if start == end {
        // Empty intervals survive unless they lie strictly inside a covering interval
        if !cover[first..].first().is_some_and(|&(s, _)| s <= start) {
            emit(start, end)
        }
        return;
    }
    let mut cur = start;
    for &(s, e) in &cover[first..] {
        if s >= end {
            break;
        }
        if s > cur {
            emit(cur, s)
        }
        cur = cur.max(e);
        if cur >= end {
            break;
        }
    }
    if cur < end {
        emit(cur, end)
    }
}

/// Subtract
///
/// Removes from every element of track A the parts covered by elements of
/// track B.  Every other column of A (values, strands, ids, edges, weights,
/// extras) is carried over to the pieces; nothing is taken from B.
///
/// Points in A give points in the result; all other formats give segments.
/// Regions where nothing of A survives are not stored in the result (they
/// report size 0).
///
/// Strands are only used when both tracks have a strand column.
pub struct Subtract<'a> {
    a: &'a TrackCollection,
    b: &'a TrackCollection,
    result_allow_overlap: bool,
    use_strands: bool,
    treat_missing_as_negative: bool,
    threads: usize,
}

impl<'a> Subtract<'a> {
    pub fn new(a: &'a TrackCollection, b: &'a TrackCollection) -> Self {
        Self {
            a,
            b,
            result_allow_overlap: false,
            use_strands: true,
            treat_missing_as_negative: false,
            threads: 1,
        }
    }

    pub fn result_allow_overlap(mut self, x: bool) -> Self {
        self.result_allow_overlap = x;
        self
    }

    pub fn use_strands(mut self, x: bool) -> Self {
        self.use_strands = x;
        self
    }

    pub fn treat_missing_as_negative(mut self, x: bool) -> Self {
        self.treat_missing_as_negative = x;
        self
    }

    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n;
        self
    }

    fn strand_mode(&self, a: &TrackView, b: Option<&TrackView>) -> StrandMode {
        let b_strands = b.map(|b| b.strands().is_some()).unwrap_or(false);
        if self.use_strands && a.strands().is_some() && b_strands {
            StrandMode::Match {
                missing_as_negative: self.treat_missing_as_negative,
            }
        } else {
            StrandMode::Ignore
        }
    }

    fn calculate_region(&self, region: &RegionKey) -> Result<Option<TrackView>> {
        let a = match self.a.get(region) {
            Some(a) if !a.is_empty() => a,
            _ => return Ok(None),
        };
        let b = self.b.get(region);
        let mode = self.strand_mode(a, b);

        let (a_starts, a_ends) = (a.interval_starts(), a.interval_ends());
        let a_int = Intervals {
            starts: &a_starts,
            ends: &a_ends,
            strands: a.strands(),
        };
        let d = match b {
            Some(b) => {
                let (b_starts, b_ends) = (b.interval_starts(), b.interval_ends());
                let b_int = Intervals {
                    starts: &b_starts,
                    ends: &b_ends,
                    strands: b.strands(),
                };
                subtract_intervals(a_int, b_int, mode)
            }
            None => subtract_intervals(
                a_int,
                Intervals {
                    starts: &[],
                    ends: &[],
                    strands: None,
                },
                mode,
            ),
        };
        trace!(
            "Subtract {}: {} elements in A, {} pieces remaining",
            region,
            a.size(),
            d.len()
        );
        if d.is_empty() {
            return Ok(None);
        }

        let ends = match a.geometry() {
            Geometry::Points => None,
            _ => Some(d.ends),
        };
        assemble(
            region,
            Some(&d.index),
            Bases::Single(a),
            Overrides::geometry(d.starts, ends),
            self.result_allow_overlap,
        )
        .map(Some)
    }
}

impl Operation for Subtract<'_> {
    fn name(&self) -> &'static str {
        "subtract"
    }

    fn calculate(&self) -> Result<TrackCollection> {
        debug!(
            "Subtract: use_strands: {}, treat_missing_as_negative: {}, result_allow_overlap: {}",
            self.use_strands, self.treat_missing_as_negative, self.result_allow_overlap
        );
        let regions = self.a.regions();
        let views = map_regions(&regions, self.threads, |r| self.calculate_region(r))?;
        debug!("Subtract: results for {} of {} regions", views.len(), regions.len());
        TrackCollection::new(Arc::clone(self.a.genome()), views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints<'a>(starts: &'a [usize], ends: &'a [usize]) -> Intervals<'a> {
        Intervals {
            starts,
            ends,
            strands: None,
        }
    }

    fn pieces(d: &Difference) -> Vec<(usize, usize)> {
        d.starts.iter().copied().zip(d.ends.iter().copied()).collect()
    }

    #[test]
    fn b_inside_a_splits_a() {
        let d = subtract_intervals(ints(&[2], &[15]), ints(&[3, 8], &[5, 10]), StrandMode::Ignore);
        assert_eq!(pieces(&d), vec![(2, 3), (5, 8), (10, 15)]);
        assert_eq!(d.index, vec![0, 0, 0]);
    }

    #[test]
    fn covered_and_touching() {
        // Equal intervals and A inside B leave nothing
        let d = subtract_intervals(ints(&[2], &[4]), ints(&[2], &[4]), StrandMode::Ignore);
        assert!(d.is_empty());
        let d = subtract_intervals(ints(&[3], &[5]), ints(&[2], &[6]), StrandMode::Ignore);
        assert!(d.is_empty());
        // Touching intervals are kept
        let d = subtract_intervals(ints(&[2, 8], &[4, 10]), ints(&[4], &[8]), StrandMode::Ignore);
        assert_eq!(pieces(&d), vec![(2, 4), (8, 10)]);
    }

    #[test]
    fn overlapping_b_intervals_are_merged() {
        let d = subtract_intervals(
            ints(&[0], &[20]),
            ints(&[8, 2, 4, 15], &[12, 6, 9, 15]),
            StrandMode::Ignore,
        );
        assert_eq!(pieces(&d), vec![(0, 2), (12, 20)]);
    }

    #[test]
    fn empty_b_interval_covers_nothing() {
        let d = subtract_intervals(ints(&[0], &[20]), ints(&[10], &[10]), StrandMode::Ignore);
        assert_eq!(pieces(&d), vec![(0, 20)]);
        assert_eq!(d.index, vec![0]);
        // An empty a interval at the same position also survives
        let d = subtract_intervals(ints(&[10], &[10]), ints(&[10], &[10]), StrandMode::Ignore);
        assert_eq!(pieces(&d), vec![(10, 10)]);
    }

    #[test]
    fn result_is_sorted_with_index() {
        let d = subtract_intervals(
            ints(&[20, 2, 6], &[26, 4, 8]),
            ints(&[3, 22], &[7, 24]),
            StrandMode::Ignore,
        );
        assert_eq!(pieces(&d), vec![(2, 3), (7, 8), (20, 22), (24, 26)]);
        assert_eq!(d.index, vec![1, 2, 0, 0]);
    }

    #[test]
    fn strand_groups() {
        let a_strands = [Strand::Plus, Strand::Minus, Strand::Missing];
        let b_strands = [Strand::Minus];
        let a = Intervals {
            starts: &[0, 10, 20],
            ends: &[5, 15, 25],
            strands: Some(&a_strands),
        };
        let b = Intervals {
            starts: &[0],
            ends: &[30],
            strands: Some(&b_strands),
        };
        let d = subtract_intervals(a, b, StrandMode::Match { missing_as_negative: false });
        assert_eq!(d.index, vec![0, 2]);
        let d = subtract_intervals(a, b, StrandMode::Match { missing_as_negative: true });
        assert_eq!(d.index, vec![0]);
        let d = subtract_intervals(a, b, StrandMode::Ignore);
        assert!(d.is_empty());
    }

    #[test]
    fn empty_intervals() {
        let d = subtract_intervals(ints(&[5, 10], &[5, 10]), ints(&[4], &[8]), StrandMode::Ignore);
        assert_eq!(pieces(&d), vec![(10, 10)]);
    }
}
