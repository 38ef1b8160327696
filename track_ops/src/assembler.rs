//! Assembly of result track views from one or more base views.
//!
//! An operation that reshapes a track computes only the new geometry and,
//! for every output element, the position of the base element it derives
//! from.  The assembler then pulls every other column from the bases at those
//! positions.  With several bases an encoding array selects, per output
//! element, the base it comes from.
//!
//! A column is only carried when every base has it.  If any base lacks a
//! column the result lacks it too; values are never invented for elements
//! drawn from a base that does not define them.

use std::collections::BTreeMap;

use crate::{
    columns::{select, Columns, ExtraColumn},
    error::{Result, TrackError},
    format::{BorderHandling, Strand},
    ragged::Ragged,
    region::RegionKey,
    track_view::TrackView,
};

/// The base views an assembled view draws its columns from
#[derive(Debug, Clone, Copy)]
pub enum Bases<'a> {
    /// Every output element comes from the same base
    Single(&'a TrackView),
    /// Output element k comes from views[encoding[k]]
    Multi {
        views: &'a [&'a TrackView],
        encoding: &'a [usize],
    },
}

/// Columns computed by the operation.  These take precedence over the
/// columns of the bases.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub starts: Option<Vec<usize>>,
    pub ends: Option<Vec<usize>>,
    pub strands: Option<Vec<Strand>>,
    pub values: Option<Vec<f64>>,
}

impl Overrides {
    pub fn geometry(starts: Vec<usize>, ends: Option<Vec<usize>>) -> Self {
        Self {
            starts: Some(starts),
            ends,
            ..Default::default()
        }
    }

    /// Check every override against the number of output elements
    fn check_len(&self, n: usize) -> Result<()> {
        let check = |column: &'static str, found: Option<usize>| match found {
            Some(found) if found != n => Err(TrackError::LengthMismatch {
                column,
                expected: n,
                found,
            }),
            _ => Ok(()),
        };
        check("starts", self.starts.as_ref().map(|v| v.len()))?;
        check("ends", self.ends.as_ref().map(|v| v.len()))?;
        check("strands", self.strands.as_ref().map(|v| v.len()))?;
        check("values", self.values.as_ref().map(|v| v.len()))
    }
}

/// Build a new track view for region
///
/// index gives, for every output element, the position of its source element
/// within its base.  Without an index the geometry must be given as override
/// starts and ends; there is nothing else to derive it from.
pub fn assemble(
    region: &RegionKey,
    index: Option<&[usize]>,
    bases: Bases<'_>,
    overrides: Overrides,
    allow_overlaps: bool,
) -> Result<TrackView> {
    if let (Some(s), Some(e)) = (&overrides.starts, &overrides.ends) {
        if s.len() != e.len() {
            return Err(TrackError::LengthMismatch {
                column: "ends",
                expected: s.len(),
                found: e.len(),
            });
        }
    }

    let columns = match index {
        None => {
            if overrides.starts.is_none() || overrides.ends.is_none() {
                return Err(TrackError::Unimplemented(
                    "assembling a track view without an index requires new starts and ends".into(),
                ));
            }
            let n = overrides.starts.as_ref().map(|v| v.len()).unwrap_or(0);
            overrides.check_len(n)?;
            Columns {
                starts: overrides.starts,
                ends: overrides.ends,
                strands: overrides.strands,
                values: overrides.values,
                ..Default::default()
            }
        }
        Some(index) => {
            overrides.check_len(index.len())?;
            match bases {
                Bases::Single(base) => single_base(base, index, overrides)?,
                Bases::Multi { views, encoding } => {
                    multi_base(views, encoding, index, overrides)?
                }
            }
        }
    };

    trace!(
        "Assembled {} elements for region {}",
        columns.starts.as_ref().map(|v| v.len()).unwrap_or(0),
        region
    );
    TrackView::new(region.clone(), columns, BorderHandling::Crop, allow_overlaps)
}

fn check_index(position: usize, index: usize, size: usize) -> Result<()> {
    if index < size {
        Ok(())
    } else {
        Err(TrackError::IndexOutOfRange {
            position,
            index,
            size,
        })
    }
}

/// Plain fancy indexing of one base
fn single_base(base: &TrackView, index: &[usize], ov: Overrides) -> Result<Columns> {
    for (position, &i) in index.iter().enumerate() {
        check_index(position, i, base.size())?;
    }
    let sel = |v: Option<&[usize]>| v.map(|v| select(v, index));
    Ok(Columns {
        starts: ov.starts.or_else(|| sel(base.starts())),
        ends: ov.ends.or_else(|| sel(base.ends())),
        values: ov.values.or_else(|| base.values().map(|v| select(v, index))),
        strands: ov
            .strands
            .or_else(|| base.strands().map(|v| select(v, index))),
        ids: base.ids().map(|v| select(v, index)),
        edges: base.edges().map(|r| r.select(index)),
        weights: base.weights().map(|r| r.select(index)),
        extras: base
            .extras()
            .iter()
            .map(|(k, c)| (k.clone(), c.select(index)))
            .collect(),
    })
}

/// Output positions drawn from one base, and the matching positions within that base
struct Part {
    positions: Vec<usize>,
    index: Vec<usize>,
}

fn multi_base(
    views: &[&TrackView],
    encoding: &[usize],
    index: &[usize],
    ov: Overrides,
) -> Result<Columns> {
    let n = index.len();
    if encoding.len() != n {
        return Err(TrackError::LengthMismatch {
            column: "encoding",
            expected: n,
            found: encoding.len(),
        });
    }

    let mut parts: Vec<_> = views
        .iter()
        .map(|_| Part {
            positions: Vec::new(),
            index: Vec::new(),
        })
        .collect();
    for (position, (&e, &i)) in encoding.iter().zip(index.iter()).enumerate() {
        let base = views.get(e).ok_or(TrackError::Encoding {
            position,
            value: e,
            bases: views.len(),
        })?;
        check_index(position, i, base.size())?;
        parts[e].positions.push(position);
        parts[e].index.push(i);
    }

    let starts = ov
        .starts
        .or_else(|| all_present(views, |tv| tv.starts()).map(|c| scatter(n, &parts, &c)));
    let ends = ov
        .ends
        .or_else(|| all_present(views, |tv| tv.ends()).map(|c| scatter(n, &parts, &c)));
    let values = ov
        .values
        .or_else(|| all_present(views, |tv| tv.values()).map(|c| scatter(n, &parts, &c)));
    let strands = ov
        .strands
        .or_else(|| all_present(views, |tv| tv.strands()).map(|c| scatter(n, &parts, &c)));
    let ids = all_present(views, |tv| tv.ids()).map(|c| scatter(n, &parts, &c));
    let edges = all_present(views, |tv| tv.edges()).map(|c| scatter_rows(n, &parts, &c));
    let weights = all_present(views, |tv| tv.weights()).map(|c| scatter_rows(n, &parts, &c));

    let mut extras = BTreeMap::new();
    if let Some(first) = views.first() {
        for name in first.extras().keys() {
            if let Some(c) = all_present(views, |tv| tv.extra(name))
                .and_then(|c| scatter_extra(n, &parts, &c))
            {
                extras.insert(name.clone(), c);
            }
        }
    }

    Ok(Columns {
        starts,
        ends,
        values,
        strands,
        ids,
        edges,
        weights,
        extras,
    })
}

/// The column of every base, or None if any base lacks it
fn all_present<'a, T: ?Sized>(
    views: &[&'a TrackView],
    get: impl Fn(&'a TrackView) -> Option<&'a T>,
) -> Option<Vec<&'a T>> {
    views.iter().map(|&tv| get(tv)).collect()
}

/// Scatter the contributions of every base into a new column of length n
fn scatter<T: Clone>(n: usize, parts: &[Part], cols: &[&[T]]) -> Vec<T> {
    let mut out: Vec<Option<T>> = vec![None; n];
    for (part, col) in parts.iter().zip(cols) {
        for (&p, &i) in part.positions.iter().zip(part.index.iter()) {
            out[p] = Some(col[i].clone())
        }
    }
    // Every position is assigned exactly one base, so nothing is dropped here
    out.into_iter().flatten().collect()
}

/// As scatter(), but moving whole rows of ragged columns
fn scatter_rows<T: Clone>(n: usize, parts: &[Part], cols: &[&Ragged<T>]) -> Ragged<T> {
    let mut rows: Vec<Option<&[T]>> = vec![None; n];
    for (part, col) in parts.iter().zip(cols) {
        for (&p, &i) in part.positions.iter().zip(part.index.iter()) {
            rows[p] = col.row(i)
        }
    }
    Ragged::from_rows(rows.into_iter().flatten())
}

/// Extra columns are only combined when every base stores the same element type
fn scatter_extra(n: usize, parts: &[Part], cols: &[&ExtraColumn]) -> Option<ExtraColumn> {
    macro_rules! same_type {
        ($variant:ident) => {{
            let v: Vec<_> = cols
                .iter()
                .filter_map(|c| match c {
                    ExtraColumn::$variant(v) => Some(v.as_slice()),
                    _ => None,
                })
                .collect();
            if v.len() == cols.len() {
                Some(ExtraColumn::$variant(scatter(n, parts, &v)))
            } else {
                None
            }
        }};
    }
    match cols.first()? {
        ExtraColumn::Int(_) => same_type!(Int),
        ExtraColumn::Float(_) => same_type!(Float),
        ExtraColumn::Str(_) => same_type!(Str),
    }
}
