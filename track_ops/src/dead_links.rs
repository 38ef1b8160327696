use std::{collections::HashSet, sync::Arc};

use crate::{
    collection::TrackCollection,
    columns::Columns,
    error::{Result, TrackError},
    pool::map_regions,
    ragged::Ragged,
    region::RegionKey,
    track_view::TrackView,
    Operation,
};

/// Edge and weight columns after pruning
#[derive(Debug, Clone, PartialEq)]
pub struct PrunedEdges {
    pub edges: Ragged<String>,
    pub weights: Option<Ragged<f64>>,
    pub dead: usize,
}

/// Remove (or rename) edges that point to an id not in valid
///
/// With new_id given, every dead edge is replaced by new_id and its weight is
/// kept.  Otherwise dead edges are dropped together with their weights, and the
/// surviving edges of each row keep their original order.
///
/// Empty ('') slots are padding, never dead: they are left as they are when
/// renaming and dropped when compacting.
///
/// Weights, if present, must have the same shape as edges.
pub fn prune_edges(
    edges: &Ragged<String>,
    weights: Option<&Ragged<f64>>,
    valid: &HashSet<&str>,
    new_id: Option<&str>,
) -> Result<PrunedEdges> {
    if let Some(w) = weights {
        w.check_aligned(edges)?
    }
    let mut new_edges = Ragged::with_capacity(edges.len(), edges.n_entries());
    let mut new_weights = weights.map(|w| Ragged::with_capacity(w.len(), w.n_entries()));
    let mut dead = 0;

    for (i, row) in edges.rows().enumerate() {
        let live: Vec<bool> = row
            .iter()
            .map(|e| !e.is_empty() && valid.contains(e.as_str()))
            .collect();
        dead += row
            .iter()
            .zip(&live)
            .filter(|&(e, &x)| !(x || e.is_empty()))
            .count();
        let w_row = weights.and_then(|w| w.row(i));
        match new_id {
            Some(id) => {
                new_edges.push_row(row.iter().zip(&live).map(|(e, &x)| {
                    if x || e.is_empty() {
                        e.clone()
                    } else {
                        id.to_owned()
                    }
                }));
                if let (Some(nw), Some(wr)) = (new_weights.as_mut(), w_row) {
                    nw.push_row(wr.iter().copied())
                }
            }
            None => {
                new_edges.push_row(
                    row.iter()
                        .zip(&live)
                        .filter(|&(_, &x)| x)
                        .map(|(e, _)| e.clone()),
                );
                if let (Some(nw), Some(wr)) = (new_weights.as_mut(), w_row) {
                    nw.push_row(wr.iter().zip(&live).filter(|&(_, &x)| x).map(|(w, _)| *w))
                }
            }
        }
    }
    Ok(PrunedEdges {
        edges: new_edges,
        weights: new_weights,
        dead,
    })
}

/// Set of non-empty ids of a view
fn id_set(ids: &[String]) -> HashSet<&str> {
    ids.iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.as_str())
        .collect()
}

/// RemoveDeadLinks
///
/// Removes from a linked track every edge whose target id does not exist.
/// By default an id exists if some element of the same region has it; with
/// use_global set, ids from every region of the track count.  Empty ids are
/// never valid edge targets.
///
/// With new_id set, dead edges are replaced by new_id instead of removed.
///
/// Every region of the genome is present in the result; regions without data,
/// or where every id is empty, get an empty view.  All columns other than edges and weights are copied
/// unchanged.
pub struct RemoveDeadLinks<'a> {
    track: &'a TrackCollection,
    new_id: Option<String>,
    use_global: bool,
    result_allow_overlap: bool,
    threads: usize,
}

impl<'a> RemoveDeadLinks<'a> {
    pub fn new(track: &'a TrackCollection) -> Self {
        Self {
            track,
            new_id: None,
            use_global: false,
            result_allow_overlap: false,
            threads: 1,
        }
    }

    pub fn new_id<S: Into<String>>(mut self, id: Option<S>) -> Self {
        self.new_id = id.map(|s| s.into());
        self
    }

    pub fn use_global(mut self, x: bool) -> Self {
        self.use_global = x;
        self
    }

    pub fn result_allow_overlap(mut self, x: bool) -> Self {
        self.result_allow_overlap = x;
        self
    }

    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n;
        self
    }

    /// Ids of every region of the track
    fn global_ids(&self) -> HashSet<&'a str> {
        let track: &'a TrackCollection = self.track;
        let mut ids = HashSet::new();
        for (_, tv) in track.views() {
            if let Some(v) = tv.ids() {
                ids.extend(v.iter().filter(|s| !s.is_empty()).map(|s| s.as_str()))
            }
        }
        ids
    }

    fn calculate_region(
        &self,
        region: &RegionKey,
        global: Option<&HashSet<&str>>,
    ) -> Result<Option<TrackView>> {
        let tv = match self.track.get(region) {
            Some(tv) if !tv.is_empty() => tv,
            _ => return Ok(Some(TrackView::empty(region.clone()))),
        };
        let ids = tv.ids().ok_or(TrackError::MissingColumn("ids"))?;
        let edges = tv.edges().ok_or(TrackError::MissingColumn("edges"))?;
        if ids.iter().all(|s| s.is_empty()) {
            trace!("RemoveDeadLinks {}: no ids", region);
            return Ok(Some(TrackView::empty(region.clone())));
        }

        let local;
        let valid = match global {
            Some(g) => g,
            None => {
                local = id_set(ids);
                &local
            }
        };
        let pruned = prune_edges(edges, tv.weights(), valid, self.new_id.as_deref())?;
        trace!(
            "RemoveDeadLinks {}: {} dead edges, width {} -> {}",
            region,
            pruned.dead,
            edges.padded_width(),
            pruned.edges.padded_width()
        );

        let c = tv.columns();
        let columns = Columns {
            starts: c.starts.clone(),
            ends: c.ends.clone(),
            values: c.values.clone(),
            strands: c.strands.clone(),
            ids: c.ids.clone(),
            edges: Some(pruned.edges),
            weights: pruned.weights,
            extras: c.extras.clone(),
        };
        TrackView::new(
            region.clone(),
            columns,
            tv.border_handling(),
            self.result_allow_overlap,
        )
        .map(Some)
    }
}

impl Operation for RemoveDeadLinks<'_> {
    fn name(&self) -> &'static str {
        "remove-dead-links"
    }

    fn calculate(&self) -> Result<TrackCollection> {
        debug!(
            "RemoveDeadLinks: new_id: {:?}, use_global: {}, result_allow_overlap: {}",
            self.new_id, self.use_global, self.result_allow_overlap
        );
        let global = if self.use_global {
            let ids = self.global_ids();
            debug!("RemoveDeadLinks: {} ids over all regions", ids.len());
            Some(ids)
        } else {
            None
        };
        let regions = self.track.regions();
        let views = map_regions(&regions, self.threads, |r| {
            self.calculate_region(r, global.as_ref())
        })?;
        TrackCollection::new(Arc::clone(self.track.genome()), views)
    }
}
