use std::{borrow::Cow, collections::BTreeMap, sync::Arc};

use crate::{
    error::{Result, TrackError},
    genome::Genome,
    region::RegionKey,
    track_view::TrackView,
};

/// TrackCollection
///
/// All views of one logical track, keyed by region and bound to a genome.
/// Iteration follows the canonical region order of the genome; views stored
/// under regions the genome does not list come last, in key order.
///
/// A collection is built once and never modified.  A region without a stored
/// view reports an empty view of size 0.
#[derive(Debug, Clone)]
pub struct TrackCollection {
    genome: Arc<Genome>,
    views: BTreeMap<RegionKey, TrackView>,
}

impl TrackCollection {
    pub fn new(genome: Arc<Genome>, views: BTreeMap<RegionKey, TrackView>) -> Result<Self> {
        if let Some((k, v)) = views.iter().find(|(k, v)| *k != v.region()) {
            return Err(TrackError::RegionMismatch {
                key: k.to_string(),
                view: v.region().to_string(),
            });
        }
        Ok(Self { genome, views })
    }

    /// Build a collection keyed by the regions of the views themselves
    pub fn from_views(genome: Arc<Genome>, views: impl IntoIterator<Item = TrackView>) -> Self {
        let views = views
            .into_iter()
            .map(|tv| (tv.region().clone(), tv))
            .collect();
        Self { genome, views }
    }

    pub fn genome(&self) -> &Arc<Genome> {
        &self.genome
    }

    /// Regions to process: the genome regions followed by any other stored regions
    pub fn regions(&self) -> Vec<RegionKey> {
        let mut v = self.genome.regions().to_vec();
        v.extend(
            self.views
                .keys()
                .filter(|k| self.genome.position(k).is_none())
                .cloned(),
        );
        v
    }

    pub fn get(&self, region: &RegionKey) -> Option<&TrackView> {
        self.views.get(region)
    }

    /// The view for a region, or an empty view if none is stored
    pub fn view(&self, region: &RegionKey) -> Cow<'_, TrackView> {
        match self.views.get(region) {
            Some(tv) => Cow::Borrowed(tv),
            None => Cow::Owned(TrackView::empty(region.clone())),
        }
    }

    /// Number of elements in a region (0 if no view is stored)
    pub fn size(&self, region: &RegionKey) -> usize {
        self.views.get(region).map(|tv| tv.size()).unwrap_or(0)
    }

    /// Stored views in iteration order
    pub fn views(&self) -> impl Iterator<Item = (&RegionKey, &TrackView)> + '_ {
        self.regions()
            .into_iter()
            .filter_map(move |r| self.views.get_key_value(&r))
    }

    /// Every region in iteration order, with empty views for regions without data
    pub fn all_views(&self) -> impl Iterator<Item = (RegionKey, Cow<'_, TrackView>)> + '_ {
        self.regions().into_iter().map(move |r| {
            let tv = self.view(&r);
            (r, tv)
        })
    }

    /// Number of stored views
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Total number of elements over all regions
    pub fn total_size(&self) -> usize {
        self.views.values().map(|tv| tv.size()).sum()
    }
}
