use std::sync::Arc;

use crate::region::RegionKey;

/// Genome
///
/// A genome build together with its canonical, ordered list of regions (one
/// per chromosome, covering the whole chromosome).  The order of the region
/// list is the iteration order of every track collection bound to the genome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genome {
    name: Arc<str>,
    regions: Vec<RegionKey>,
}

impl Genome {
    /// Create a genome from (chromosome, length) pairs, in canonical order
    pub fn new<S: AsRef<str>>(name: &str, chromosomes: impl IntoIterator<Item = (S, usize)>) -> Self {
        let name: Arc<str> = Arc::from(name);
        let regions = chromosomes
            .into_iter()
            .map(|(ctg, len)| RegionKey::from_shared(&name, Arc::from(ctg.as_ref()), 0, len))
            .collect();
        Self { name, regions }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn regions(&self) -> &[RegionKey] {
        &self.regions
    }

    /// Look up the region for a chromosome
    pub fn region(&self, chromosome: &str) -> Option<&RegionKey> {
        self.regions.iter().find(|r| r.chromosome() == chromosome)
    }

    /// Position of a region in the canonical order
    pub fn position(&self, region: &RegionKey) -> Option<usize> {
        self.regions.iter().position(|r| r == region)
    }
}
