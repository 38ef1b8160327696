use std::{cmp::Ordering, fmt, sync::Arc};

/// RegionKey
///
/// Identifies the coordinate space of one track view: a half open interval
/// [start, end) on a chromosome of a genome build.
///
/// Keys are ordered by chromosome name, then start (then end and build so that
/// the ordering agrees with equality).  Note that the ordering of chromosome
/// names is lexical; the canonical order of regions is given by the Genome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionKey {
    genome_build: Arc<str>,
    chromosome: Arc<str>,
    start: usize,
    end: usize,
}

impl RegionKey {
    pub fn new(genome_build: &str, chromosome: &str, start: usize, end: usize) -> Self {
        Self {
            genome_build: Arc::from(genome_build),
            chromosome: Arc::from(chromosome),
            start,
            end,
        }
    }

    /// Build a key sharing the name storage of an existing genome build / chromosome
    pub(crate) fn from_shared(
        genome_build: &Arc<str>,
        chromosome: Arc<str>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            genome_build: Arc::clone(genome_build),
            chromosome,
            start,
            end,
        }
    }

    pub fn genome_build(&self) -> &str {
        &self.genome_build
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the half open interval [start, end) lies within the region
    pub fn contains(&self, start: usize, end: usize) -> bool {
        start >= self.start && end <= self.end
    }
}

impl Ord for RegionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chromosome
            .cmp(&other.chromosome)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
            .then(self.genome_build.cmp(&other.genome_build))
    }
}

impl PartialOrd for RegionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}",
            self.genome_build, self.chromosome, self.start, self.end
        )
    }
}
