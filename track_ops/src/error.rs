use thiserror::Error;

/// Errors raised while building track views or running track operations
///
/// All failures are immediate and deterministic; nothing here is retryable.
#[derive(Error, Debug)]
pub enum TrackError {
    /// The requested combination of inputs has no defined result
    #[error("Not implemented: {0}")]
    Unimplemented(String),

    #[error("Length of column {column} is {found}, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Element {index}: end ({end}) is before start ({start})")]
    InvalidInterval {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("Element {index} is out of order and overlaps are not allowed")]
    Unsorted { index: usize },

    #[error("Element {index} overlaps the previous element and overlaps are not allowed")]
    Overlap { index: usize },

    #[error("Element {index} ({start}-{end}) lies outside the region")]
    OutsideRegion {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("Row {row}: {edges} edges but {weights} weights")]
    RaggedMismatch {
        row: usize,
        edges: usize,
        weights: usize,
    },

    #[error("Required column {0} is missing")]
    MissingColumn(&'static str),

    #[error("Encoding value {value} at position {position} does not refer to one of {bases} base tracks")]
    Encoding {
        position: usize,
        value: usize,
        bases: usize,
    },

    #[error("Index {index} at position {position} is out of range for a base track of size {size}")]
    IndexOutOfRange {
        position: usize,
        index: usize,
        size: usize,
    },

    #[error("Track view for {view} stored under region {key}")]
    RegionMismatch { key: String, view: String },

    #[error("Unknown border handling policy: {0}")]
    UnknownBorderHandling(String),

    #[error("Unknown strand: {0}")]
    UnknownStrand(String),

    #[error("Region worker thread {0} panicked")]
    WorkerPanic(usize),
}

pub type Result<T> = std::result::Result<T, TrackError>;
