//! Operations on genomic tracks.
//!
//! A track is a set of elements (points, segments, partitions or base pair
//! values) laid out over the regions of a genome.  Per region the elements
//! live in a [`TrackView`]: parallel columns of starts, ends, values,
//! strands, ids, edges, weights and any extra named columns.  A
//! [`TrackCollection`] holds the views of one track for every region.
//!
//! Operations consume one or more collections and produce a new one:
//!
//! - [`Subtract`] removes from the elements of one track the parts covered by
//!   another track.
//! - [`RemoveDeadLinks`] drops (or renames) edges of a linked track whose
//!   target id does not exist.
//!
//! Results are built by the [`assembler`], which derives every column that
//! the operation does not compute from the base views.

#[macro_use]
extern crate log;

pub mod assembler;
pub mod collection;
pub mod columns;
pub mod dead_links;
pub mod error;
pub mod format;
pub mod genome;
pub mod ragged;
pub mod region;
pub mod subtract;
pub mod track_view;

mod pool;

pub use collection::TrackCollection;
pub use columns::{Columns, ExtraColumn};
pub use dead_links::RemoveDeadLinks;
pub use error::{Result, TrackError};
pub use format::{BorderHandling, Geometry, Strand, TrackFormat};
pub use genome::Genome;
pub use ragged::Ragged;
pub use region::RegionKey;
pub use subtract::Subtract;
pub use track_view::TrackView;

/// A track operation: a configured computation over one or more input
/// collections giving a new collection.
///
/// Inputs are never modified.  Running the same operation twice gives the
/// same result.
pub trait Operation {
    fn name(&self) -> &'static str;
    fn calculate(&self) -> Result<TrackCollection>;
}
