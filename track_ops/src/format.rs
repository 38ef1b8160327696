use std::{fmt, str::FromStr};

use crate::error::TrackError;

/// Strand of an element.  Missing ('.') is a category of its own and is
/// never equal to Plus or Minus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    Plus,
    Minus,
    Missing,
}

impl FromStr for Strand {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::Plus),
            "-" => Ok(Self::Minus),
            "." => Ok(Self::Missing),
            _ => Err(TrackError::UnknownStrand(s.to_owned())),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Missing => ".",
        };
        f.write_str(s)
    }
}

/// What happens to elements that cross the border of the region of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderHandling {
    /// Clip segments to the region
    #[default]
    Crop,
    /// Drop elements not completely inside the region
    Discard,
}

impl FromStr for BorderHandling {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crop" => Ok(Self::Crop),
            "discard" => Ok(Self::Discard),
            _ => Err(TrackError::UnknownBorderHandling(s.to_owned())),
        }
    }
}

impl fmt::Display for BorderHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crop => f.write_str("crop"),
            Self::Discard => f.write_str("discard"),
        }
    }
}

/// Geometry of a track, derived from which coordinate columns are present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// starts only; end is implied as start + 1
    Points,
    /// starts and ends
    Segments,
    /// ends only; start is implied as the previous end
    Partition,
    /// neither; one element per base of the region
    Dense,
}

impl Geometry {
    pub fn from_columns(has_starts: bool, has_ends: bool) -> Self {
        match (has_starts, has_ends) {
            (true, true) => Self::Segments,
            (true, false) => Self::Points,
            (false, true) => Self::Partition,
            (false, false) => Self::Dense,
        }
    }
}

/// TrackFormat
///
/// Classification of a track view.  This is never stored; it follows from
/// which columns are present (see TrackView::format()).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackFormat {
    geometry: Geometry,
    valued: bool,
    linked: bool,
}

impl TrackFormat {
    pub fn new(geometry: Geometry, valued: bool, linked: bool) -> Self {
        Self {
            geometry,
            valued,
            linked,
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn is_valued(&self) -> bool {
        self.valued
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Whether the elements are intervals with their own explicit starts
    pub fn is_interval(&self) -> bool {
        matches!(self.geometry, Geometry::Points | Geometry::Segments)
    }

    pub fn name(&self) -> String {
        let base = match (self.geometry, self.valued) {
            (Geometry::Points, false) => "points",
            (Geometry::Points, true) => "valued points",
            (Geometry::Segments, false) => "segments",
            (Geometry::Segments, true) => "valued segments",
            (Geometry::Partition, false) => "genome partition",
            (Geometry::Partition, true) => "step function",
            (Geometry::Dense, false) => "base pairs",
            (Geometry::Dense, true) => "function",
        };
        if self.linked {
            format!("Linked {}", base)
        } else {
            let mut s = base.to_owned();
            s[..1].make_ascii_uppercase();
            s
        }
    }
}

impl fmt::Display for TrackFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
