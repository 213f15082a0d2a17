//! Cardinal approach directions shared by the signal and simulation crates.
//!
//! An approach is the heading a vehicle travels on as it enters an
//! intersection.  Traffic lights keep one queue per approach, in the canonical
//! order north, east, south, west (the order `Approach::index` returns).

use std::str::FromStr;

use crate::CoreError;

/// One of the four cardinal approaches into an intersection.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Approach {
    North,
    East,
    South,
    West,
}

impl Approach {
    /// All approaches in canonical queue order (N, E, S, W).
    pub const ALL: [Approach; 4] = [
        Approach::North,
        Approach::East,
        Approach::South,
        Approach::West,
    ];

    /// Queue index in canonical order.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Approach::North => 0,
            Approach::East  => 1,
            Approach::South => 2,
            Approach::West  => 3,
        }
    }

    /// The reverse heading (a U-turn).
    #[inline]
    pub fn opposite(self) -> Approach {
        match self {
            Approach::North => Approach::South,
            Approach::East  => Approach::West,
            Approach::South => Approach::North,
            Approach::West  => Approach::East,
        }
    }

    /// `true` for north and south, which always share a light state.
    #[inline]
    pub fn is_north_south(self) -> bool {
        matches!(self, Approach::North | Approach::South)
    }

    /// Lower-case name, as used in map attributes and CSV output.
    pub fn as_str(self) -> &'static str {
        match self {
            Approach::North => "north",
            Approach::East  => "east",
            Approach::South => "south",
            Approach::West  => "west",
        }
    }
}

impl std::fmt::Display for Approach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Approach {
    type Err = CoreError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" => Ok(Approach::North),
            "east"  => Ok(Approach::East),
            "south" => Ok(Approach::South),
            "west"  => Ok(Approach::West),
            _ => Err(CoreError::UnknownApproach(s.to_owned())),
        }
    }
}
