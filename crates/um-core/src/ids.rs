//! Strongly typed, zero-cost identifier wrappers.
//!
//! Node and edge IDs index directly into the graph's CSR arrays.  Vehicle IDs
//! are issued sequentially by the simulation (`VehicleId::next`) and are never
//! reused within a run, so a `BTreeMap<VehicleId, _>` iterates in spawn order.
//!
//! Each ID displays with a short prefix (`N3`, `E12`, `V7`) that matches how
//! the simulation reports them in logs and CSV output.

use std::fmt;

/// Generate a typed ID wrapper around a `u32` with a display prefix.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident => $prefix:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(u32::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// `false` for the `INVALID` sentinel.
            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }

            /// The ID following `self` in issue order.
            #[inline]
            pub fn next(self) -> $name {
                $name(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($prefix, "{}"), self.0)
                } else {
                    f.write_str(concat!($prefix, "?"))
                }
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a street-network node (intersection or dead end).
    pub struct NodeId => "N";
}

typed_id! {
    /// Index of a directed street-network edge.
    pub struct EdgeId => "E";
}

typed_id! {
    /// Identifier of a simulated vehicle.
    pub struct VehicleId => "V";
}
