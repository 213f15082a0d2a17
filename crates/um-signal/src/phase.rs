//! The four-phase signal cycle.

use std::fmt;

use um_core::Approach;

/// The colour an approach currently shows.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

impl LightState {
    pub fn as_str(self) -> &'static str {
        match self {
            LightState::Green  => "green",
            LightState::Yellow => "yellow",
            LightState::Red    => "red",
        }
    }

    #[inline]
    pub fn is_green(self) -> bool {
        self == LightState::Green
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four phases of an intersection.
///
/// North/south always share a colour and east/west show the complementary
/// one.  The cycle is strict:
///
/// ```text
/// NsGreenEwRed → NsYellowEwRed → NsRedEwGreen → NsRedEwYellow → NsGreenEwRed
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightPhase {
    NsGreenEwRed,
    NsYellowEwRed,
    NsRedEwGreen,
    NsRedEwYellow,
}

impl LightPhase {
    /// The phase that follows `self` in the cycle.
    pub fn next(self) -> LightPhase {
        match self {
            LightPhase::NsGreenEwRed  => LightPhase::NsYellowEwRed,
            LightPhase::NsYellowEwRed => LightPhase::NsRedEwGreen,
            LightPhase::NsRedEwGreen  => LightPhase::NsRedEwYellow,
            LightPhase::NsRedEwYellow => LightPhase::NsGreenEwRed,
        }
    }

    /// `true` for the two green phases.
    pub fn is_green(self) -> bool {
        matches!(self, LightPhase::NsGreenEwRed | LightPhase::NsRedEwGreen)
    }

    /// Colour shown to vehicles arriving on `approach`.
    pub fn state_for(self, approach: Approach) -> LightState {
        let ns = approach.is_north_south();
        match (self, ns) {
            (LightPhase::NsGreenEwRed, true)   => LightState::Green,
            (LightPhase::NsYellowEwRed, true)  => LightState::Yellow,
            (LightPhase::NsRedEwGreen, false)  => LightState::Green,
            (LightPhase::NsRedEwYellow, false) => LightState::Yellow,
            _ => LightState::Red,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LightPhase::NsGreenEwRed  => "NS_GREEN_EW_RED",
            LightPhase::NsYellowEwRed => "NS_YELLOW_EW_RED",
            LightPhase::NsRedEwGreen  => "NS_RED_EW_GREEN",
            LightPhase::NsRedEwYellow => "NS_RED_EW_YELLOW",
        }
    }
}

impl fmt::Display for LightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
