//! Routine catalogue.

use crate::error::MotionError;
use std::fmt;
use std::str::FromStr;

/// A named, state-free choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Routine {
    Reset,
    RandomEyes,
    MinMax,
    Mirror,
    HalfAndHalf,
    Columns,
    Rows,
    LookLeft,
    LookRight,
    Ladders,
    Vibrate,
}

impl Routine {
    /// Every routine, in catalogue order.
    pub const ALL: [Routine; 11] = [
        Routine::Reset,
        Routine::RandomEyes,
        Routine::MinMax,
        Routine::Mirror,
        Routine::HalfAndHalf,
        Routine::Columns,
        Routine::Rows,
        Routine::LookLeft,
        Routine::LookRight,
        Routine::Ladders,
        Routine::Vibrate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Routine::Reset => "reset",
            Routine::RandomEyes => "random_eyes",
            Routine::MinMax => "min_max",
            Routine::Mirror => "mirror",
            Routine::HalfAndHalf => "half_and_half",
            Routine::Columns => "columns",
            Routine::Rows => "rows",
            Routine::LookLeft => "look_left",
            Routine::LookRight => "look_right",
            Routine::Ladders => "ladders",
            Routine::Vibrate => "vibrate",
        }
    }

    /// One-line description for `pumpkin list`.
    pub fn summary(self) -> &'static str {
        match self {
            Routine::Reset => "all eyes to the rest angle",
            Routine::RandomEyes => "each eye jumps to random angles until time runs out",
            Routine::MinMax => "all eyes swing between 0 and 180 until time runs out",
            Routine::Mirror => "left and right halves glide in opposite directions",
            Routine::HalfAndHalf => "left and right halves at opposite extremes, then swap",
            Routine::Columns => "column by column to 180, then back",
            Routine::Rows => "row by row to 180, then back",
            Routine::LookLeft => "all eyes glide left, hold, return to centre",
            Routine::LookRight => "all eyes glide right, hold, return to centre",
            Routine::Ladders => "eyes climb in turn, step by step, until time runs out",
            Routine::Vibrate => "all eyes shiver with a widening swing",
        }
    }

    /// Routines that loop until a configured duration has passed.
    pub fn is_time_bounded(self) -> bool {
        matches!(
            self,
            Routine::RandomEyes | Routine::MinMax | Routine::Ladders | Routine::Vibrate
        )
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Routine {
    type Err = MotionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = name.trim();
        Routine::ALL
            .into_iter()
            .find(|routine| routine.name() == wanted)
            .ok_or_else(|| MotionError::UnknownRoutine(name.to_string()))
    }
}
