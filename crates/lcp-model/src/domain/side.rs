use serde::{Deserialize, Serialize};

/// One edge of a rectangular tile.
///
/// The discriminants follow the solver's side order (left, top, right, bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
}

impl Side {
    /// All sides in solver order.
    pub const ALL: [Side; 4] = [Side::Left, Side::Top, Side::Right, Side::Bottom];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
        }
    }

    /// Label used in outbound vector artifact names (`<task>-toLeft.npy`).
    pub const fn outbound_label(self) -> &'static str {
        match self {
            Side::Left => "toLeft",
            Side::Top => "toTop",
            Side::Right => "toRight",
            Side::Bottom => "toBottom",
        }
    }

    /// Solver flag that carries an inbound vector entering through this side.
    pub const fn inbound_flag(self) -> &'static str {
        match self {
            Side::Left => "-sl",
            Side::Top => "-st",
            Side::Right => "-sr",
            Side::Bottom => "-sb",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for side in Side::ALL {
            assert_ne!(side, side.opposite());
            assert_eq!(side, side.opposite().opposite());
        }
    }

    #[test]
    fn index_follows_solver_order() {
        for (i, side) in Side::ALL.iter().enumerate() {
            assert_eq!(side.index(), i);
        }
    }

    #[test]
    fn labels() {
        assert_eq!(Side::Bottom.outbound_label(), "toBottom");
        assert_eq!(Side::Right.inbound_flag(), "-sr");
        assert_eq!(Side::Top.inbound_flag(), "-st");
    }
}
