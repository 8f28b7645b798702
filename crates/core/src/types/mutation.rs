//! Cart mutation variants.

use serde::{Deserialize, Serialize};

/// How a cart line's quantity should change.
///
/// Replaces the loose "mode" string of the wire protocol with an exhaustive
/// variant so every call site handles all three arithmetic forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartMutation {
    /// Replace the quantity outright.
    Set(u32),
    /// Add to the current quantity.
    Increase(u32),
    /// Subtract from the current quantity, flooring at zero.
    Decrease(u32),
}

impl CartMutation {
    /// Apply this mutation to a current quantity.
    #[must_use]
    pub const fn apply(self, current: u32) -> u32 {
        match self {
            Self::Set(n) => n,
            Self::Increase(n) => current.saturating_add(n),
            Self::Decrease(n) => current.saturating_sub(n),
        }
    }

    /// The quantity a brand-new line should start with.
    ///
    /// A decrease against a line that does not exist yet yields zero.
    #[must_use]
    pub const fn initial_quantity(self) -> u32 {
        self.apply(0)
    }

    /// The quantity value sent over the wire.
    #[must_use]
    pub const fn amount(self) -> u32 {
        match self {
            Self::Set(n) | Self::Increase(n) | Self::Decrease(n) => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces() {
        assert_eq!(CartMutation::Set(5).apply(2), 5);
        assert_eq!(CartMutation::Set(0).apply(2), 0);
    }

    #[test]
    fn test_increase_adds() {
        assert_eq!(CartMutation::Increase(3).apply(2), 5);
        assert_eq!(CartMutation::Increase(1).apply(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_decrease_floors_at_zero() {
        assert_eq!(CartMutation::Decrease(5).apply(2), 0);
        assert_eq!(CartMutation::Decrease(1).apply(2), 1);
    }

    #[test]
    fn test_initial_quantity() {
        assert_eq!(CartMutation::Set(2).initial_quantity(), 2);
        assert_eq!(CartMutation::Increase(4).initial_quantity(), 4);
        assert_eq!(CartMutation::Decrease(4).initial_quantity(), 0);
    }
}
