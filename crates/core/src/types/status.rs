//! Cart lifecycle state.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Where a cart is in its lifecycle.
///
/// ```text
/// Active -> Migrated   (moved into order history)
/// Active -> Deleted    (removed, no history kept)
/// ```
///
/// Both terminal states are final. A cart record exists exactly while it is
/// `Active`; when it is removed the store keeps only the terminal state it
/// reached, so a later caller can tell "already processed" from "never
/// existed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    #[default]
    Active,
    Migrated,
    Deleted,
}

impl CartState {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Migrated | Self::Deleted)
    }

    /// Whether `self -> next` is a legal lifecycle transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Migrated | Self::Deleted)
        )
    }

    /// Lowercase label used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Migrated => "migrated",
            Self::Deleted => "deleted",
        }
    }
}

/// Error returned when parsing an unknown [`CartState`] label.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown cart state: {0}")]
pub struct UnknownCartState(pub String);

impl core::str::FromStr for CartState {
    type Err = UnknownCartState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "migrated" => Ok(Self::Migrated),
            "deleted" => Ok(Self::Deleted),
            other => Err(UnknownCartState(other.to_owned())),
        }
    }
}

impl fmt::Display for CartState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CartState; 3] = [CartState::Active, CartState::Migrated, CartState::Deleted];

    #[test]
    fn test_active_is_only_non_terminal_state() {
        assert!(!CartState::Active.is_terminal());
        assert!(CartState::Migrated.is_terminal());
        assert!(CartState::Deleted.is_terminal());
    }

    #[test]
    fn test_valid_transitions() {
        assert!(CartState::Active.can_transition_to(CartState::Migrated));
        assert!(CartState::Active.can_transition_to(CartState::Deleted));
    }

    #[test]
    fn test_terminal_states_never_transition() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be rejected");
            }
        }
    }

    #[test]
    fn test_label_round_trip() {
        for state in ALL {
            assert_eq!(state.as_str().parse::<CartState>(), Ok(state));
        }
        assert!("expired".parse::<CartState>().is_err());
    }

    #[test]
    fn test_no_self_transition() {
        for state in ALL {
            assert!(!state.can_transition_to(state));
        }
    }
}
