use serde::{Deserialize, Serialize};

/// Discrete paddle action.
///
/// The policy outputs the probability of [`Action::Up`]; [`Action::Down`] is its complement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum Action {
    Up,
    Down,
}

impl Action {
    /// Vertical paddle direction in frame rows (rows grow downwards).
    #[must_use]
    pub const fn direction(self) -> f64 {
        match self {
            Action::Up => -1.0,
            Action::Down => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_moves_towards_row_zero() {
        assert!(Action::Up.direction() < 0.0);
        assert!(Action::Down.direction() > 0.0);
        assert!(Action::Up.is_up());
        assert!(Action::Down.is_down());
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&Action::Up).unwrap(), "\"Up\"");
        assert_eq!(
            serde_json::from_str::<Action>("\"Down\"").unwrap(),
            Action::Down
        );
    }
}
