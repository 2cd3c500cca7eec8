//! Game parameters shared by the library and the CLI.

use crate::grid::{InitialBoard, MAX_VARIANTS};
use thiserror::Error;

pub const DEFAULT_SIZE: usize = 10;
pub const DEFAULT_VARIANTS: u8 = 5;
pub const MIN_SIZE: usize = 3;
pub const MAX_SIZE: usize = 16;
/// Fewer kinds cannot always avoid runs, and refills would line up forever.
pub const MIN_VARIANTS: u8 = 3;

/// Options that shape a game: board size, candy variants, starting board, RNG seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub size: usize,
    pub variants: u8,
    pub initial_board: InitialBoard,
    /// Fixed seed for reproducible boards; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            variants: DEFAULT_VARIANTS,
            initial_board: InitialBoard::Clean,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board size {0} is outside {min}..={max}", min = MIN_SIZE, max = MAX_SIZE)]
    Size(usize),
    #[error("variant count {0} is outside {min}..={max}", min = MIN_VARIANTS, max = MAX_VARIANTS)]
    Variants(u8),
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&self.size) {
            return Err(ConfigError::Size(self.size));
        }
        if !(MIN_VARIANTS..=MAX_VARIANTS).contains(&self.variants) {
            return Err(ConfigError::Variants(self.variants));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let small = GameConfig {
            size: 2,
            ..GameConfig::default()
        };
        assert_eq!(small.validate(), Err(ConfigError::Size(2)));
        let colours = GameConfig {
            variants: 7,
            ..GameConfig::default()
        };
        assert_eq!(colours.validate(), Err(ConfigError::Variants(7)));
    }

    #[test]
    fn test_rejects_too_few_variants() {
        for variants in [0, 1, 2] {
            let config = GameConfig {
                variants,
                ..GameConfig::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::Variants(variants)));
        }
        let three = GameConfig {
            variants: MIN_VARIANTS,
            ..GameConfig::default()
        };
        assert_eq!(three.validate(), Ok(()));
    }
}
