//! Levels module - database, spawning, and the selected level

mod database;
mod spawning;

pub use database::*;
pub use spawning::*;

use bevy::prelude::*;

/// Current level number (1-indexed, as shown to the player and on the CLI)
#[derive(Resource, Debug, Clone, Copy)]
pub struct CurrentLevel(pub u32);

impl Default for CurrentLevel {
    fn default() -> Self {
        Self(1)
    }
}

impl CurrentLevel {
    /// Zero-based index, clamped into a database of `len` levels
    pub fn index(&self, len: usize) -> usize {
        (self.0.max(1) as usize - 1).min(len.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_index_clamps() {
        assert_eq!(CurrentLevel(1).index(3), 0);
        assert_eq!(CurrentLevel(3).index(3), 2);
        assert_eq!(CurrentLevel(9).index(3), 2);
        assert_eq!(CurrentLevel(0).index(3), 0);
        assert_eq!(CurrentLevel(2).index(0), 0);
    }
}
