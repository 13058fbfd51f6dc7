//! Level database - parsing and storage

use bevy::prelude::*;
use std::fs;

use crate::collectibles::FoodKind;
use crate::constants::{TILE, WORLD_WIDTH};
use crate::enemies::EnemyKind;
use crate::powerups::PowerKind;

/// Brick platform row: `width_tiles` tiles starting at `tile_x`, top edge at level-space `y`
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformDef {
    pub tile_x: u32,
    pub y: f32,
    pub width_tiles: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FoodDef {
    pub x: f32,
    pub y: f32,
    pub kind: FoodKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemyDef {
    pub x: f32,
    pub patrol_left: f32,
    pub patrol_right: f32,
    pub kind: EnemyKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PowerUpDef {
    pub x: f32,
    pub y: f32,
    pub kind: PowerKind,
}

/// Single level definition. Positions are in level space (y down).
#[derive(Clone, Debug, PartialEq)]
pub struct LevelData {
    pub name: String,
    /// Inclusive tile ranges of solid ground
    pub ground: Vec<(u32, u32)>,
    pub platforms: Vec<PlatformDef>,
    pub food: Vec<FoodDef>,
    pub enemies: Vec<EnemyDef>,
    pub powerups: Vec<PowerUpDef>,
    pub flag_x: f32,
}

impl LevelData {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ground: Vec::new(),
            platforms: Vec::new(),
            food: Vec::new(),
            enemies: Vec::new(),
            powerups: Vec::new(),
            flag_x: 0.0,
        }
    }
}

/// Database of all loaded levels
#[derive(Resource, Default)]
pub struct LevelDatabase {
    pub levels: Vec<LevelData>,
}

/// Parse whitespace-separated numbers, requiring exactly `N` of them
fn parse_numbers<const N: usize>(params: &str) -> Option<[f32; N]> {
    let parts: Vec<&str> = params.split_whitespace().collect();
    if parts.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse::<f32>().ok()?;
    }
    Some(out)
}

/// Split `params` into N numbers followed by a trailing kind name
fn parse_numbers_and_kind<const N: usize>(params: &str) -> Option<([f32; N], &str)> {
    let params = params.trim();
    let (numbers, kind) = params.rsplit_once(char::is_whitespace)?;
    Some((parse_numbers::<N>(numbers)?, kind.trim()))
}

/// Tiles across the whole world; no span may reach past it
const MAX_TILE: u32 = (WORLD_WIDTH / TILE) as u32;

fn parse_tile(value: f32) -> Option<u32> {
    (value >= 0.0 && value.fract() == 0.0 && value <= MAX_TILE as f32).then_some(value as u32)
}

/// Parse one level line into `level`. Returns an error message for malformed lines.
fn parse_line(level: &mut LevelData, line: &str) -> Result<(), String> {
    if let Some(params) = line.strip_prefix("flag:") {
        let [x] = parse_numbers::<1>(params).ok_or("flag expects <x>")?;
        level.flag_x = x;
    } else if let Some(params) = line.strip_prefix("ground:") {
        let [start, end] = parse_numbers::<2>(params).ok_or("ground expects <start_tile> <end_tile>")?;
        let (Some(start), Some(end)) = (parse_tile(start), parse_tile(end)) else {
            return Err(format!("ground tiles must be integers in 0..={}", MAX_TILE));
        };
        if end < start {
            return Err(format!("ground span {}..{} is reversed", start, end));
        }
        level.ground.push((start, end));
    } else if let Some(params) = line.strip_prefix("platform:") {
        let [tile_x, y, width] =
            parse_numbers::<3>(params).ok_or("platform expects <tile_x> <pixel_y> <width_tiles>")?;
        let (Some(tile_x), Some(width_tiles)) = (parse_tile(tile_x), parse_tile(width)) else {
            return Err(format!("platform tile values must be integers in 0..={}", MAX_TILE));
        };
        if width_tiles == 0 {
            return Err("platform width must be at least one tile".to_string());
        }
        if tile_x + width_tiles > MAX_TILE {
            return Err(format!("platform runs past the world edge at tile {}", MAX_TILE));
        }
        level.platforms.push(PlatformDef { tile_x, y, width_tiles });
    } else if let Some(params) = line.strip_prefix("food:") {
        let ([x, y], kind) = parse_numbers_and_kind::<2>(params).ok_or("food expects <x> <y> <kind>")?;
        let kind = FoodKind::from_name(kind).ok_or_else(|| format!("unknown food kind '{}'", kind))?;
        level.food.push(FoodDef { x, y, kind });
    } else if let Some(params) = line.strip_prefix("enemy:") {
        let ([x, patrol_left, patrol_right], kind) = parse_numbers_and_kind::<3>(params)
            .ok_or("enemy expects <x> <patrol_left> <patrol_right> <kind>")?;
        let kind = EnemyKind::from_name(kind).ok_or_else(|| format!("unknown enemy kind '{}'", kind))?;
        if patrol_right < patrol_left {
            return Err("enemy patrol range is reversed".to_string());
        }
        level.enemies.push(EnemyDef { x, patrol_left, patrol_right, kind });
    } else if let Some(params) = line.strip_prefix("powerup:") {
        let ([x, y], kind) = parse_numbers_and_kind::<2>(params).ok_or("powerup expects <x> <y> <kind>")?;
        let kind = PowerKind::from_name(kind).ok_or_else(|| format!("unknown power-up kind '{}'", kind))?;
        level.powerups.push(PowerUpDef { x, y, kind });
    } else {
        return Err("unknown directive".to_string());
    }
    Ok(())
}

impl LevelDatabase {
    /// Load levels from file, returns default hardcoded levels on error
    pub fn load_from_file(path: &str) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                warn!("Failed to load levels from {}: {}, using defaults", path, e);
                Self::default_levels()
            }
        }
    }

    /// Parse level data from string, logging skipped lines
    pub fn parse(content: &str) -> Self {
        let (levels, errors) = Self::parse_with_errors(content);
        for error in &errors {
            warn!("levels: {}", error);
        }

        if levels.is_empty() {
            warn!("No levels parsed, using defaults");
            return Self::default_levels();
        }

        info!("Loaded {} levels from file", levels.len());
        Self { levels }
    }

    /// Parse level data, returning the levels and a message per skipped line
    pub fn parse_with_errors(content: &str) -> (Vec<LevelData>, Vec<String>) {
        let mut levels = Vec::new();
        let mut errors = Vec::new();
        let mut current_level: Option<LevelData> = None;

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            if let Some(name) = line.strip_prefix("level:") {
                if let Some(level) = current_level.take() {
                    levels.push(level);
                }
                current_level = Some(LevelData::new(name.trim()));
                continue;
            }

            let Some(level) = &mut current_level else {
                errors.push(format!("line {}: '{}' appears before any level:", line_no, line));
                continue;
            };

            if let Err(e) = parse_line(level, line) {
                errors.push(format!("line {}: {} ('{}')", line_no, e, line));
            }
        }

        if let Some(level) = current_level {
            levels.push(level);
        }

        // A level without ground or flag can't be played
        levels.retain(|level| {
            let playable = !level.ground.is_empty() && level.flag_x > 0.0;
            if !playable {
                errors.push(format!("level '{}' has no ground or flag, skipped", level.name));
            }
            playable
        });

        (levels, errors)
    }

    /// Hardcoded fallback level
    pub fn default_levels() -> Self {
        Self {
            levels: vec![LevelData {
                name: "Backyard".to_string(),
                ground: vec![(0, 24), (28, 60)],
                platforms: vec![
                    PlatformDef { tile_x: 10, y: 368.0, width_tiles: 4 },
                    PlatformDef { tile_x: 24, y: 400.0, width_tiles: 3 },
                    PlatformDef { tile_x: 34, y: 336.0, width_tiles: 3 },
                ],
                food: vec![
                    FoodDef { x: 200.0, y: 436.0, kind: FoodKind::Soda },
                    FoodDef { x: 368.0, y: 336.0, kind: FoodKind::Burger },
                    FoodDef { x: 1136.0, y: 304.0, kind: FoodKind::Soda },
                ],
                enemies: vec![EnemyDef {
                    x: 1400.0,
                    patrol_left: 1300.0,
                    patrol_right: 1600.0,
                    kind: EnemyKind::Walker,
                }],
                powerups: vec![PowerUpDef { x: 600.0, y: 336.0, kind: PowerKind::Cap }],
                flag_x: 1850.0,
            }],
        }
    }

    /// Get level by index
    pub fn get(&self, index: usize) -> Option<&LevelData> {
        self.levels.get(index)
    }

    /// Find a level by exact name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.levels.iter().position(|l| l.name == name)
    }

    /// Get number of levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check if database is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# comment line
level: Sample
flag: 900
ground: 0 20   # trailing comment
ground: 23 40
platform: 5 368 3
food: 160 436 burger
food: 192 436 soda
enemy: 520 440 720 walker
powerup: 800 336 cap
"#;

    #[test]
    fn test_parse_sample() {
        let (levels, errors) = LevelDatabase::parse_with_errors(SAMPLE);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(levels.len(), 1);
        let level = &levels[0];
        assert_eq!(level.name, "Sample");
        assert_eq!(level.flag_x, 900.0);
        assert_eq!(level.ground, vec![(0, 20), (23, 40)]);
        assert_eq!(level.platforms[0], PlatformDef { tile_x: 5, y: 368.0, width_tiles: 3 });
        assert_eq!(level.food[0].kind, FoodKind::Burger);
        assert_eq!(level.food[1].kind, FoodKind::Soda);
        assert_eq!(level.enemies[0].kind, EnemyKind::Walker);
        assert_eq!(level.enemies[0].patrol_right, 720.0);
        assert_eq!(level.powerups[0].kind, PowerKind::Cap);
    }

    #[test]
    fn test_bad_lines_are_skipped_with_line_numbers() {
        let content = "level: A\nflag: 100\nground: 0 5\nfood: 1 2 pizza\nplatform: 3 368\nwat: 1\n";
        let (levels, errors) = LevelDatabase::parse_with_errors(content);
        assert_eq!(levels.len(), 1);
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("line 4:"));
        assert!(errors[1].starts_with("line 5:"));
        assert!(errors[2].starts_with("line 6:"));
    }

    #[test]
    fn test_unplayable_level_dropped() {
        let content = "level: NoFlag\nground: 0 5\nlevel: Ok\nflag: 50\nground: 0 5\n";
        let (levels, errors) = LevelDatabase::parse_with_errors(content);
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].name, "Ok");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_empty_falls_back_to_defaults() {
        let db = LevelDatabase::parse("# nothing here\n");
        assert_eq!(db.len(), LevelDatabase::default_levels().len());
        assert!(!db.is_empty());
    }

    #[test]
    fn test_oversized_tiles_rejected() {
        let content = format!(
            "level: A\nflag: 100\nground: 0 5000000000\nground: 0 {}\nplatform: 5000000000 300 2\nplatform: {} 300 2\nground: 0 5\n",
            MAX_TILE + 1,
            MAX_TILE - 1,
        );
        let (levels, errors) = LevelDatabase::parse_with_errors(&content);
        assert_eq!(levels[0].ground, vec![(0, 5)]);
        assert!(levels[0].platforms.is_empty());
        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("line 3:"));
        assert!(errors[3].starts_with("line 6:"));
    }

    #[test]
    fn test_reversed_ranges_rejected() {
        let content = "level: A\nflag: 100\nground: 9 2\nground: 0 5\nenemy: 10 50 20 dasher\n";
        let (levels, errors) = LevelDatabase::parse_with_errors(content);
        assert_eq!(levels[0].ground, vec![(0, 5)]);
        assert!(levels[0].enemies.is_empty());
        assert_eq!(errors.len(), 2);
    }
}
