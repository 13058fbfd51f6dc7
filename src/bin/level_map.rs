//! Level Map Renderer
//!
//! Draws every level in the level file as a flat side-on map: ground spans,
//! brick platforms, food, enemies with their patrol ranges, power-ups and the
//! flag. One PNG per level, rendered in parallel.
//!
//! Run with: `cargo run --bin level_map [levels_file] [--scale 0.25]`

use std::fs;
use std::time::Instant;

use bevy::prelude::Color;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use rayon::prelude::*;

use brickrun::constants::*;
use brickrun::levels::{LevelData, LevelDatabase};

const OUTPUT_DIR: &str = "showcase";
const DEFAULT_SCALE: f32 = 0.25;
const PATROL_COLOR: Rgba<u8> = Rgba([255, 255, 255, 120]);

/// What one render produced, for the report
struct MapReport {
    path: String,
    width: u32,
    height: u32,
    gaps: usize,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut levels_file = LEVELS_FILE.to_string();
    let mut scale = DEFAULT_SCALE;

    let mut i = 1;
    while i < args.len() {
        if args[i] == "--scale" {
            i += 1;
            scale = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_SCALE);
        } else if !args[i].starts_with('-') {
            levels_file = args[i].clone();
        }
        i += 1;
    }
    let scale = scale.clamp(0.05, 2.0);

    let (levels, errors) = match fs::read_to_string(&levels_file) {
        Ok(content) => LevelDatabase::parse_with_errors(&content),
        Err(e) => {
            eprintln!("Failed to read {}: {}", levels_file, e);
            std::process::exit(1);
        }
    };
    for error in &errors {
        eprintln!("Warning: {}", error);
    }
    if levels.is_empty() {
        eprintln!("No levels in {}", levels_file);
        std::process::exit(1);
    }

    if let Err(e) = fs::create_dir_all(OUTPUT_DIR) {
        eprintln!("Failed to create {}: {}", OUTPUT_DIR, e);
        std::process::exit(1);
    }

    println!("Rendering {} levels from {} at {:.2}x", levels.len(), levels_file, scale);
    let start = Instant::now();

    let results: Vec<Result<MapReport, String>> = levels
        .par_iter()
        .enumerate()
        .map(|(index, level)| {
            let img = render_level(level, scale);
            let path = format!("{}/level_{:02}.png", OUTPUT_DIR, index + 1);
            img.save(&path).map_err(|e| format!("Failed to save {}: {}", path, e))?;
            Ok(MapReport { path, width: img.width(), height: img.height(), gaps: count_gaps(level) })
        })
        .collect();

    let mut failed = 0;
    for (level, result) in levels.iter().zip(&results) {
        match result {
            Ok(report) => println!(
                "  {:<12} {:>4} platforms {:>4} food {:>3} enemies {:>2} power-ups {:>3} gaps  flag x={:<6} -> {} ({}x{})",
                level.name,
                level.platforms.len(),
                level.food.len(),
                level.enemies.len(),
                level.powerups.len(),
                report.gaps,
                level.flag_x,
                report.path,
                report.width,
                report.height
            ),
            Err(e) => {
                failed += 1;
                eprintln!("  {:<12} {}", level.name, e);
            }
        }
    }

    println!("\nDone in {:.2}s", start.elapsed().as_secs_f32());
    if failed > 0 {
        std::process::exit(1);
    }
}

fn rgba(color: Color) -> Rgba<u8> {
    let c = color.to_srgba();
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([channel(c.red), channel(c.green), channel(c.blue), channel(c.alpha)])
}

/// Spaces between consecutive ground spans
fn count_gaps(level: &LevelData) -> usize {
    let mut spans = level.ground.clone();
    spans.sort_unstable();
    spans.windows(2).filter(|pair| pair[1].0 > pair[0].1 + 1).count()
}

/// Rightmost pixel anything in the level reaches
fn level_extent(level: &LevelData) -> f32 {
    let ground = level.ground.iter().map(|&(_, end)| (end + 1) as f32 * TILE);
    let platforms = level.platforms.iter().map(|p| (p.tile_x + p.width_tiles) as f32 * TILE);
    let patrols = level.enemies.iter().map(|e| e.patrol_right + ENEMY_SIZE.x);
    ground
        .chain(platforms)
        .chain(patrols)
        .fold(level.flag_x + FLAG_HITBOX.x, f32::max)
        .min(WORLD_WIDTH)
}

/// Axis-aligned box in level space (y down), scaled to the map
fn fill_box(img: &mut RgbaImage, scale: f32, left: f32, top: f32, width: f32, height: f32, color: Rgba<u8>) {
    let rect = Rect::at((left * scale) as i32, (top * scale) as i32)
        .of_size(((width * scale) as u32).max(1), ((height * scale) as u32).max(1));
    draw_filled_rect_mut(img, rect, color);
}

/// Render one level. Level data is authored in screen pixels with y down,
/// which is already image space.
fn render_level(level: &LevelData, scale: f32) -> RgbaImage {
    let width = ((level_extent(level) * scale).ceil() as u32).max(1);
    let height = ((SCREEN_HEIGHT * scale).ceil() as u32).max(1);
    let mut img = RgbaImage::from_pixel(width, height, rgba(SKY_COLOR));

    for &(start, end) in &level.ground {
        let left = start as f32 * TILE;
        let span = (end - start + 1) as f32 * TILE;
        fill_box(&mut img, scale, left, GROUND_Y, span, TILE, rgba(GROUND_COLOR));
        fill_box(&mut img, scale, left, GROUND_Y, span, GRASS_HEIGHT, rgba(GRASS_COLOR));
    }

    for platform in &level.platforms {
        let left = platform.tile_x as f32 * TILE;
        let span = platform.width_tiles as f32 * TILE;
        fill_box(&mut img, scale, left, platform.y, span, TILE, rgba(BRICK_COLOR));
    }

    for food in &level.food {
        let center = ((food.x * scale) as i32, (food.y * scale) as i32);
        let radius = ((FOOD_SIZE.x / 2.0 * scale) as i32).max(1);
        draw_filled_circle_mut(&mut img, center, radius, rgba(food.kind.color()));
    }

    for enemy in &level.enemies {
        let patrol_y = (GROUND_Y - ENEMY_SIZE.y - 6.0) * scale;
        draw_line_segment_mut(
            &mut img,
            (enemy.patrol_left * scale, patrol_y),
            (enemy.patrol_right * scale, patrol_y),
            PATROL_COLOR,
        );
        fill_box(
            &mut img,
            scale,
            enemy.x - ENEMY_SIZE.x / 2.0,
            GROUND_Y - ENEMY_SIZE.y,
            ENEMY_SIZE.x,
            ENEMY_SIZE.y,
            rgba(enemy.kind.color()),
        );
    }

    for powerup in &level.powerups {
        let half = POWERUP_HITBOX / 2.0;
        fill_box(
            &mut img,
            scale,
            powerup.x - half.x,
            powerup.y - half.y,
            POWERUP_HITBOX.x,
            POWERUP_HITBOX.y,
            rgba(powerup.kind.color()),
        );
        let outline = Rect::at(((powerup.x - half.x) * scale) as i32, ((powerup.y - half.y) * scale) as i32)
            .of_size(((POWERUP_HITBOX.x * scale) as u32).max(1), ((POWERUP_HITBOX.y * scale) as u32).max(1));
        draw_hollow_rect_mut(&mut img, outline, rgba(TEXT_PRIMARY));
    }

    let pole_top = GROUND_Y - FLAG_HITBOX.y;
    fill_box(&mut img, scale, level.flag_x - 3.0, pole_top, 6.0, FLAG_HITBOX.y, rgba(FLAG_POLE_COLOR));
    fill_box(&mut img, scale, level.flag_x + 3.0, pole_top + 4.0, 36.0, 24.0, rgba(FLAG_CLOTH_COLOR));

    let spawn_y = SCREEN_HEIGHT - PLAYER_SPAWN.y;
    fill_box(
        &mut img,
        scale,
        PLAYER_SPAWN.x - PLAYER_SIZE.x / 2.0,
        spawn_y - PLAYER_SIZE.y / 2.0,
        PLAYER_SIZE.x,
        PLAYER_SIZE.y,
        rgba(PLAYER_COLOR),
    );

    img
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(content: &str) -> LevelData {
        let (mut levels, errors) = LevelDatabase::parse_with_errors(content);
        assert!(errors.is_empty(), "{:?}", errors);
        levels.remove(0)
    }

    #[test]
    fn test_gap_count_ignores_adjacent_spans() {
        let data = level("level: A\nflag: 500\nground: 10 20\nground: 0 9\nground: 25 30\n");
        assert_eq!(count_gaps(&data), 1);
    }

    #[test]
    fn test_render_draws_ground_and_flag() {
        let data = level("level: A\nflag: 600\nground: 0 30\n");
        let img = render_level(&data, 0.5);
        assert_eq!(img.height(), 250);
        assert!(img.width() >= 312);
        // Ground body below the grass strip
        assert_eq!(*img.get_pixel(10, 245), rgba(GROUND_COLOR));
        assert_eq!(*img.get_pixel(10, 5), rgba(SKY_COLOR));
        // Flag pole
        assert_eq!(*img.get_pixel(300, 200), rgba(FLAG_POLE_COLOR));
    }
}
