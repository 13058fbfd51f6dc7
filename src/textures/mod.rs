//! Procedural sprite textures
//!
//! Everything is drawn with plain shapes into white-on-transparent RGBA
//! images so sprites can tint them with `Sprite::color`.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_polygon_mut};
use imageproc::point::Point;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub const DISC_SIZE: u32 = 64;
pub const RING_SIZE: u32 = 128;
pub const RING_THICKNESS: i32 = 4;
pub const STAR_SIZE: u32 = 16;

/// Handles to the generated textures
#[derive(Resource, Clone)]
pub struct GameTextures {
    pub disc: Handle<Image>,
    pub ring: Handle<Image>,
    pub star: Handle<Image>,
}

/// Filled circle touching the image edges
pub fn disc_image(size: u32) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    let c = size as i32 / 2;
    draw_filled_circle_mut(&mut img, (c, c), c - 1, WHITE);
    img
}

/// Circle outline `thickness` pixels wide
pub fn ring_image(size: u32, thickness: i32) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    let c = size as i32 / 2;
    for t in 0..thickness {
        draw_hollow_circle_mut(&mut img, (c, c), c - 1 - t, WHITE);
    }
    img
}

/// Four-pointed sparkle
pub fn star_image(size: u32) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    let c = size as f32 / 2.0;
    let outer = c - 0.5;
    let inner = c * 0.3;
    let points: Vec<Point<i32>> = (0..8)
        .map(|i| {
            let angle = std::f32::consts::FRAC_PI_4 * i as f32 - std::f32::consts::FRAC_PI_2;
            let r = if i % 2 == 0 { outer } else { inner };
            Point::new((c + r * angle.cos()).round() as i32, (c + r * angle.sin()).round() as i32)
        })
        .collect();
    draw_polygon_mut(&mut img, &points, WHITE);
    img
}

fn to_bevy_image(img: RgbaImage) -> Image {
    let (width, height) = img.dimensions();
    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        img.into_raw(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

/// Startup: draw the textures and publish their handles
pub fn generate_textures(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    let textures = GameTextures {
        disc: images.add(to_bevy_image(disc_image(DISC_SIZE))),
        ring: images.add(to_bevy_image(ring_image(RING_SIZE, RING_THICKNESS))),
        star: images.add(to_bevy_image(star_image(STAR_SIZE))),
    };
    debug!("Generated sprite textures");
    commands.insert_resource(textures);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha(img: &RgbaImage, x: u32, y: u32) -> u8 {
        img.get_pixel(x, y).0[3]
    }

    #[test]
    fn test_disc_is_solid_with_clear_corners() {
        let img = disc_image(DISC_SIZE);
        assert_eq!(alpha(&img, 32, 32), 255);
        assert_eq!(alpha(&img, 32, 2), 255);
        assert_eq!(alpha(&img, 0, 0), 0);
        assert_eq!(alpha(&img, 63, 63), 0);
    }

    #[test]
    fn test_ring_is_hollow() {
        let img = ring_image(RING_SIZE, RING_THICKNESS);
        assert_eq!(alpha(&img, 64, 64), 0);
        assert_eq!(alpha(&img, 64, 2), 255);
        assert_eq!(alpha(&img, 64, 30), 0);
    }

    #[test]
    fn test_star_has_points_not_corners() {
        let img = star_image(STAR_SIZE);
        assert_eq!(alpha(&img, 8, 8), 255);
        assert_eq!(alpha(&img, 8, 1), 255);
        assert_eq!(alpha(&img, 0, 0), 0);
        assert_eq!(alpha(&img, 15, 15), 0);
    }
}
