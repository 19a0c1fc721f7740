//! Converts simulation state into renderer-agnostic draw commands.
//!
//! Nothing here touches simulation state mutably. Randomised decoration (the
//! static box scratches) draws from a throwaway generator seeded by the frame
//! counter, so exporting the same frame twice yields the same commands.

use core::f32::consts::TAU;

use serde::Serialize;

use crate::constants::{
    ASTEROID_INSET_SCALE, DEBRIS_RED_LIFETIME, SCORE_GAIN_FADE_LIFETIME, STAR_HALF_EXTENT,
    STATIC_LINE_SEPARATION,
};
use crate::entities::{
    Asteroid, BackgroundStar, Debris, Particle, Photon, ScoreGain, Ship, DEBRIS_FACES,
};
use crate::geometry::{Bounds, Vec2};
use crate::rng::SeededRng;
use crate::transmission::{Rect, Transmission};

const SHIP_UNDERLAY_SCALE: f32 = 0.9;
const PARTICLE_TICK_LENGTH: f32 = 0.004;
const DIGIT_SPACING_RATIO: f32 = 0.5;
const STATIC_NOISE_SEED: u32 = 0x9E37_79B9;
const STATIC_BODY_HEIGHT: f32 = 0.45;
const STATIC_SCRATCH_DENSITY: f32 = 400.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const GREY: Self = Self::rgb(0.5, 0.5, 0.5);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Submesh material slots a filled polygon is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Material {
    White,
    Black,
    Blue,
}

impl Material {
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TextAnchor {
    LowerLeft,
    UpperLeft,
}

/// One seven-segment digit. The cell spans `origin + x_axis * width + y_axis * height`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DigitGlyph {
    pub value: u8,
    pub origin: Vec2,
    pub x_axis: Vec2,
    pub y_axis: Vec2,
    pub width: f32,
    pub height: f32,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DrawCommand {
    /// Connected strip through `vertices`.
    Polyline { vertices: Vec<Vec2>, color: Color },
    /// Independent segments; vertices are consumed in pairs.
    Lines { vertices: Vec<Vec2>, color: Color },
    FilledPolygon { vertices: Vec<Vec2>, material: Material },
    /// Vertices are consumed in triples.
    Triangles { vertices: Vec<Vec2>, color: Color },
    Digit(DigitGlyph),
    Text {
        text: String,
        origin: Vec2,
        char_size: f32,
        anchor: TextAnchor,
        color: Color,
    },
}

/// Borrowed view of everything drawable in one frame.
pub(crate) struct Scene<'a> {
    pub(crate) field: Bounds,
    pub(crate) text_size: f32,
    pub(crate) frame_count: u32,
    pub(crate) ship: &'a Ship,
    pub(crate) asteroids: &'a [Asteroid],
    pub(crate) photons: &'a [Photon],
    pub(crate) debris: &'a [Debris],
    pub(crate) free_score_gains: &'a [ScoreGain],
    pub(crate) dust: &'a [Particle],
    pub(crate) residue: &'a [Particle],
    pub(crate) stars: &'a [BackgroundStar],
    pub(crate) transmission: Option<&'a Transmission>,
}

pub(crate) fn export(scene: &Scene<'_>) -> Vec<DrawCommand> {
    let mut commands = Vec::new();

    star_commands(scene.stars, &mut commands);
    particle_commands(scene.dust, Color::WHITE, &mut commands);
    particle_commands(scene.residue, Color::BLUE, &mut commands);

    for asteroid in scene.asteroids.iter().filter(|entry| entry.active) {
        commands.push(DrawCommand::FilledPolygon {
            vertices: asteroid.outline(1.0),
            material: Material::White,
        });
        commands.push(DrawCommand::FilledPolygon {
            vertices: asteroid.outline(ASTEROID_INSET_SCALE),
            material: Material::Black,
        });
    }

    for photon in scene.photons.iter().filter(|entry| entry.active) {
        commands.push(DrawCommand::FilledPolygon {
            vertices: photon.outline.iter().map(|offset| photon.pos + *offset).collect(),
            material: Material::Blue,
        });
    }

    for debris in scene.debris.iter().filter(|entry| entry.active) {
        commands.push(debris_command(debris));
    }

    if scene.ship.is_visible() {
        commands.push(DrawCommand::FilledPolygon {
            vertices: scene.ship.hull(1.0).to_vec(),
            material: Material::White,
        });
        commands.push(DrawCommand::FilledPolygon {
            vertices: scene.ship.hull(SHIP_UNDERLAY_SCALE).to_vec(),
            material: Material::Black,
        });
    }

    score_commands(scene, &mut commands);

    if let Some(transmission) = scene.transmission {
        transmission_commands(transmission, scene.frame_count, &mut commands);
    }

    commands
}

fn star_commands(stars: &[BackgroundStar], commands: &mut Vec<DrawCommand>) {
    for star in stars {
        let alpha = star.flicker.sin().max(0.0);
        if alpha <= 0.0 {
            continue;
        }
        let color = Color::WHITE.with_alpha(alpha);
        let horizontal = Vec2::new(STAR_HALF_EXTENT, 0.0);
        let vertical = Vec2::new(0.0, STAR_HALF_EXTENT);
        commands.push(DrawCommand::Polyline {
            vertices: vec![star.pos - horizontal, star.pos + horizontal],
            color,
        });
        commands.push(DrawCommand::Polyline {
            vertices: vec![star.pos - vertical, star.pos + vertical],
            color,
        });
    }
}

fn particle_commands(particles: &[Particle], base: Color, commands: &mut Vec<DrawCommand>) {
    for particle in particles.iter().filter(|entry| entry.active) {
        let speed = particle.vel.length();
        let direction = if speed > 0.0 {
            particle.vel * (1.0 / speed)
        } else {
            Vec2::new(1.0, 0.0)
        };
        commands.push(DrawCommand::Polyline {
            vertices: vec![particle.pos - direction * PARTICLE_TICK_LENGTH, particle.pos],
            color: base.with_alpha(particle.remaining_fraction()),
        });
    }
}

pub(crate) fn debris_color(lifetime: f32) -> Color {
    if lifetime < DEBRIS_RED_LIFETIME {
        Color::rgb(1.0, (lifetime / DEBRIS_RED_LIFETIME).max(0.0), 0.0)
    } else if (lifetime.floor() as i64) % 3 == 0 {
        Color::rgb(1.0, 1.0, 0.0)
    } else {
        Color::WHITE
    }
}

fn debris_command(debris: &Debris) -> DrawCommand {
    let corners = debris.projected_corners();
    let vertices = DEBRIS_FACES
        .iter()
        .flat_map(|face| face.iter().map(|index| corners[*index]))
        .collect();
    DrawCommand::Triangles {
        vertices,
        color: debris_color(debris.lifetime),
    }
}

fn score_commands(scene: &Scene<'_>, commands: &mut Vec<DrawCommand>) {
    let width = scene.text_size * scene.field.width();
    let height = scene.text_size * 2.0 * scene.field.height();

    for debris in scene.debris.iter().filter(|entry| entry.active) {
        let fade = (debris.lifetime / SCORE_GAIN_FADE_LIFETIME).clamp(0.0, 1.0);
        let color = Color::rgb(1.0, fade, fade);
        // linked gains follow the debris and show what collecting it now would pay
        push_number(
            debris.score(),
            debris.score_gain.pos,
            width,
            height,
            color,
            commands,
        );
    }

    for gain in scene.free_score_gains.iter().filter(|entry| entry.active) {
        push_number(gain.score, gain.pos, width, height, Color::GREEN, commands);
    }
}

fn push_number(
    value: u32,
    center: Vec2,
    width: f32,
    height: f32,
    color: Color,
    commands: &mut Vec<DrawCommand>,
) {
    let glyphs = layout_number(
        value,
        center,
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 1.0),
        width,
        height,
        color,
    );
    commands.extend(glyphs.into_iter().map(DrawCommand::Digit));
}

/// Lays out the decimal digits of `value` centred on `center` along `x_axis`, raised one glyph
/// height so the number clears whatever it labels.
pub fn layout_number(
    value: u32,
    center: Vec2,
    x_axis: Vec2,
    y_axis: Vec2,
    width: f32,
    height: f32,
    color: Color,
) -> Vec<DigitGlyph> {
    let digits = decimal_digits(value);
    let spacing = width * DIGIT_SPACING_RATIO;
    let count = digits.len() as f32;
    let total = count * width + (count - 1.0) * spacing;
    let start = center - x_axis * (total / 2.0) + y_axis * height;

    digits
        .into_iter()
        .enumerate()
        .map(|(index, digit)| DigitGlyph {
            value: digit,
            origin: start + x_axis * (index as f32 * (width + spacing)),
            x_axis,
            y_axis,
            width,
            height,
            color,
        })
        .collect()
}

fn decimal_digits(mut value: u32) -> Vec<u8> {
    let mut digits = Vec::new();
    loop {
        digits.push((value % 10) as u8);
        value /= 10;
        if value == 0 {
            break;
        }
    }
    digits.reverse();
    digits
}

/// Lit segments in the order top, top-left, top-right, middle, bottom-left, bottom-right, bottom.
pub fn segments_for_digit(digit: u8) -> [bool; 7] {
    match digit {
        0 => [true, true, true, false, true, true, true],
        1 => [false, false, true, false, false, true, false],
        2 => [true, false, true, true, true, false, true],
        3 => [true, false, true, true, false, true, true],
        4 => [false, true, true, true, false, true, false],
        5 => [true, true, false, true, false, true, true],
        6 => [true, true, false, true, true, true, true],
        7 => [true, false, true, false, false, true, false],
        8 => [true; 7],
        9 => [true, true, true, true, false, true, true],
        _ => [false; 7],
    }
}

/// Expands a glyph into its lit line segments.
pub fn digit_segments(glyph: &DigitGlyph) -> Vec<[Vec2; 2]> {
    let across = glyph.x_axis * glyph.width;
    let up = glyph.y_axis * glyph.height;
    let bottom_left = glyph.origin;
    let bottom_right = bottom_left + across;
    let middle_left = bottom_left + up * 0.5;
    let middle_right = middle_left + across;
    let top_left = bottom_left + up;
    let top_right = top_left + across;

    let strokes = [
        [top_left, top_right],
        [middle_left, top_left],
        [middle_right, top_right],
        [middle_left, middle_right],
        [bottom_left, middle_left],
        [bottom_right, middle_right],
        [bottom_left, bottom_right],
    ];

    segments_for_digit(glyph.value)
        .iter()
        .zip(strokes)
        .filter(|(lit, _)| **lit)
        .map(|(_, stroke)| stroke)
        .collect()
}

fn transmission_commands(
    transmission: &Transmission,
    frame_count: u32,
    commands: &mut Vec<DrawCommand>,
) {
    let frame = transmission.frame();
    let layout = transmission.layout();

    if let Some(rect) = frame.trans_box {
        push_box(rect, commands);
    }

    commands.push(DrawCommand::Text {
        text: transmission.label().to_string(),
        origin: frame.label_position,
        char_size: layout.label_char_size,
        anchor: TextAnchor::LowerLeft,
        color: Color::GREY,
    });

    if let Some(rect) = frame.static_box {
        push_box(rect, commands);
        static_noise(rect, transmission.static_pool(), frame_count, commands);
    }

    if frame.static_label_chars > 0 {
        commands.push(DrawCommand::Text {
            text: transmission
                .static_label()
                .chars()
                .take(frame.static_label_chars)
                .collect(),
            origin: layout.static_label_origin,
            char_size: layout.label_char_size,
            anchor: TextAnchor::LowerLeft,
            color: Color::WHITE,
        });
    }

    if frame.message_chars > 0 {
        commands.push(DrawCommand::Text {
            text: transmission
                .message()
                .chars()
                .take(frame.message_chars)
                .collect(),
            origin: layout.message_origin,
            char_size: layout.message.char_size,
            anchor: TextAnchor::UpperLeft,
            color: Color::WHITE,
        });
    }
}

fn push_box(rect: Rect, commands: &mut Vec<DrawCommand>) {
    let corners = rect.corners();
    commands.push(DrawCommand::FilledPolygon {
        vertices: corners.to_vec(),
        material: Material::Black,
    });
    let mut border = corners.to_vec();
    border.push(corners[0]);
    commands.push(DrawCommand::Polyline {
        vertices: border,
        color: Color::WHITE,
    });
}

/// Scratches and scanlines inside the static box.
fn static_noise(rect: Rect, pool: &[bool], frame_count: u32, commands: &mut Vec<DrawCommand>) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }

    let mut rng = SeededRng::new(frame_count ^ STATIC_NOISE_SEED);
    let start = Vec2::new(rect.left, rect.bottom);
    let across = Vec2::new(rect.width, 0.0);
    let up = Vec2::new(0.0, rect.height);

    let mut scratches = Vec::new();
    let body_count = ((rect.width + rect.height) * STATIC_SCRATCH_DENSITY) as usize;
    for _ in 0..body_count {
        for _ in 0..2 {
            scratches.push(
                start + up * rng.range(0.0, STATIC_BODY_HEIGHT) + across * rng.unit(),
            );
        }
    }

    let head_center = start + up * (1.0 / 1.5) + across * 0.5;
    let head_count = body_count / 2;
    for _ in 0..head_count {
        for _ in 0..2 {
            let offset = rng.point_in_circle();
            scratches.push(head_center + across * (offset.x / 4.0) + up * (offset.y / 3.0));
        }
    }

    let neck_center = start + up * (1.0 / 1.75) + across * 0.5;
    for _ in 0..head_count / 2 {
        scratches.push(
            start + up * rng.range(0.0, STATIC_BODY_HEIGHT) + across * rng.range(0.25, 0.75),
        );
        let offset = rng.point_in_circle();
        scratches.push(neck_center + across * (offset.x / 8.0) + up * (offset.y / 4.0));
    }

    commands.push(DrawCommand::Lines {
        vertices: scratches,
        color: Color::WHITE,
    });

    if pool.is_empty() {
        return;
    }

    let mut scanlines = Vec::new();
    let vertical_count = (rect.width / STATIC_LINE_SEPARATION) as usize;
    let mut cursor = rng.next() as usize % pool.len();
    for index in 0..vertical_count {
        if pool[cursor] {
            let base = start + across * (index as f32 / vertical_count as f32);
            scanlines.push(base);
            scanlines.push(base + up);
        }
        cursor = (cursor + 1) % pool.len();
    }

    let horizontal_count = vertical_count * 2;
    cursor = rng.next() as usize % pool.len();
    for index in 0..horizontal_count {
        if pool[cursor] {
            let base = start + up * (index as f32 / horizontal_count as f32);
            scanlines.push(base);
            scanlines.push(base + across);
        }
        cursor = (cursor + 1) % pool.len();
    }

    commands.push(DrawCommand::Lines {
        vertices: scanlines,
        color: Color::GREEN,
    });
}

/// Irregular photon outline around the origin: `ceil(size * edges_per_unit)` corners with a
/// jittered radius.
pub(crate) fn photon_outline(
    size: f32,
    edges_per_unit: f32,
    jitter: f32,
    rng: &mut SeededRng,
) -> Vec<Vec2> {
    let edges = ((size * edges_per_unit).ceil() as usize).max(3);
    (0..edges)
        .map(|index| {
            let angle = TAU * index as f32 / edges as f32;
            let radius = size * rng.range(1.0 - jitter, 1.0 + jitter);
            Vec2::from_heading(angle) * radius
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(value: u8) -> DigitGlyph {
        DigitGlyph {
            value,
            origin: Vec2::ZERO,
            x_axis: Vec2::new(1.0, 0.0),
            y_axis: Vec2::new(0.0, 1.0),
            width: 1.0,
            height: 2.0,
            color: Color::WHITE,
        }
    }

    #[test]
    fn digit_segment_counts_match_seven_segment_table() {
        let expected = [6, 2, 5, 5, 4, 5, 6, 3, 7, 6];
        for (digit, count) in expected.iter().enumerate() {
            assert_eq!(
                digit_segments(&glyph(digit as u8)).len(),
                *count,
                "digit {digit}"
            );
        }
    }

    #[test]
    fn one_lights_only_the_right_column() {
        for [a, b] in digit_segments(&glyph(1)) {
            assert_eq!(a.x, 1.0);
            assert_eq!(b.x, 1.0);
        }
    }

    #[test]
    fn numbers_are_centred_above_their_anchor() {
        let glyphs = layout_number(
            15,
            Vec2::new(0.5, 0.5),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            0.1,
            0.2,
            Color::GREEN,
        );
        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[0].value, 1);
        assert_eq!(glyphs[1].value, 5);

        let left = glyphs[0].origin.x;
        let right = glyphs[1].origin.x + glyphs[1].width;
        assert!(((left + right) / 2.0 - 0.5).abs() < 1e-6);
        assert!((glyphs[0].origin.y - 0.7).abs() < 1e-6);
        assert!((glyphs[1].origin.x - glyphs[0].origin.x - 0.15).abs() < 1e-6);
    }

    #[test]
    fn zero_renders_a_single_digit() {
        assert_eq!(decimal_digits(0), vec![0]);
        assert_eq!(decimal_digits(1_204), vec![1, 2, 0, 4]);
    }

    #[test]
    fn debris_turns_red_when_expiring() {
        let late = debris_color(10.0);
        assert_eq!((late.r, late.b), (1.0, 0.0));
        assert!((late.g - 0.4).abs() < 1e-6);
        assert_eq!(debris_color(99.0), Color::rgb(1.0, 1.0, 0.0));
        assert_eq!(debris_color(100.0), Color::WHITE);
    }

    #[test]
    fn static_noise_is_stable_for_a_frame() {
        let rect = Rect {
            left: 0.0,
            bottom: 0.0,
            width: 0.2,
            height: 0.25,
        };
        let pool: Vec<bool> = (0..1_250).map(|index| index % 3 == 0).collect();

        let mut first = Vec::new();
        static_noise(rect, &pool, 42, &mut first);
        let mut second = Vec::new();
        static_noise(rect, &pool, 42, &mut second);
        assert_eq!(first, second);

        for command in &first {
            let DrawCommand::Lines { vertices, .. } = command else {
                panic!("static noise must be line batches");
            };
            assert_eq!(vertices.len() % 2, 0);
            for vertex in vertices {
                assert!(vertex.x >= -1e-5 && vertex.x <= 0.2 + 1e-5, "{vertex:?}");
                assert!(vertex.y >= -1e-5 && vertex.y <= 0.25 + 1e-5, "{vertex:?}");
            }
        }
    }

    #[test]
    fn photon_outline_has_size_driven_corner_count() {
        let mut rng = SeededRng::new(5);
        let outline = photon_outline(0.021, 500.0, 0.1, &mut rng);
        assert_eq!(outline.len(), 11);
        for corner in outline {
            let radius = corner.length();
            assert!((0.0189 - 1e-5..=0.0231 + 1e-5).contains(&radius), "{radius}");
        }
    }
}
