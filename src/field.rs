//! Distance field generation for a single shape.
//!
//! Bitmaps are stored bottom row first, matching the y-up shape space: the
//! texel at `(x, y)` samples the shape at
//! `((x + 0.5) / scale - translation.x, (y + 0.5) / scale - translation.y)`.
//! A value of 0.5 lies on the outline, values above 0.5 are inside the
//! glyph, and `range` shape units of distance span half of [0, 1].

use crate::{
    config::FieldMode,
    edge::{Edge, EdgeColor, EdgeSegment, SignedDistance},
    error::FieldRenderError,
    math::{median, Vector2},
    shape::{winding_number, Shape},
};

/// Corner threshold in radians used when coloring edges.
pub const DEFAULT_ANGLE_THRESHOLD: f64 = 2.5;

#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    pixels: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![T::default(); len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> T {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: T) {
        let index = self.index(x, y);
        self.pixels[index] = value;
    }
}

/// A rendered distance field in the channel layout of its [`FieldMode`].
#[derive(Clone, Debug, PartialEq)]
pub enum Bitmap {
    Single(Grid<f32>),
    Multi(Grid<[f32; 3]>),
}

impl Bitmap {
    pub fn new(mode: FieldMode, width: u32, height: u32) -> Self {
        match mode {
            FieldMode::Msdf => Bitmap::Multi(Grid::new(width, height)),
            FieldMode::Sdf | FieldMode::PseudoSdf => Bitmap::Single(Grid::new(width, height)),
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Bitmap::Single(grid) => grid.width(),
            Bitmap::Multi(grid) => grid.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Bitmap::Single(grid) => grid.height(),
            Bitmap::Multi(grid) => grid.height(),
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            Bitmap::Single(_) => 1,
            Bitmap::Multi(_) => 3,
        }
    }

    /// The channel values of one texel.
    pub fn texel(&self, x: u32, y: u32) -> &[f32] {
        match self {
            Bitmap::Single(grid) => std::slice::from_ref(&grid.pixels[grid.index(x, y)]),
            Bitmap::Multi(grid) => &grid.pixels[grid.index(x, y)],
        }
    }
}

fn is_corner(a: Vector2, b: Vector2, cross_threshold: f64) -> bool {
    a.dot(b) <= 0.0 || a.cross(b).abs() > cross_threshold
}

fn switch_color(color: &mut EdgeColor, seed: &mut u64, banned: EdgeColor) {
    let combined = EdgeColor(color.0 & banned.0);
    if combined == EdgeColor::RED || combined == EdgeColor::GREEN || combined == EdgeColor::BLUE
    {
        *color = EdgeColor(combined.0 ^ EdgeColor::WHITE.0);
        return;
    }
    if *color == EdgeColor::BLACK || *color == EdgeColor::WHITE {
        const START: [EdgeColor; 3] = [EdgeColor::CYAN, EdgeColor::MAGENTA, EdgeColor::YELLOW];
        *color = START[(*seed % 3) as usize];
        *seed /= 3;
        return;
    }
    let shifted = u32::from(color.0) << (1 + (*seed & 1));
    *color = EdgeColor(((shifted | shifted >> 3) & u32::from(EdgeColor::WHITE.0)) as u8);
    *seed >>= 1;
}

/// Maps position `i` of `n` to -1, 0 or 1, splitting the sequence into
/// three roughly equal parts.
fn symmetrical_trichotomy(i: usize, n: usize) -> usize {
    let t = 3.0 + 2.875 * i as f64 / (n - 1) as f64 - 1.4375 + 0.5;
    // `1 +` the trichotomy, ready to index a three element table
    (t as usize).saturating_sub(2).min(2)
}

/// Assign edge colors so that every corner sharper than `angle_threshold`
/// separates edges that share at most one channel.
pub fn color_edges_simple(shape: &mut Shape, angle_threshold: f64) {
    let cross_threshold = angle_threshold.sin();
    let mut seed = 0_u64;
    for contour in &mut shape.contours {
        let edges = &mut contour.edges;
        let Some(last) = edges.last() else {
            continue;
        };
        let mut corners = Vec::new();
        let mut prev_direction = last.curve.direction(1.0);
        for (index, edge) in edges.iter().enumerate() {
            let direction = edge.curve.direction(0.0);
            if is_corner(
                prev_direction.normalize(),
                direction.normalize(),
                cross_threshold,
            ) {
                corners.push(index);
            }
            prev_direction = edge.curve.direction(1.0);
        }

        match corners[..] {
            [] => {
                for edge in edges.iter_mut() {
                    edge.color = EdgeColor::WHITE;
                }
            }
            [corner] => {
                // teardrop
                let mut colors = [EdgeColor::WHITE; 3];
                switch_color(&mut colors[0], &mut seed, EdgeColor::BLACK);
                colors[2] = colors[0];
                switch_color(&mut colors[2], &mut seed, EdgeColor::BLACK);
                let count = edges.len();
                if count >= 3 {
                    for i in 0..count {
                        edges[(corner + i) % count].color =
                            colors[symmetrical_trichotomy(i, count)];
                    }
                } else {
                    let parts: Vec<_> = (0..count)
                        .flat_map(|i| edges[(corner + i) % count].curve.split_in_thirds())
                        .collect();
                    let per_color = parts.len() / 3;
                    *edges = parts
                        .into_iter()
                        .enumerate()
                        .map(|(i, curve)| EdgeSegment {
                            curve,
                            color: colors[i / per_color],
                        })
                        .collect();
                }
            }
            _ => {
                let count = edges.len();
                let start = corners[0];
                let mut spline = 0;
                let mut color = EdgeColor::WHITE;
                switch_color(&mut color, &mut seed, EdgeColor::BLACK);
                let initial = color;
                for i in 0..count {
                    let index = (start + i) % count;
                    if spline + 1 < corners.len() && corners[spline + 1] == index {
                        spline += 1;
                        let banned = if spline == corners.len() - 1 {
                            initial
                        } else {
                            EdgeColor::BLACK
                        };
                        switch_color(&mut color, &mut seed, banned);
                    }
                    edges[index].color = color;
                }
            }
        }
    }
}

#[derive(Clone, Copy)]
struct Nearest<'a> {
    distance: SignedDistance,
    edge: Option<&'a EdgeSegment>,
    t: f64,
}

impl<'a> Nearest<'a> {
    const NONE: Self = Self {
        distance: SignedDistance::INFINITE,
        edge: None,
        t: 0.0,
    };

    fn offer(&mut self, distance: SignedDistance, edge: &'a EdgeSegment, t: f64) {
        if distance.is_closer_than(&self.distance) {
            *self = Self {
                distance,
                edge: Some(edge),
                t,
            };
        }
    }

    fn pseudo_distance(&self, origin: Vector2) -> f64 {
        let mut distance = self.distance;
        if let Some(edge) = self.edge {
            edge.distance_to_pseudo_distance(&mut distance, origin, self.t);
        }
        distance.distance
    }
}

fn field_value(distance: f64, range: f64) -> f32 {
    (distance / range + 0.5) as f32
}

fn true_distance(shape: &Shape, origin: Vector2) -> f64 {
    let mut nearest = Nearest::NONE;
    for edge in shape.edges() {
        let (distance, t) = edge.signed_distance(origin);
        nearest.offer(distance, edge, t);
    }
    nearest.distance.distance
}

fn pseudo_distance(shape: &Shape, origin: Vector2) -> f64 {
    let mut nearest = Nearest::NONE;
    for edge in shape.edges() {
        let (distance, t) = edge.signed_distance(origin);
        nearest.offer(distance, edge, t);
    }
    nearest.pseudo_distance(origin)
}

fn channel_distances(shape: &Shape, origin: Vector2) -> [f64; 3] {
    let channels = [EdgeColor::RED, EdgeColor::GREEN, EdgeColor::BLUE];
    let mut nearest = [Nearest::NONE; 3];
    for edge in shape.edges() {
        let (distance, t) = edge.signed_distance(origin);
        for (channel, nearest) in channels.iter().zip(&mut nearest) {
            if edge.color.has(*channel) {
                nearest.offer(distance, edge, t);
            }
        }
    }
    nearest.map(|n| n.pseudo_distance(origin))
}

/// Fill `bitmap` with the distance field of `shape`.
///
/// Multichannel fields expect the shape's edges to be colored with
/// [`color_edges_simple`] first.
pub fn generate(
    mode: FieldMode,
    bitmap: &mut Bitmap,
    shape: &Shape,
    range: f64,
    scale: f64,
    translation: Vector2,
) -> Result<(), FieldRenderError> {
    if shape.edge_count() == 0 {
        return Err(FieldRenderError::EmptyShape);
    }
    if !shape.is_finite() || !translation.is_finite() {
        return Err(FieldRenderError::NonFinite);
    }
    if !(scale.is_finite() && scale > 0.0 && range.is_finite() && range > 0.0) {
        return Err(FieldRenderError::InvalidTransform { scale, range });
    }
    let polylines = shape.flatten();
    let origin_of = |x: u32, y: u32| {
        Vector2::new(
            (f64::from(x) + 0.5) / scale - translation.x,
            (f64::from(y) + 0.5) / scale - translation.y,
        )
    };
    match (mode, bitmap) {
        (FieldMode::Sdf | FieldMode::PseudoSdf, Bitmap::Single(grid)) => {
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    let origin = origin_of(x, y);
                    let distance = if mode == FieldMode::Sdf {
                        true_distance(shape, origin)
                    } else {
                        pseudo_distance(shape, origin)
                    };
                    let mut value = field_value(distance, range);
                    let inside = winding_number(&polylines, origin) != 0;
                    if (inside && value < 0.5) || (!inside && value > 0.5) {
                        value = 1.0 - value;
                    }
                    grid.set(x, y, value.clamp(0.0, 1.0));
                }
            }
        }
        (FieldMode::Msdf, Bitmap::Multi(grid)) => {
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    let origin = origin_of(x, y);
                    let mut texel = channel_distances(shape, origin).map(|d| field_value(d, range));
                    let [r, g, b] = texel;
                    let m = median(r, g, b);
                    let inside = winding_number(&polylines, origin) != 0;
                    if (inside && m < 0.5) || (!inside && m > 0.5) {
                        texel = texel.map(|v| 1.0 - v);
                    }
                    grid.set(x, y, texel.map(|v| v.clamp(0.0, 1.0)));
                }
            }
        }
        _ => return Err(FieldRenderError::ChannelMismatch),
    }
    Ok(())
}
