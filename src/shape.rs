//! Glyph outlines as closed contours of line and Bézier edges.

use crate::{
    edge::{CubicCurve, Curve, Edge, EdgeSegment, Line, QuadCurve},
    math::Vector2,
};

/// An axis-aligned box in shape space, y pointing up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Bounds {
    /// Magnitude of the inverted extrema a bounds query starts from; far
    /// outside any real glyph.
    pub const SENTINEL: f64 = 1.0e6;

    /// Inverted box that any included point replaces.
    pub const EMPTY: Self = Self {
        left: Self::SENTINEL,
        bottom: Self::SENTINEL,
        right: -Self::SENTINEL,
        top: -Self::SENTINEL,
    };

    pub fn include(&mut self, point: Vector2) {
        self.left = self.left.min(point.x);
        self.right = self.right.max(point.x);
        self.bottom = self.bottom.min(point.y);
        self.top = self.top.max(point.y);
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            left: self.left * factor,
            bottom: self.bottom * factor,
            right: self.right * factor,
            top: self.top * factor,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Contour {
    pub edges: Vec<EdgeSegment>,
}

#[derive(Clone, Debug, Default)]
pub struct Shape {
    pub contours: Vec<Contour>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge_count(&self) -> usize {
        self.contours.iter().map(|c| c.edges.len()).sum()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeSegment> {
        self.contours.iter().flat_map(|c| c.edges.iter())
    }

    /// Tight bounds of every edge, starting from [`Bounds::EMPTY`]; a shape
    /// without edges keeps the inverted sentinel box.
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::EMPTY;
        for edge in self.edges() {
            edge.curve.bounds(&mut bounds);
        }
        bounds
    }

    /// Drop zero-length edges and empty contours, and split contours made
    /// of a single edge into thirds so edge coloring has corners to work
    /// with. Idempotent; the covered area and the bounds are unchanged.
    pub fn normalize(&mut self) {
        for contour in &mut self.contours {
            contour.edges.retain(|edge| !edge.curve.is_degenerate());
            if contour.edges.len() == 1 {
                let single = contour.edges[0];
                contour.edges = single
                    .curve
                    .split_in_thirds()
                    .into_iter()
                    .map(|curve| EdgeSegment {
                        curve,
                        color: single.color,
                    })
                    .collect();
            }
        }
        self.contours.retain(|contour| !contour.edges.is_empty());
    }

    pub fn is_finite(&self) -> bool {
        self.edges().all(|edge| edge.curve.is_finite())
    }

    /// Polyline approximation of every contour, used for inside tests.
    pub fn flatten(&self) -> Vec<Vec<Vector2>> {
        self.contours
            .iter()
            .filter_map(|contour| {
                let first = contour.edges.first()?;
                let mut points = vec![first.curve.start()];
                for edge in &contour.edges {
                    edge.curve.flatten(&mut points);
                }
                Some(points)
            })
            .collect()
    }
}

/// Non-zero winding test against flattened contours.
pub fn winding_number(polylines: &[Vec<Vector2>], point: Vector2) -> i32 {
    let mut winding = 0;
    for polyline in polylines {
        let Some(&last) = polyline.last() else {
            continue;
        };
        let mut prev = last;
        for &next in polyline {
            let is_left = (next - prev).cross(point - prev);
            if prev.y <= point.y {
                if next.y > point.y && is_left > 0.0 {
                    winding += 1;
                }
            } else if next.y <= point.y && is_left < 0.0 {
                winding -= 1;
            }
            prev = next;
        }
    }
    winding
}

/// Collects a font outline into a [`Shape`].
pub struct ShapeBuilder {
    shape: Shape,
    current: Vec<EdgeSegment>,
    start: Vector2,
    cursor: Vector2,
}

impl ShapeBuilder {
    pub fn new() -> Self {
        Self {
            shape: Shape::new(),
            current: Vec::new(),
            start: Vector2::ZERO,
            cursor: Vector2::ZERO,
        }
    }

    pub fn finish(mut self) -> Shape {
        self.end_contour();
        self.shape
    }

    fn push(&mut self, curve: Curve, end: Vector2) {
        self.current.push(EdgeSegment::new(curve));
        self.cursor = end;
    }

    fn end_contour(&mut self) {
        if self.current.is_empty() {
            return;
        }
        if self.cursor != self.start {
            let closing = Curve::Line(Line::new(self.cursor, self.start));
            self.current.push(EdgeSegment::new(closing));
        }
        let edges = std::mem::take(&mut self.current);
        self.shape.contours.push(Contour { edges });
        self.cursor = self.start;
    }
}

impl Default for ShapeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ttf_parser::OutlineBuilder for ShapeBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.end_contour();
        self.start = Vector2::new(x.into(), y.into());
        self.cursor = self.start;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let end = Vector2::new(x.into(), y.into());
        self.push(Curve::Line(Line::new(self.cursor, end)), end);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let control = Vector2::new(x1.into(), y1.into());
        let end = Vector2::new(x.into(), y.into());
        self.push(Curve::Quad(QuadCurve::new(self.cursor, control, end)), end);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let control_s = Vector2::new(x1.into(), y1.into());
        let control_e = Vector2::new(x2.into(), y2.into());
        let end = Vector2::new(x.into(), y.into());
        self.push(
            Curve::Cubic(CubicCurve::new(self.cursor, control_s, control_e, end)),
            end,
        );
    }

    fn close(&mut self) {
        self.end_contour();
    }
}
