use crate::{
    math::{Polynomial, Vector2},
    shape::Bounds,
};

/// Starting guesses for the Newton iteration on curve distances.
const NEWTON_SEEDS: [f64; 9] = [0.0, 0.125, 0.25, 0.375, 0.5, 0.625, 0.75, 0.875, 1.0];
const NEWTON_ITERS: u8 = 8;

/// Parameter in `[0, 1]` minimizing `distance_sq`, from the endpoints and
/// the stationary points `stationary` converges to from each seed.
fn nearest_on_curve(distance_sq: impl Fn(f64) -> f64, stationary: impl Fn(f64) -> f64) -> f64 {
    NEWTON_SEEDS
        .into_iter()
        .map(stationary)
        .filter(|t| (0.0..=1.0).contains(t))
        .chain([0.0, 1.0])
        .map(|t| (distance_sq(t), t))
        .fold((f64::INFINITY, 0.0), |best, candidate| {
            if candidate.0 < best.0 {
                candidate
            } else {
                best
            }
        })
        .1
}

pub trait Edge {
    fn point(&self, t: f64) -> Vector2;
    fn nearest_t(&self, point: Vector2) -> f64;
    fn direction(&self, t: f64) -> Vector2;
    /// Grow `bounds` to contain every point of the edge.
    fn bounds(&self, bounds: &mut Bounds);
    /// Append the points of a polyline approximation, excluding the start.
    fn flatten(&self, out: &mut Vec<Vector2>);
}

/// Channels an edge contributes to in a multichannel field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeColor(pub u8);

impl EdgeColor {
    pub const BLACK: Self = Self(0);
    pub const RED: Self = Self(1);
    pub const GREEN: Self = Self(2);
    pub const YELLOW: Self = Self(3);
    pub const BLUE: Self = Self(4);
    pub const MAGENTA: Self = Self(5);
    pub const CYAN: Self = Self(6);
    pub const WHITE: Self = Self(7);

    pub fn has(self, channel: Self) -> bool {
        self.0 & channel.0 != 0
    }
}

/// Distance from a point to an edge, positive on the right-hand side of
/// the edge direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignedDistance {
    pub distance: f64,
    /// Tie breaker between edges meeting at a shared endpoint; smaller is
    /// closer.
    pub dot: f64,
}

impl SignedDistance {
    pub const INFINITE: Self = Self {
        distance: -f64::MAX,
        dot: 1.0,
    };

    pub fn is_closer_than(&self, other: &Self) -> bool {
        let (mine, theirs) = (self.distance.abs(), other.distance.abs());
        mine < theirs || (mine == theirs && self.dot < other.dot)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Line {
    start: Vector2,
    end: Vector2,
}

impl Line {
    pub fn new(start: Vector2, end: Vector2) -> Self {
        Self { start, end }
    }
}

impl Edge for Line {
    fn point(&self, t: f64) -> Vector2 {
        self.start.lerp(self.end, t)
    }

    fn nearest_t(&self, point: Vector2) -> f64 {
        let v = self.end - self.start;
        let u = self.start - point;
        let w = self.end - point;
        let vu = v.dot(u);
        let vv = v.dot(v);
        let t = -vu / vv;
        let start = u.dot(u);
        let end = w.dot(w);
        if (0.0..=1.0).contains(&t) {
            t
        } else if start < end {
            0.0
        } else {
            1.0
        }
    }

    fn direction(&self, _t: f64) -> Vector2 {
        self.end - self.start
    }

    fn bounds(&self, bounds: &mut Bounds) {
        bounds.include(self.start);
        bounds.include(self.end);
    }

    fn flatten(&self, out: &mut Vec<Vector2>) {
        out.push(self.end);
    }
}

#[derive(Clone, Copy, Debug)]
pub struct QuadCurve {
    points: [Vector2; 3],
    x_poly: Polynomial<3>,
    y_poly: Polynomial<3>,
}

impl QuadCurve {
    pub fn new(start: Vector2, control: Vector2, end: Vector2) -> Self {
        let x_poly = Polynomial {
            coeffs: [
                -2.0 * control.x + start.x + end.x,
                2.0 * control.x - 2.0 * start.x,
                start.x,
            ],
        };
        let y_poly = Polynomial {
            coeffs: [
                -2.0 * control.y + start.y + end.y,
                2.0 * control.y - 2.0 * start.y,
                start.y,
            ],
        };
        Self {
            points: [start, control, end],
            x_poly,
            y_poly,
        }
    }

    fn split(&self, t: f64) -> (Self, Self) {
        let [p0, p1, p2] = self.points;
        let a = p0.lerp(p1, t);
        let b = p1.lerp(p2, t);
        let mid = a.lerp(b, t);
        (Self::new(p0, a, mid), Self::new(mid, b, p2))
    }
}

impl Edge for QuadCurve {
    fn point(&self, t: f64) -> Vector2 {
        Vector2::new(self.x_poly.value(t), self.y_poly.value(t))
    }

    fn nearest_t(&self, point: Vector2) -> f64 {
        let x_point = Polynomial {
            coeffs: [0.0, 0.0, point.x],
        };
        let y_point = Polynomial {
            coeffs: [0.0, 0.0, point.y],
        };
        let distance_sq = (self.x_poly - x_point).pow2() + (self.y_poly - y_point).pow2();
        let slope = distance_sq.derivative();
        nearest_on_curve(
            |t| distance_sq.value(t),
            |seed| slope.newtons_root(seed, NEWTON_ITERS),
        )
    }

    fn direction(&self, t: f64) -> Vector2 {
        let d = Vector2::new(
            self.x_poly.derivative().value(t),
            self.y_poly.derivative().value(t),
        );
        if d == Vector2::ZERO {
            self.points[2] - self.points[0]
        } else {
            d
        }
    }

    fn bounds(&self, bounds: &mut Bounds) {
        bounds.include(self.points[0]);
        bounds.include(self.points[2]);
        for t in [
            self.x_poly.derivative().root(),
            self.y_poly.derivative().root(),
        ] {
            if t > 0.0 && t < 1.0 {
                bounds.include(self.point(t));
            }
        }
    }

    fn flatten(&self, out: &mut Vec<Vector2>) {
        const STEPS: u32 = 8;
        for step in 1..=STEPS {
            out.push(self.point(f64::from(step) / f64::from(STEPS)));
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CubicCurve {
    points: [Vector2; 4],
    x_poly: Polynomial<4>,
    y_poly: Polynomial<4>,
}

impl CubicCurve {
    pub fn new(start: Vector2, control_s: Vector2, control_e: Vector2, end: Vector2) -> Self {
        let x_poly = Polynomial {
            coeffs: [
                -start.x + 3.0 * control_s.x - 3.0 * control_e.x + end.x,
                3.0 * start.x - 6.0 * control_s.x + 3.0 * control_e.x,
                -3.0 * start.x + 3.0 * control_s.x,
                start.x,
            ],
        };
        let y_poly = Polynomial {
            coeffs: [
                -start.y + 3.0 * control_s.y - 3.0 * control_e.y + end.y,
                3.0 * start.y - 6.0 * control_s.y + 3.0 * control_e.y,
                -3.0 * start.y + 3.0 * control_s.y,
                start.y,
            ],
        };
        Self {
            points: [start, control_s, control_e, end],
            x_poly,
            y_poly,
        }
    }

    fn split(&self, t: f64) -> (Self, Self) {
        let [p0, p1, p2, p3] = self.points;
        let a = p0.lerp(p1, t);
        let b = p1.lerp(p2, t);
        let c = p2.lerp(p3, t);
        let ab = a.lerp(b, t);
        let bc = b.lerp(c, t);
        let mid = ab.lerp(bc, t);
        (Self::new(p0, a, ab, mid), Self::new(mid, bc, c, p3))
    }
}

impl Edge for CubicCurve {
    fn point(&self, t: f64) -> Vector2 {
        Vector2::new(self.x_poly.value(t), self.y_poly.value(t))
    }

    fn nearest_t(&self, point: Vector2) -> f64 {
        let x_point = Polynomial {
            coeffs: [0.0, 0.0, 0.0, point.x],
        };
        let y_point = Polynomial {
            coeffs: [0.0, 0.0, 0.0, point.y],
        };
        let distance_sq = (self.x_poly - x_point).pow2() + (self.y_poly - y_point).pow2();
        let slope = distance_sq.derivative();
        nearest_on_curve(
            |t| distance_sq.value(t),
            |seed| slope.newtons_root(seed, NEWTON_ITERS),
        )
    }

    fn direction(&self, t: f64) -> Vector2 {
        let d = Vector2::new(
            self.x_poly.derivative().value(t),
            self.y_poly.derivative().value(t),
        );
        if d != Vector2::ZERO {
            return d;
        }
        // a control point sitting on its endpoint
        let [p0, p1, p2, p3] = self.points;
        let fallback = if t < 0.5 { p2 - p0 } else { p3 - p1 };
        if fallback == Vector2::ZERO {
            p3 - p0
        } else {
            fallback
        }
    }

    fn bounds(&self, bounds: &mut Bounds) {
        bounds.include(self.points[0]);
        bounds.include(self.points[3]);
        let [x0, x1] = self.x_poly.derivative().roots();
        let [y0, y1] = self.y_poly.derivative().roots();
        for t in [x0, x1, y0, y1] {
            if t > 0.0 && t < 1.0 {
                bounds.include(self.point(t));
            }
        }
    }

    fn flatten(&self, out: &mut Vec<Vector2>) {
        const STEPS: u32 = 16;
        for step in 1..=STEPS {
            out.push(self.point(f64::from(step) / f64::from(STEPS)));
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Curve {
    Line(Line),
    Quad(QuadCurve),
    Cubic(CubicCurve),
}

impl Curve {
    fn as_edge(&self) -> &dyn Edge {
        match self {
            Curve::Line(line) => line,
            Curve::Quad(quad) => quad,
            Curve::Cubic(cubic) => cubic,
        }
    }

    pub fn start(&self) -> Vector2 {
        match self {
            Curve::Line(line) => line.start,
            Curve::Quad(quad) => quad.points[0],
            Curve::Cubic(cubic) => cubic.points[0],
        }
    }

    pub fn end(&self) -> Vector2 {
        match self {
            Curve::Line(line) => line.end,
            Curve::Quad(quad) => quad.points[2],
            Curve::Cubic(cubic) => cubic.points[3],
        }
    }

    fn control_points(&self) -> &[Vector2] {
        match self {
            Curve::Line(line) => std::slice::from_ref(&line.start),
            Curve::Quad(quad) => &quad.points,
            Curve::Cubic(cubic) => &cubic.points,
        }
    }

    /// True when every control point coincides, so the curve has no length.
    pub fn is_degenerate(&self) -> bool {
        let start = self.start();
        self.end() == start && self.control_points().iter().all(|&p| p == start)
    }

    pub fn is_finite(&self) -> bool {
        self.end().is_finite() && self.control_points().iter().all(|p| p.is_finite())
    }

    fn split(&self, t: f64) -> (Self, Self) {
        match self {
            Curve::Line(line) => {
                let mid = line.point(t);
                (
                    Curve::Line(Line::new(line.start, mid)),
                    Curve::Line(Line::new(mid, line.end)),
                )
            }
            Curve::Quad(quad) => {
                let (a, b) = quad.split(t);
                (Curve::Quad(a), Curve::Quad(b))
            }
            Curve::Cubic(cubic) => {
                let (a, b) = cubic.split(t);
                (Curve::Cubic(a), Curve::Cubic(b))
            }
        }
    }

    pub fn split_in_thirds(&self) -> [Self; 3] {
        let (first, rest) = self.split(1.0 / 3.0);
        let (second, third) = rest.split(0.5);
        [first, second, third]
    }
}

impl Edge for Curve {
    fn point(&self, t: f64) -> Vector2 {
        self.as_edge().point(t)
    }

    fn nearest_t(&self, point: Vector2) -> f64 {
        self.as_edge().nearest_t(point)
    }

    fn direction(&self, t: f64) -> Vector2 {
        self.as_edge().direction(t)
    }

    fn bounds(&self, bounds: &mut Bounds) {
        self.as_edge().bounds(bounds)
    }

    fn flatten(&self, out: &mut Vec<Vector2>) {
        self.as_edge().flatten(out)
    }
}

/// A curve of a contour together with its edge color.
#[derive(Clone, Copy, Debug)]
pub struct EdgeSegment {
    pub curve: Curve,
    pub color: EdgeColor,
}

impl EdgeSegment {
    pub fn new(curve: Curve) -> Self {
        Self {
            curve,
            color: EdgeColor::WHITE,
        }
    }

    /// Distance from `origin` to the edge, along with the parameter of the
    /// nearest point.
    pub fn signed_distance(&self, origin: Vector2) -> (SignedDistance, f64) {
        let t = self.curve.nearest_t(origin);
        let nearest = self.curve.point(t);
        let dir = self.curve.direction(t).normalize();
        let to_origin = origin - nearest;
        let side = to_origin.cross(dir);
        let sign = if side < 0.0 { -1.0 } else { 1.0 };
        let dot = if t <= 0.0 || t >= 1.0 {
            dir.dot(to_origin.normalize()).abs()
        } else {
            0.0
        };
        let distance = SignedDistance {
            distance: sign * to_origin.length(),
            dot,
        };
        (distance, t)
    }

    /// Replace `distance` with the distance to the edge's tangent line when
    /// the nearest point is an endpoint and the origin lies beyond it.
    pub fn distance_to_pseudo_distance(
        &self,
        distance: &mut SignedDistance,
        origin: Vector2,
        t: f64,
    ) {
        let (endpoint, dir, beyond) = if t <= 0.0 {
            let dir = self.curve.direction(0.0).normalize();
            let aq = origin - self.curve.start();
            (aq, dir, aq.dot(dir) < 0.0)
        } else if t >= 1.0 {
            let dir = self.curve.direction(1.0).normalize();
            let bq = origin - self.curve.end();
            (bq, dir, bq.dot(dir) > 0.0)
        } else {
            return;
        };
        if beyond {
            let pseudo = endpoint.cross(dir);
            if pseudo.abs() <= distance.distance.abs() {
                distance.distance = pseudo;
                distance.dot = 0.0;
            }
        }
    }
}
