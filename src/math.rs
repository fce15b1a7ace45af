use std::ops::{Add, Div, Mul, Neg, Sub};

/// Polynomial in `t`, highest power first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Polynomial<const N: usize> {
    pub coeffs: [f64; N],
}

impl<const N: usize> Polynomial<N> {
    pub fn value(&self, t: f64) -> f64 {
        self.coeffs.iter().fold(0.0, |acc, &coeff| acc * t + coeff)
    }
}

impl Polynomial<2> {
    pub fn root(&self) -> f64 {
        let [a, b] = self.coeffs;
        -b / a
    }
}

impl Polynomial<3> {
    /// Both roots of the quadratic; NaN where there is no real root.
    ///
    /// A vanishing leading coefficient degrades to the linear root.
    pub fn roots(&self) -> [f64; 2] {
        let [a, b, c] = self.coeffs;
        if a.abs() < 1e-12 {
            return [Polynomial { coeffs: [b, c] }.root(), f64::NAN];
        }
        let discriminant = b * b - 4.0 * a * c;
        let sqrt = discriminant.sqrt();
        [(-b + sqrt) / (2.0 * a), (-b - sqrt) / (2.0 * a)]
    }
}

macro_rules! impl_derivative {
    ($N:literal newtons) => {
        impl_derivative! { $N }
        impl Polynomial<$N> {
            /// Newton iteration from `guess`; stops early on a flat spot.
            pub fn newtons_root(&self, mut guess: f64, iters: u8) -> f64 {
                let slope = self.derivative();
                for _ in 0..iters {
                    let d = slope.value(guess);
                    if d == 0.0 {
                        break;
                    }
                    guess -= self.value(guess) / d;
                }
                guess
            }
        }
    };
    ($N:literal) => {
        impl Polynomial<$N> {
            pub fn derivative(&self) -> Polynomial<{ $N - 1 }> {
                Polynomial {
                    coeffs: std::array::from_fn(|i| self.coeffs[i] * ($N - 1 - i) as f64),
                }
            }
        }
    };
}

impl_derivative!(3);
impl_derivative!(4 newtons);
impl_derivative!(5);
impl_derivative!(6 newtons);
impl_derivative!(7);

impl<const N: usize> Add for Polynomial<N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Polynomial {
            coeffs: std::array::from_fn(|i| self.coeffs[i] + rhs.coeffs[i]),
        }
    }
}

impl<const N: usize> Sub for Polynomial<N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Polynomial {
            coeffs: std::array::from_fn(|i| self.coeffs[i] - rhs.coeffs[i]),
        }
    }
}

macro_rules! impl_square {
    ($($N:literal => $M:literal),*) => {
        $(
            impl Polynomial<$N> {
                pub fn pow2(self) -> Polynomial<$M> {
                    let mut coeffs = [0.0; $M];
                    for (i, a) in self.coeffs.iter().enumerate() {
                        for (j, b) in self.coeffs.iter().enumerate() {
                            // degree (N-1-i)+(N-1-j) lives at index i+j
                            coeffs[i + j] += a * b;
                        }
                    }
                    Polynomial { coeffs }
                }
            }
        )*
    };
}

impl_square!(3 => 5, 4 => 7);

/// A point or direction in shape space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// The z component of the 3d cross product.
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Self::ZERO
        } else {
            self / len
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vector2 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

pub fn median(a: f32, b: f32, c: f32) -> f32 {
    a.min(b).max(a.max(b).min(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horner_value() {
        // 2t² - 3t + 1
        let p = Polynomial { coeffs: [2.0, -3.0, 1.0] };
        assert_eq!(p.value(0.0), 1.0);
        assert_eq!(p.value(1.0), 0.0);
        assert_eq!(p.value(2.0), 3.0);
    }

    #[test]
    fn quadratic_roots() {
        let p = Polynomial { coeffs: [2.0, -3.0, 1.0] };
        let mut roots = p.roots();
        roots.sort_by(f64::total_cmp);
        assert!((roots[0] - 0.5).abs() < 1e-12);
        assert!((roots[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_quadratic_is_linear() {
        let p = Polynomial { coeffs: [0.0, 2.0, -1.0] };
        let [root, none] = p.roots();
        assert!((root - 0.5).abs() < 1e-12);
        assert!(none.is_nan());
    }

    #[test]
    fn square_and_derivative() {
        // (t + 1)² = t² + 2t + 1, derivative 2t + 2
        let p = Polynomial { coeffs: [0.0, 1.0, 1.0] }.pow2();
        assert_eq!(p.coeffs, [0.0, 0.0, 1.0, 2.0, 1.0]);
        assert_eq!(p.derivative().coeffs, [0.0, 0.0, 2.0, 2.0]);
    }

    #[test]
    fn newton_finds_cubic_root() {
        // t³ - t has roots at -1, 0, 1
        let p = Polynomial { coeffs: [1.0, 0.0, -1.0, 0.0] };
        let root = p.newtons_root(0.8, 16);
        assert!((root - 1.0).abs() < 1e-9);
    }

    #[test]
    fn vector_products() {
        let a = Vector2::new(1.0, 0.0);
        let b = Vector2::new(0.0, 2.0);
        assert_eq!(a.dot(b), 0.0);
        assert_eq!(a.cross(b), 2.0);
        assert_eq!(b.normalize(), Vector2::new(0.0, 1.0));
        assert_eq!(Vector2::ZERO.normalize(), Vector2::ZERO);
    }

    #[test]
    fn median_of_three() {
        assert_eq!(median(0.1, 0.9, 0.5), 0.5);
        assert_eq!(median(0.7, 0.2, 0.3), 0.3);
    }
}
