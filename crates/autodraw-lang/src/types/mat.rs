//! Affine transform algebra. No Value types, no errors.
//!
//! A `Matrix` is the 2×3 affine map
//!
//! ```text
//! | a  b  x |
//! | c  d  y |
//! | 0  0  1 |
//! ```
//!
//! Composition goes through the full 3×3 row-major product so the implicit
//! third row takes part exactly like the other two.

use std::f64::consts::PI;
use std::fmt;

// ─── Mat3 ─────────────────────────────────────────────────────────────────────

pub type M3 = [f64; 9];

pub fn m3_identity() -> M3 {
    [1., 0., 0.,
     0., 1., 0.,
     0., 0., 1.]
}

pub fn m3_mul(a: &M3, b: &M3) -> M3 {
    let mut c = [0.0f64; 9];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                c[i * 3 + j] += a[i * 3 + k] * b[k * 3 + j];
            }
        }
    }
    c
}

pub fn m3_mul_vec(m: &M3, (vx, vy, vz): (f64, f64, f64)) -> (f64, f64, f64) {
    (
        m[0] * vx + m[1] * vy + m[2] * vz,
        m[3] * vx + m[4] * vy + m[5] * vz,
        m[6] * vx + m[7] * vy + m[8] * vz,
    )
}

// ─── Matrix ───────────────────────────────────────────────────────────────────

/// Immutable 2D affine transform. Copies are independent values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for Matrix {
    fn default() -> Self { Self::identity() }
}

impl Matrix {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, x: f64, y: f64) -> Self {
        Self { a, b, c, d, x, y }
    }

    pub const fn identity() -> Self {
        Self::new(1., 0., 0., 1., 0., 0.)
    }

    /// Counter-clockwise rotation by `angle` radians.
    pub fn rotate(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(c, -s, s, c, 0., 0.)
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0., 0., sy, 0., 0.)
    }

    pub const fn translate(dx: f64, dy: f64) -> Self {
        Self::new(1., 0., 0., 1., dx, dy)
    }

    pub fn to_m3(&self) -> M3 {
        [self.a, self.b, self.x,
         self.c, self.d, self.y,
         0.,     0.,     1.]
    }

    /// Drops the third row, which stays `(0, 0, 1)` for every affine product.
    pub fn from_m3(m: &M3) -> Self {
        Self::new(m[0], m[1], m[3], m[4], m[2], m[5])
    }

    /// `outer · inner`: the returned map applies `inner` first.
    pub fn compose(outer: &Matrix, inner: &Matrix) -> Matrix {
        Self::from_m3(&m3_mul(&outer.to_m3(), &inner.to_m3()))
    }

    pub fn apply(&self, px: f64, py: f64) -> (f64, f64) {
        let (tx, ty, tw) = m3_mul_vec(&self.to_m3(), (px, py, 1.0));
        (tx / tw, ty / tw)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Coefficient-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Matrix, tolerance: f64) -> bool {
        self.to_m3().iter()
            .zip(other.to_m3().iter())
            .all(|(l, r)| (l - r).abs() <= tolerance)
    }

    // ─── Source-unit constructors ────────────────────────────────────────────
    //
    // Operands arrive as fixed-point centiunits. Angles are whole degrees and
    // offsets are taken as-is; only the 2×2 linear part is divided by 100.

    /// `rotate N deg`.
    pub fn from_degrees(deg: i16) -> Self {
        Self::rotate(f64::from(deg) / 180.0 * PI)
    }

    /// `scale N sx sy`, factors in centiunits (`100` = 1.0).
    pub fn from_centi_scale(sx: i16, sy: i16) -> Self {
        Self::scale(centi(sx), centi(sy))
    }

    /// `translate N dx dy`, offsets in drawing units.
    pub fn from_offsets(dx: i16, dy: i16) -> Self {
        Self::translate(f64::from(dx), f64::from(dy))
    }

    /// `transform N a b x c d y`, given row by row. `a b c d` are centiunits,
    /// `x y` are drawing units.
    pub fn from_rows([a, b, x, c, d, y]: [i16; 6]) -> Self {
        Self::new(centi(a), centi(b), centi(c), centi(d), f64::from(x), f64::from(y))
    }
}

fn centi(v: i16) -> f64 {
    f64::from(v) / 100.0
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[[{}, {}; {}, {}], [{}, {}]]", self.a, self.b, self.c, self.d, self.x, self.y)
    }
}
