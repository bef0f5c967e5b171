use serde::{Deserialize, Serialize};

/// Piecewise-linear fuzzy set over the resistance axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MembershipFn {
    /// Feet at `a` and `c`, peak at `b`.
    Triangle { a: f64, b: f64, c: f64 },
    /// Feet at `a` and `d`, plateau over `b..=c`.
    Trapezoid { a: f64, b: f64, c: f64, d: f64 },
}

impl MembershipFn {
    pub const fn triangle(a: f64, b: f64, c: f64) -> Self {
        MembershipFn::Triangle { a, b, c }
    }

    pub const fn trapezoid(a: f64, b: f64, c: f64, d: f64) -> Self {
        MembershipFn::Trapezoid { a, b, c, d }
    }

    /// Degree of membership in `[0, 1]`. NaN belongs to no set.
    pub fn degree(&self, x: f64) -> f64 {
        match *self {
            MembershipFn::Triangle { a, b, c } => plateau(x, a, b, b, c),
            MembershipFn::Trapezoid { a, b, c, d } => plateau(x, a, b, c, d),
        }
    }
}

fn plateau(x: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    if x >= b && x <= c {
        1.0
    } else if x > a && x < b {
        (x - a) / (b - a)
    } else if x > c && x < d {
        (d - x) / (d - c)
    } else {
        0.0
    }
}
