use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub, SubAssign};

/// Number of spectral channels carried by a `Color`.
pub const CHANNELS: usize = 3;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn gray(value: f32) -> Self {
        Self::new(value, value, value)
    }

    pub fn avg(&self) -> f32 {
        (self.r + self.g + self.b) / 3.0
    }

    pub fn max_element(&self) -> f32 {
        self.r.max(self.g).max(self.b)
    }

    pub fn min_element(&self) -> f32 {
        self.r.min(self.g).min(self.b)
    }

    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    pub fn exp(&self) -> Color {
        Color::new(self.r.exp(), self.g.exp(), self.b.exp())
    }

    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Color {
        Color::new(f(self.r), f(self.g), f(self.b))
    }

    /// Component-wise division that yields 0 wherever the divisor is 0.
    pub fn safe_div(&self, rhs: Color) -> Color {
        let div = |a: f32, b: f32| if b == 0.0 { 0.0 } else { a / b };
        Color::new(div(self.r, rhs.r), div(self.g, rhs.g), div(self.b, rhs.b))
    }
}

impl Index<usize> for Color {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        match index {
            0 => &self.r,
            1 => &self.g,
            2 => &self.b,
            _ => panic!("color channel {} out of range", index),
        }
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}
impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl Sub for Color {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}
impl SubAssign for Color {
    fn sub_assign(&mut self, rhs: Self) {
        self.r -= rhs.r;
        self.g -= rhs.g;
        self.b -= rhs.b;
    }
}

impl Neg for Color {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.r, -self.g, -self.b)
    }
}

impl Mul<f32> for Color {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}
impl MulAssign<f32> for Color {
    fn mul_assign(&mut self, rhs: f32) {
        self.r *= rhs;
        self.g *= rhs;
        self.b *= rhs;
    }
}
impl Mul<Color> for f32 {
    type Output = Color;

    fn mul(self, rhs: Color) -> Self::Output {
        rhs * self
    }
}
impl Mul<Color> for Color {
    type Output = Self;

    fn mul(self, rhs: Color) -> Self::Output {
        Self::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}
impl MulAssign<Color> for Color {
    fn mul_assign(&mut self, rhs: Color) {
        self.r *= rhs.r;
        self.g *= rhs.g;
        self.b *= rhs.b;
    }
}

impl Div<f32> for Color {
    type Output = Self;

    fn div(self, rhs: f32) -> Self::Output {
        self * (1.0 / rhs)
    }
}
impl DivAssign<f32> for Color {
    fn div_assign(&mut self, rhs: f32) {
        let inv = 1.0 / rhs;
        self.r *= inv;
        self.g *= inv;
        self.b *= inv;
    }
}
impl Div<Color> for Color {
    type Output = Self;

    fn div(self, rhs: Color) -> Self::Output {
        Self::new(self.r / rhs.r, self.g / rhs.g, self.b / rhs.b)
    }
}

impl From<[f32; 3]> for Color {
    fn from(value: [f32; 3]) -> Self {
        Color::new(value[0], value[1], value[2])
    }
}
impl From<Color> for [f32; 3] {
    fn from(value: Color) -> Self {
        [value.r, value.g, value.b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_indexing() {
        let c = Color::new(0.25, 0.5, 2.0);
        assert_eq!(c[0], 0.25);
        assert_eq!(c[1], 0.5);
        assert_eq!(c[2], 2.0);
        assert_eq!(c.max_element(), 2.0);
        assert_eq!(c.min_element(), 0.25);
    }

    #[test]
    fn safe_div_zeroes_empty_channels() {
        let a = Color::new(1.0, 2.0, 3.0);
        let b = Color::new(2.0, 0.0, 3.0);
        assert_eq!(a.safe_div(b), Color::new(0.5, 0.0, 1.0));
    }
}
