//! Box geometry shared by paragraphs and lines.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Four edge lengths in pixels, used for both margins and padding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margin {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margin {
    #[inline]
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Left plus right.
    #[inline]
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Top plus bottom.
    #[inline]
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

impl fmt::Display for Margin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sums_and_display() {
        let m = Margin::new(1.0, 2.0, 3.0, 4.5);
        assert_eq!(m.horizontal(), 4.0);
        assert_eq!(m.vertical(), 6.5);
        assert_eq!(m.to_string(), "(1, 2, 3, 4.5)");
        assert_eq!(Margin::zero(), Margin::default());
    }
}
