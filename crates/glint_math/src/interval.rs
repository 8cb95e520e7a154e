/// Range of accepted ray parameters `t`.
///
/// Intersection routines narrow it as closer hits are found; an interval
/// with `min > max` accepts nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Length of the range; negative when empty.
    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    /// Strict containment, used to reject hits at the range endpoints.
    pub fn surrounds(&self, t: f64) -> bool {
        self.min < t && t < self.max
    }

    /// Pin `x` into the range. NaN maps to `min`.
    pub fn clamp(&self, x: f64) -> f64 {
        if x.is_nan() {
            return self.min;
        }
        x.max(self.min).min(self.max)
    }

    /// Grow by `delta` in total, split evenly between both ends.
    pub fn expand(&self, delta: f64) -> Interval {
        let half = 0.5 * delta;
        Interval::new(self.min - half, self.max + half)
    }

    pub const EMPTY: Interval = Interval {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub const UNIVERSE: Interval = Interval {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(Interval::new(2.0, 7.0).size(), 5.0);
        assert!(Interval::EMPTY.size() < 0.0);
        assert_eq!(Interval::UNIVERSE.size(), f64::INFINITY);
    }

    #[test]
    fn test_surrounds_excludes_endpoints() {
        let t = Interval::new(0.001, 10.0);

        assert!(!t.surrounds(0.001));
        assert!(!t.surrounds(10.0));
        assert!(t.surrounds(0.5));
        assert!(!Interval::EMPTY.surrounds(0.0));
        assert!(Interval::UNIVERSE.surrounds(-1e300));
    }

    #[test]
    fn test_clamp() {
        let unit = Interval::new(0.0, 0.999);

        assert_eq!(unit.clamp(-5.0), 0.0);
        assert_eq!(unit.clamp(0.25), 0.25);
        assert_eq!(unit.clamp(15.0), 0.999);
        assert_eq!(unit.clamp(f64::NAN), 0.0);
    }

    #[test]
    fn test_expand_splits_padding() {
        let grown = Interval::new(1.0, 1.0).expand(1e-4);
        assert_eq!(grown.min, 1.0 - 5e-5);
        assert_eq!(grown.max, 1.0 + 5e-5);
    }
}
