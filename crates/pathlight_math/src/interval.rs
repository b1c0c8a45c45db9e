#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns the size of the interval (max - min).
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Returns true if x is within the interval [min, max] (inclusive).
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Extend the interval to include x.
    pub fn grow(&mut self, x: f32) {
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    /// Expands the interval by delta/2 on each side.
    pub fn expand(&self, delta: f32) -> Interval {
        let padding = delta / 2.0;
        Interval::new(self.min - padding, self.max + padding)
    }

    /// Creates an interval that surrounds two other intervals.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }

    /// An empty interval (min > max, contains nothing).
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_contains() {
        let interval = Interval::new(0.0, 10.0);

        // Inclusive bounds
        assert!(interval.contains(0.0));
        assert!(interval.contains(10.0));
        assert!(interval.contains(5.0));

        // Outside bounds
        assert!(!interval.contains(-0.1));
        assert!(!interval.contains(10.1));
    }

    #[test]
    fn test_interval_grow() {
        let mut interval = Interval::EMPTY;
        interval.grow(3.0);
        interval.grow(-1.0);

        assert_eq!(interval.min, -1.0);
        assert_eq!(interval.max, 3.0);
        assert!(interval.contains(0.0));
    }

    #[test]
    fn test_interval_expand() {
        let interval = Interval::new(0.0, 10.0);
        let expanded = interval.expand(4.0);

        // Expanded by 2.0 on each side (4.0 / 2)
        assert_eq!(expanded.min, -2.0);
        assert_eq!(expanded.max, 12.0);
        assert_eq!(expanded.size(), 14.0);
    }

    #[test]
    fn test_interval_surrounding() {
        let a = Interval::new(1.0, 5.0);
        let b = Interval::new(-2.0, 3.0);
        let s = Interval::surrounding(&a, &b);

        assert_eq!(s.min, -2.0);
        assert_eq!(s.max, 5.0);
    }

    #[test]
    fn test_interval_empty() {
        let empty = Interval::EMPTY;

        // Empty interval has min > max and contains nothing
        assert!(empty.min > empty.max);
        assert!(!empty.contains(0.0));
        assert!(!empty.contains(f32::INFINITY));
    }
}
