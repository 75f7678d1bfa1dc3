use crate::indicators::series::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossDirection {
    /// `a` moves from at-or-below `b` to strictly above it
    Over,
    /// `a` moves from at-or-above `b` to strictly below it
    Under,
}

/// Lazily evaluated crossing signal between two series.
///
/// Holds borrows of both inputs; evaluation only looks at the two points
/// around the requested position, so building one per bar is free.
#[derive(Debug, Clone, Copy)]
pub struct Cross<A, B> {
    a: A,
    b: B,
    direction: CrossDirection,
}

/// Signal that is true where `a` crosses above `b`
pub fn crossover<A: Series, B: Series>(a: A, b: B) -> Cross<A, B> {
    Cross {
        a,
        b,
        direction: CrossDirection::Over,
    }
}

/// Signal that is true where `a` crosses below `b`
pub fn crossunder<A: Series, B: Series>(a: A, b: B) -> Cross<A, B> {
    Cross {
        a,
        b,
        direction: CrossDirection::Under,
    }
}

impl<A: Series, B: Series> Cross<A, B> {
    pub fn direction(&self) -> CrossDirection {
        self.direction
    }

    /// Whether the crossing happened on the latest bar
    pub fn last(&self) -> bool {
        self.index(0)
    }

    /// Whether the crossing happened `i` bars back
    ///
    /// False when either series lacks the two points needed.
    pub fn index(&self, i: usize) -> bool {
        let needed = i + 2;
        if self.a.length() < needed || self.b.length() < needed {
            return false;
        }

        let (a_now, a_prev) = (self.a.index(i), self.a.index(i + 1));
        let (b_now, b_prev) = (self.b.index(i), self.b.index(i + 1));

        match self.direction {
            CrossDirection::Over => a_prev <= b_prev && a_now > b_now,
            CrossDirection::Under => a_prev >= b_prev && a_now < b_now,
        }
    }

    /// Number of positions at which the signal can be evaluated
    pub fn length(&self) -> usize {
        self.a.length().min(self.b.length()).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::series::ValueSeries;

    fn series(values: &[f64]) -> ValueSeries {
        let mut s = ValueSeries::unbounded();
        for &v in values {
            s.push(v);
        }
        s
    }

    #[test]
    fn test_crossover_detected_on_latest_bar() {
        let a = series(&[1.0, 3.0]);
        let b = series(&[2.0, 2.0]);
        assert!(crossover(&a, &b).last());
        assert!(!crossunder(&a, &b).last());
    }

    #[test]
    fn test_crossunder_detected_on_latest_bar() {
        let a = series(&[3.0, 1.0]);
        let b = series(&[2.0, 2.0]);
        assert!(crossunder(&a, &b).last());
        assert!(!crossover(&a, &b).last());
    }

    #[test]
    fn test_touch_then_break_counts_as_crossing() {
        let a = series(&[2.0, 2.5]);
        let b = series(&[2.0, 2.0]);
        assert!(crossover(&a, &b).last());

        let a = series(&[2.0, 1.5]);
        assert!(crossunder(&a, &b).last());
    }

    #[test]
    fn test_staying_above_is_not_a_crossing() {
        let a = series(&[3.0, 4.0]);
        let b = series(&[2.0, 2.0]);
        assert!(!crossover(&a, &b).last());
        assert!(!crossunder(&a, &b).last());
    }

    #[test]
    fn test_requires_two_points() {
        let a = series(&[3.0]);
        let b = series(&[2.0, 2.0]);
        assert!(!crossover(&a, &b).last());
        assert!(!crossunder(&a, &b).last());
        assert_eq!(crossover(&a, &b).length(), 0);
    }

    #[test]
    fn test_index_looks_back() {
        let a = series(&[1.0, 3.0, 4.0]);
        let b = series(&[2.0, 2.0, 2.0]);
        let signal = crossover(&a, &b);
        assert!(!signal.last());
        assert!(signal.index(1));
        assert!(!signal.index(2));
        assert_eq!(signal.length(), 2);
    }

    #[test]
    fn test_equal_points_never_fire_both() {
        let a = series(&[2.0, 2.0]);
        let b = series(&[2.0, 2.0]);
        assert!(!crossover(&a, &b).last());
        assert!(!crossunder(&a, &b).last());
    }
}
