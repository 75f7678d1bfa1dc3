/// Read access to a numeric time series, latest value first.
pub trait Series {
    /// Most recent value, or 0 when empty
    fn last(&self) -> f64 {
        self.index(0)
    }

    /// Value `i` bars back (0 = current), or 0 when not available
    fn index(&self, i: usize) -> f64;

    /// Number of values currently retained
    fn length(&self) -> usize;
}

impl<S: Series + ?Sized> Series for &S {
    fn last(&self) -> f64 {
        (**self).last()
    }

    fn index(&self, i: usize) -> f64 {
        (**self).index(i)
    }

    fn length(&self) -> usize {
        (**self).length()
    }
}

pub const MAX_SERIES_VALUES: usize = 5_000;
pub const SERIES_TRUNCATE_TO: usize = 100;

/// Append-only output history of an indicator.
///
/// Bounded series drop their oldest values in one batch once they grow past
/// the cap, keeping only the most recent `truncate_to` entries.
#[derive(Debug, Clone, Default)]
pub struct ValueSeries {
    values: Vec<f64>,
    limit: Option<(usize, usize)>,
}

impl ValueSeries {
    /// Series that grows without bound
    pub fn unbounded() -> Self {
        Self {
            values: Vec::new(),
            limit: None,
        }
    }

    /// Series truncated to `truncate_to` values once it exceeds `max`
    pub fn bounded(max: usize, truncate_to: usize) -> Self {
        Self {
            values: Vec::new(),
            limit: Some((max.max(1), truncate_to.clamp(1, max.max(1)))),
        }
    }

    /// Bounded with the default 5000 / 100 policy
    pub fn with_default_bounds() -> Self {
        Self::bounded(MAX_SERIES_VALUES, SERIES_TRUNCATE_TO)
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
        if let Some((max, truncate_to)) = self.limit {
            if self.values.len() > max {
                let excess = self.values.len() - truncate_to;
                self.values.drain(..excess);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values oldest first
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl Series for ValueSeries {
    fn index(&self, i: usize) -> f64 {
        let len = self.values.len();
        if i >= len {
            return 0.0;
        }
        self.values[len - 1 - i]
    }

    fn length(&self) -> usize {
        self.values.len()
    }
}
