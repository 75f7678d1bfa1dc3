use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::indicators::Indicator;
use crate::market_data::window::{CandleWindow, WindowLimits};
use crate::models::{Candle, Interval};

/// Indicator handle shared between a store listener and its readers
pub type Shared<T> = Arc<Mutex<T>>;

/// Wrap an indicator so it can be bound to a store and still be read
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// Lock a shared handle, recovering the data if a previous holder panicked
pub fn lock<T>(handle: &Mutex<T>) -> MutexGuard<'_, T> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Callback receiving `(interval, window)` after every window mutation
pub type WindowListener = Box<dyn FnMut(Interval, &CandleWindow) + Send>;

/// Deregistration handle returned by [`MarketDataStore::on_window_update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    callback: WindowListener,
}

/// Per-symbol store of closed candles, one bounded window per interval
///
/// Every accepted candle triggers a synchronous window-update event to all
/// listeners in registration order.
pub struct MarketDataStore {
    symbol: String,
    limits: WindowLimits,
    windows: HashMap<Interval, CandleWindow>,
    listeners: Vec<Listener>,
    next_listener_id: u64,
}

impl std::fmt::Debug for MarketDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataStore")
            .field("symbol", &self.symbol)
            .field("limits", &self.limits)
            .field("windows", &self.windows.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl MarketDataStore {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_limits(symbol, WindowLimits::default())
    }

    pub fn with_limits(symbol: impl Into<String>, limits: WindowLimits) -> Self {
        Self {
            symbol: symbol.into(),
            limits,
            windows: HashMap::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn limits(&self) -> WindowLimits {
        self.limits
    }

    /// Window of an interval, `None` until its first candle arrives
    pub fn window(&self, interval: Interval) -> Option<&CandleWindow> {
        self.windows.get(&interval)
    }

    /// Intervals that currently have a window
    pub fn intervals(&self) -> Vec<Interval> {
        let mut intervals: Vec<Interval> = self.windows.keys().copied().collect();
        intervals.sort();
        intervals
    }

    /// Load bulk history into a window without notifying listeners
    ///
    /// Candles for other symbols or intervals are skipped.
    pub fn seed_window(&mut self, interval: Interval, candles: impl IntoIterator<Item = Candle>) {
        let symbol = self.symbol.clone();
        let limits = self.limits;
        let window = self
            .windows
            .entry(interval)
            .or_insert_with(|| CandleWindow::new(limits));

        let accepted = candles
            .into_iter()
            .filter(|c| c.symbol == symbol && c.interval == interval && c.closed);
        let dropped = window.extend(accepted);

        tracing::debug!(
            "Seeded {} {} window with {} candles ({} truncated)",
            symbol,
            interval,
            window.len(),
            dropped
        );
    }

    /// Append a closed candle and notify listeners
    ///
    /// Returns false when the candle was ignored (other symbol or not closed).
    pub fn add_candle(&mut self, candle: Candle) -> bool {
        if candle.symbol != self.symbol {
            tracing::trace!(
                "{} store ignoring candle for {}",
                self.symbol,
                candle.symbol
            );
            return false;
        }
        if !candle.closed {
            tracing::trace!(
                "{} store ignoring unclosed {} candle at {}",
                self.symbol,
                candle.interval,
                candle.start_time
            );
            return false;
        }

        let interval = candle.interval;
        let limits = self.limits;
        let window = self
            .windows
            .entry(interval)
            .or_insert_with(|| CandleWindow::new(limits));

        let dropped = window.push(candle);
        if dropped > 0 {
            tracing::debug!(
                "Truncated {} {} window: dropped {} candles, kept {}",
                self.symbol,
                interval,
                dropped,
                window.len()
            );
        }

        for listener in self.listeners.iter_mut() {
            (listener.callback)(interval, window);
        }

        true
    }

    /// Register a window-update listener
    pub fn on_window_update<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(Interval, &CandleWindow) + Send + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push(Listener {
            id,
            callback: Box::new(callback),
        });
        tracing::debug!("Registered listener {:?} on {} store", id, self.symbol);
        id
    }

    /// Remove a listener; false if it was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        let removed = self.listeners.len() != before;
        if removed {
            tracing::debug!("Removed listener {:?} from {} store", id, self.symbol);
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Attach an indicator to window updates of its own interval
    pub fn bind<I>(&mut self, indicator: Shared<I>) -> ListenerId
    where
        I: Indicator + Send + 'static,
    {
        self.bind_with(indicator, |_| {})
    }

    /// Like [`bind`](Self::bind), calling `on_update` with the new output
    /// after each update the indicator performs
    ///
    /// An indicator that has not consumed any bar yet is initialized from the
    /// whole window on its first event; afterwards only the newest bar is
    /// pushed. Events whose newest bar is not newer than the last consumed one
    /// are skipped.
    pub fn bind_with<I, F>(&mut self, indicator: Shared<I>, mut on_update: F) -> ListenerId
    where
        I: Indicator + Send + 'static,
        F: FnMut(I::Output) + Send + 'static,
    {
        let (interval, initialized) = {
            let guard = lock(&indicator);
            (guard.interval(), guard.is_initialized())
        };
        // an indicator warmed up before binding has consumed the current window
        let mut last_end_time: Option<DateTime<Utc>> = if initialized {
            self.window(interval)
                .and_then(CandleWindow::last)
                .map(|c| c.end_time)
        } else {
            None
        };

        self.on_window_update(move |event_interval, window| {
            if event_interval != interval {
                return;
            }
            let Some(newest) = window.last() else {
                return;
            };
            if last_end_time.is_some_and(|end| newest.end_time <= end) {
                tracing::trace!(
                    "{} {} skipping already consumed bar at {}",
                    I::NAME,
                    interval,
                    newest.start_time
                );
                return;
            }

            let output = {
                let mut guard = lock(&indicator);
                if guard.is_initialized() {
                    guard.push_candle(newest);
                } else {
                    guard.initialize(window);
                }
                guard.output()
            };
            last_end_time = Some(newest.end_time);

            on_update(output);
        })
    }
}
