//! Cross-chart synchronization: mirrors the visible time range and the
//! crosshair between the instrument chart and the benchmark overlay chart.
//!
//! Both wirings share one reentrancy guard: propagating a change to the
//! second chart makes that chart emit its own notification, and without the
//! guard the pair would bounce updates back and forth indefinitely. Any
//! failure while propagating is swallowed (sync degrades silently, the
//! user's gesture is never broken) but reported on the diagnostic log
//! channel.

use crate::application::chart_context::ChartContext;
use crate::domain::chart::{ChartApi, CrosshairMove, LogicalRange, SeriesId, SubscriptionId};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::CandleRowSet;
use std::cell::Cell;
use std::rc::Rc;

/// Reentrancy guard as an explicit guarded-section primitive. Acquiring
/// yields a token whose drop releases the flag, so the guard can never be
/// left stuck on an early return or propagation failure.
#[derive(Clone, Default)]
pub struct SyncGuard {
    engaged: Rc<Cell<bool>>,
}

pub struct GuardSection {
    engaged: Rc<Cell<bool>>,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// None while a propagation triggered by the other chart is in flight.
    pub fn try_enter(&self) -> Option<GuardSection> {
        if self.engaged.get() {
            return None;
        }
        self.engaged.set(true);
        Some(GuardSection { engaged: Rc::clone(&self.engaged) })
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.get()
    }

    pub fn reset(&self) {
        self.engaged.set(false);
    }
}

impl Drop for GuardSection {
    fn drop(&mut self) {
        self.engaged.set(false);
    }
}

/// Bridge between two live chart contexts. {unwired} -> wire -> {wired} ->
/// unwire -> {unwired}; wiring is a no-op unless both charts expose the
/// needed event capabilities (absence degrades to independent charts).
#[derive(Default)]
pub struct ChartSyncBridge {
    guard: SyncGuard,
    subscriptions: Vec<BridgeSubscription>,
}

enum BridgeSubscription {
    Range(Rc<dyn ChartApi>, SubscriptionId),
    Crosshair(Rc<dyn ChartApi>, SubscriptionId),
}

impl ChartSyncBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_wired(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Wire both directions for time-range and crosshair mirroring. Any
    /// previous wiring is removed first.
    pub fn wire(&mut self, source: &ChartContext, target: &ChartContext) {
        self.unwire();
        let src = source.chart();
        let dst = target.chart();

        if src.supports_range_events() && dst.supports_range_events() {
            self.bind_range_one_way(&src, &dst);
            self.bind_range_one_way(&dst, &src);
        }
        if src.supports_crosshair_events() && dst.supports_crosshair_events() {
            self.bind_crosshair_one_way(&src, &dst, target.rows(), target.candle_series());
            self.bind_crosshair_one_way(&dst, &src, source.rows(), source.candle_series());
        }
    }

    /// Remove every subscription in both directions and release the guard.
    /// Invoked before any re-wire and whenever either chart is replaced or
    /// the overlay is turned off.
    pub fn unwire(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            match subscription {
                BridgeSubscription::Range(chart, id) => chart.unsubscribe_visible_range(id),
                BridgeSubscription::Crosshair(chart, id) => chart.unsubscribe_crosshair(id),
            }
        }
        self.guard.reset();
    }

    fn bind_range_one_way(&mut self, from: &Rc<dyn ChartApi>, to: &Rc<dyn ChartApi>) {
        let guard = self.guard.clone();
        let to_chart = Rc::clone(to);
        let handler = move |range: Option<LogicalRange>| {
            let Some(range) = range else { return };
            let Some(_section) = guard.try_enter() else { return };
            if let Err(err) = to_chart.set_visible_range(range) {
                get_logger().debug(
                    LogComponent::Application("SyncBridge"),
                    &format!("range propagation swallowed: {}", err),
                );
            }
        };
        let id = from.subscribe_visible_range(Box::new(handler));
        self.subscriptions.push(BridgeSubscription::Range(Rc::clone(from), id));
    }

    fn bind_crosshair_one_way(
        &mut self,
        from: &Rc<dyn ChartApi>,
        to: &Rc<dyn ChartApi>,
        target_rows: Rc<CandleRowSet>,
        target_series: SeriesId,
    ) {
        let guard = self.guard.clone();
        let to_chart = Rc::clone(to);
        let handler = move |param: &CrosshairMove| {
            let Some(_section) = guard.try_enter() else { return };

            let swallow = |result: Result<(), crate::domain::errors::DashboardError>| {
                if let Err(err) = result {
                    get_logger().debug(
                        LogComponent::Application("SyncBridge"),
                        &format!("crosshair propagation swallowed: {}", err),
                    );
                }
            };

            let Some(time) = param.time.filter(|_| param.is_point_inside()) else {
                swallow(to_chart.clear_crosshair());
                return;
            };
            // Translate through the compact date key: the two series may
            // have different trading calendars, so index equality is never
            // assumed.
            match target_rows.by_compact_key(&time.compact_key()) {
                Some(row) => swallow(to_chart.set_crosshair(target_series, row.close, time)),
                None => swallow(to_chart.clear_crosshair()),
            }
        };
        let id = from.subscribe_crosshair(Box::new(handler));
        self.subscriptions.push(BridgeSubscription::Crosshair(Rc::clone(from), id));
    }
}
