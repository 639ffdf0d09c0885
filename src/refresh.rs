//! Periodic refresh task: runs the fetch-and-derive cycle on a timer, on
//! manual request and on selection changes, publishing each render model.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::dashboard::{self, Selections};
use crate::event::{AppEvent, RefreshReason};
use crate::market_data::MarketDataSource;
use crate::metrics::MetricWindows;

pub struct RefreshChannels {
    pub selections_rx: watch::Receiver<Selections>,
    pub trigger_rx: mpsc::Receiver<()>,
    pub events_tx: mpsc::Sender<AppEvent>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Spawn the refresh loop. The first cycle starts immediately.
///
/// At most one cycle is in flight: starting a new cycle aborts the
/// previous one if it has not finished and reports it as cancelled.
pub fn spawn_refresh_task<S: MarketDataSource>(
    source: Arc<S>,
    windows: MetricWindows,
    period: Duration,
    channels: RefreshChannels,
) -> JoinHandle<()> {
    let RefreshChannels {
        mut selections_rx,
        mut trigger_rx,
        events_tx,
        mut shutdown_rx,
    } = channels;

    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycle: u64 = 0;
        let mut in_flight: Option<(u64, JoinHandle<()>)> = None;
        let mut last_fetched: Option<Selections> = None;

        loop {
            if *shutdown_rx.borrow() || events_tx.is_closed() {
                break;
            }

            let reason = tokio::select! {
                _ = timer.tick() => RefreshReason::Timer,
                Some(()) = trigger_rx.recv() => RefreshReason::Manual,
                changed = selections_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    RefreshReason::SelectionsChanged
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = events_tx.closed() => break,
            };

            let selections = selections_rx.borrow_and_update().clone();
            if reason == RefreshReason::SelectionsChanged {
                let needs_fetch = last_fetched
                    .as_ref()
                    .map_or(true, |prev| selections.requires_fetch(prev));
                if !needs_fetch {
                    tracing::debug!("view-only selection change, no fetch");
                    continue;
                }
            }
            last_fetched = Some(selections.clone());

            if let Some((prev, handle)) = in_flight.take() {
                if !handle.is_finished() {
                    handle.abort();
                    tracing::warn!(cycle = prev, "refresh still in flight, cancelled");
                    let _ = events_tx.send(AppEvent::RefreshCancelled { cycle: prev }).await;
                }
            }

            cycle += 1;
            let ticker = selections.normalized_ticker();
            tracing::info!(cycle, ticker = %ticker, reason = reason.as_str(), "refresh started");
            if events_tx
                .send(AppEvent::RefreshStarted {
                    cycle,
                    ticker,
                    reason,
                })
                .await
                .is_err()
            {
                break;
            }

            let source = source.clone();
            let tx = events_tx.clone();
            let this_cycle = cycle;
            let handle = tokio::spawn(async move {
                let outcome = dashboard::refresh(source.as_ref(), &selections, windows).await;
                tracing::info!(
                    cycle = this_cycle,
                    ticker = %outcome.model.ticker,
                    errors = outcome.model.errors.len(),
                    "refresh finished"
                );
                if tx
                    .send(AppEvent::Rendered {
                        cycle: this_cycle,
                        fetched: outcome.fetched,
                        model: outcome.model,
                    })
                    .await
                    .is_err()
                {
                    tracing::debug!(cycle = this_cycle, "event channel closed before publish");
                }
            });
            in_flight = Some((cycle, handle));
        }

        if let Some((_, handle)) = in_flight {
            handle.abort();
        }
        tracing::info!("refresh task shutting down");
    })
}
