use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEventKind};
use tokio::sync::{mpsc, watch};

use stock_dashboard::config::Config;
use stock_dashboard::dashboard::Selections;
use stock_dashboard::event::AppEvent;
use stock_dashboard::input::{parse_edit_command, parse_main_command};
use stock_dashboard::refresh::{spawn_refresh_task, RefreshChannels};
use stock_dashboard::ui::{self, AppState, UiAction};
use stock_dashboard::yahoo::YahooRestClient;

const LOG_FILE: &str = "stock-dashboard.log";

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    // Log to a file so it doesn't interfere with the TUI.
    let log_file = std::fs::File::create(LOG_FILE)
        .with_context(|| format!("failed to create {}", LOG_FILE))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        ticker = %config.dashboard.ticker,
        base_url = %config.yahoo.base_url,
        refresh_secs = config.dashboard.refresh_interval_secs,
        "Starting stock-dashboard"
    );

    let source = Arc::new(
        YahooRestClient::new(
            &config.yahoo.base_url,
            &config.yahoo.user_agent,
            config.yahoo.timeout(),
        )
        .context("failed to build Yahoo client")?,
    );

    let initial = Selections::from_config(&config.dashboard);
    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(64);
    let (selections_tx, selections_rx) = watch::channel(initial.clone());
    let (trigger_tx, trigger_rx) = mpsc::channel::<()>(4);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let refresh_handle = spawn_refresh_task(
        source,
        config.metrics,
        config.dashboard.refresh_interval(),
        RefreshChannels {
            selections_rx,
            trigger_rx,
            events_tx: app_tx,
            shutdown_rx: shutdown_rx.clone(),
        },
    );

    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    let mut terminal = ratatui::init();
    let mut app_state = AppState::new(initial, config.metrics);
    app_state.push_log(format!(
        "stock-dashboard started | {} | every {}s",
        app_state.selections.normalized_ticker(),
        config.dashboard.refresh_interval_secs
    ));

    let outcome: Result<()> = loop {
        while let Ok(evt) = app_rx.try_recv() {
            app_state.apply(evt);
        }

        if let Err(e) = terminal.draw(|frame| ui::render(frame, &app_state)) {
            break Err(e.into());
        }

        match crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms)) {
            Ok(true) => {}
            Ok(false) => {
                if *shutdown_rx.borrow() {
                    break Ok(());
                }
                continue;
            }
            Err(e) => break Err(e.into()),
        }
        let key = match crossterm::event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
            Ok(_) => continue,
            Err(e) => break Err(e.into()),
        };

        let action = if app_state.editing.is_some() {
            parse_edit_command(&key.code).map(|cmd| app_state.apply_edit(cmd))
        } else {
            parse_main_command(&key.code).map(|cmd| app_state.handle_command(cmd))
        };

        match action.unwrap_or(UiAction::None) {
            UiAction::None => {}
            UiAction::Quit => {
                tracing::info!("User quit");
                break Ok(());
            }
            UiAction::Refresh => {
                if trigger_tx.try_send(()).is_err() {
                    app_state.apply(AppEvent::LogMessage(
                        "[WARN] refresh already queued".to_string(),
                    ));
                }
            }
            UiAction::SelectionsChanged => {
                tracing::debug!(ticker = %app_state.selections.ticker, "selections changed");
                if selections_tx.send(app_state.selections.clone()).is_err() {
                    app_state.apply(AppEvent::Error("refresh task is not running".to_string()));
                }
            }
        }

        if *shutdown_rx.borrow() {
            break Ok(());
        }
    };

    let _ = shutdown_tx.send(true);
    ratatui::restore();
    if let Err(e) = refresh_handle.await {
        tracing::warn!(error = %e, "refresh task ended abnormally");
    }
    tracing::info!("Shutdown complete");
    println!("Goodbye! Check {} for details.", LOG_FILE);
    outcome
}
