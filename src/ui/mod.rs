pub mod chart;
pub mod dashboard;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::dashboard::{build_render_model, FetchedData, RenderModel, Selections};
use crate::event::AppEvent;
use crate::input::{EditCommand, EditField, UiCommand};
use crate::metrics::MetricWindows;
use crate::model::column::{CHART_COLUMNS, COMPARE_COLUMNS};

use chart::LineChart;
use dashboard::{
    BalanceSheetPanel, DataTablePanel, ErrorPanel, KeybindBar, LogPanel, SidebarPanel, StatusBar,
};

const MAX_LOG_MESSAGES: usize = 200;
const SCROLL_STEP: usize = 10;

/// What the event loop has to do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    None,
    Quit,
    Refresh,
    SelectionsChanged,
}

pub struct AppState {
    pub selections: Selections,
    pub windows: MetricWindows,
    pub model: Option<RenderModel>,
    pub fetched: Option<FetchedData>,
    /// Selections the data in `fetched` was requested with.
    pub fetched_for: Option<Selections>,
    pub editing: Option<EditField>,
    pub edit_buffer: String,
    pub refreshing: bool,
    pub last_cycle: u64,
    pub refresh_count: u64,
    pub last_updated: Option<String>,
    pub table_scroll: usize,
    pub log_messages: Vec<String>,
}

impl AppState {
    pub fn new(selections: Selections, windows: MetricWindows) -> Self {
        Self {
            selections,
            windows,
            model: None,
            fetched: None,
            fetched_for: None,
            editing: None,
            edit_buffer: String::new(),
            refreshing: false,
            last_cycle: 0,
            refresh_count: 0,
            last_updated: None,
            table_scroll: 0,
            log_messages: Vec::new(),
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::RefreshStarted {
                cycle,
                ticker,
                reason,
            } => {
                self.last_cycle = self.last_cycle.max(cycle);
                self.refreshing = true;
                self.push_log(format!("refresh #{} {} ({})", cycle, ticker, reason.as_str()));
            }
            AppEvent::Rendered {
                cycle,
                fetched,
                model,
            } => {
                if cycle < self.last_cycle {
                    tracing::debug!(cycle, latest = self.last_cycle, "stale render dropped");
                    return;
                }
                self.refreshing = false;
                self.refresh_count += 1;
                self.last_updated = Some(chrono::Local::now().format("%H:%M:%S").to_string());
                for e in &model.errors {
                    self.push_log(format!("[WARN] {}", e));
                }

                match fetched {
                    Some(fetched) => {
                        self.fetched = Some(fetched);
                        self.fetched_for = Some(model.selections.clone());
                    }
                    None => {
                        self.fetched = None;
                        self.fetched_for = None;
                    }
                }
                let stale_view = model.selections != self.selections;
                self.table_scroll = 0;
                self.model = Some(model);
                // The user may have flipped a view toggle while fetching.
                if stale_view {
                    self.rebuild();
                }
            }
            AppEvent::RefreshCancelled { cycle } => {
                self.push_log(format!("[WARN] refresh #{} cancelled", cycle));
            }
            AppEvent::LogMessage(msg) => {
                self.push_log(msg);
            }
            AppEvent::Error(msg) => {
                self.push_log(format!("[ERR] {}", msg));
            }
        }
    }

    /// Re-derive the model from the last fetched data when the current
    /// selections only differ in what is shown. Returns false when new
    /// data is needed instead.
    pub fn rebuild(&mut self) -> bool {
        let (Some(fetched), Some(fetched_for)) = (&self.fetched, &self.fetched_for) else {
            return false;
        };
        if self.selections.requires_fetch(fetched_for) {
            return false;
        }
        self.model = Some(build_render_model(
            &self.selections,
            fetched.clone(),
            self.windows,
        ));
        true
    }

    pub fn handle_command(&mut self, cmd: UiCommand) -> UiAction {
        let s = &mut self.selections;
        match cmd {
            UiCommand::Quit => return UiAction::Quit,
            UiCommand::Refresh => return UiAction::Refresh,
            UiCommand::Edit(field) => {
                self.begin_edit(field);
                return UiAction::None;
            }
            UiCommand::ScrollUp => {
                self.table_scroll = self.table_scroll.saturating_sub(SCROLL_STEP);
                return UiAction::None;
            }
            UiCommand::ScrollDown => {
                let rows = self
                    .model
                    .as_ref()
                    .and_then(|m| m.table.as_ref())
                    .map_or(0, |t| t.rows.len());
                self.table_scroll = (self.table_scroll + SCROLL_STEP).min(rows.saturating_sub(1));
                return UiAction::None;
            }
            UiCommand::ToggleData => s.hide_data = !s.hide_data,
            UiCommand::ToggleBalanceSheet => s.hide_balance_sheet = !s.hide_balance_sheet,
            UiCommand::ToggleCompare => s.compare = !s.compare,
            UiCommand::NextChartColumn | UiCommand::PrevChartColumn => {
                let forward = cmd == UiCommand::NextChartColumn;
                if s.compare {
                    s.compare_column = s.compare_column.cycle(&COMPARE_COLUMNS, forward);
                } else {
                    s.chart_column = s.chart_column.cycle(&CHART_COLUMNS, forward);
                }
            }
            UiCommand::ToggleTableColumn(column) => s.toggle_table_column(column),
        }
        self.rebuild();
        UiAction::SelectionsChanged
    }

    pub fn begin_edit(&mut self, field: EditField) {
        self.edit_buffer = self.field_value(field).to_string();
        self.editing = Some(field);
    }

    fn field_value(&self, field: EditField) -> &str {
        match field {
            EditField::Ticker => &self.selections.ticker,
            EditField::StartDate => &self.selections.start_date,
            EditField::EndDate => &self.selections.end_date,
            EditField::CompareTickers => &self.selections.compare_tickers,
        }
    }

    pub fn apply_edit(&mut self, cmd: EditCommand) -> UiAction {
        let Some(field) = self.editing else {
            return UiAction::None;
        };
        match cmd {
            EditCommand::Insert(c) => {
                self.edit_buffer.push(c);
                UiAction::None
            }
            EditCommand::Backspace => {
                self.edit_buffer.pop();
                UiAction::None
            }
            EditCommand::Cancel => {
                self.editing = None;
                self.edit_buffer.clear();
                UiAction::None
            }
            EditCommand::Commit => {
                self.editing = None;
                let value = std::mem::take(&mut self.edit_buffer);
                if value == self.field_value(field) {
                    return UiAction::None;
                }
                let s = &mut self.selections;
                match field {
                    EditField::Ticker => s.ticker = value,
                    EditField::StartDate => s.start_date = value,
                    EditField::EndDate => s.end_date = value,
                    EditField::CompareTickers => s.compare_tickers = value,
                }
                self.rebuild();
                UiAction::SelectionsChanged
            }
        }
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, text: &str) {
    frame.render_widget(
        Paragraph::new(text.to_string())
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_model(frame: &mut Frame, area: Rect, state: &AppState, model: &RenderModel) {
    if model.is_failed() {
        frame.render_widget(ErrorPanel::new(&model.errors), area);
        return;
    }

    let mut constraints = Vec::new();
    if !model.errors.is_empty() {
        constraints.push(Constraint::Length(model.errors.len().min(4) as u16 + 2));
    }
    constraints.push(Constraint::Min(10));
    if model.table.is_some() {
        constraints.push(Constraint::Length(12));
    }
    if let Some(sheet) = &model.balance_sheet {
        constraints.push(Constraint::Length(sheet.rows.len().min(16) as u16 + 3));
    }
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut next = 0;
    let mut take = || {
        let a = areas[next];
        next += 1;
        a
    };

    if !model.errors.is_empty() {
        frame.render_widget(ErrorPanel::new(&model.errors), take());
    }
    let chart_area = take();
    match &model.chart {
        Some(view) => frame.render_widget(LineChart::from_view(view), chart_area),
        None => render_placeholder(frame, chart_area, "no chart"),
    }
    if let Some(table) = &model.table {
        frame.render_widget(DataTablePanel::new(table, state.table_scroll), take());
    }
    if let Some(sheet) = &model.balance_sheet {
        frame.render_widget(BalanceSheetPanel::new(sheet), take());
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(10),   // sidebar + dashboard
            Constraint::Length(5), // log
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    let ticker = state
        .model
        .as_ref()
        .map(|m| m.ticker.clone())
        .unwrap_or_else(|| state.selections.normalized_ticker());
    frame.render_widget(
        StatusBar {
            ticker: &ticker,
            refreshing: state.refreshing,
            refresh_count: state.refresh_count,
            last_updated: state.last_updated.as_deref(),
            compare: state.selections.compare,
        },
        outer[0],
    );

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(outer[1]);

    frame.render_widget(
        SidebarPanel::new(&state.selections, state.editing, &state.edit_buffer),
        body[0],
    );

    match &state.model {
        Some(model) => render_model(frame, body[1], state, model),
        None => render_placeholder(frame, body[1], "loading..."),
    }

    frame.render_widget(LogPanel::new(&state.log_messages), outer[2]);
    frame.render_widget(
        KeybindBar {
            editing: state.editing.is_some(),
        },
        outer[3],
    );
}
