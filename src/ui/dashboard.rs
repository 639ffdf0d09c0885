use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use crate::dashboard::{Selections, TableView};
use crate::input::EditField;
use crate::model::balance_sheet::{format_amount, BalanceSheet};
use crate::model::column::{Column, TABLE_COLUMNS};

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

pub fn format_cell(column: Column, value: Option<f64>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) if !v.is_finite() => "NaN".to_string(),
        Some(v) => match column {
            Column::Volume => format!("{:.0}", v),
            Column::Returns => format!("{:.4}", v),
            _ => format!("{:.2}", v),
        },
    }
}

pub struct StatusBar<'a> {
    pub ticker: &'a str,
    pub refreshing: bool,
    pub refresh_count: u64,
    pub last_updated: Option<&'a str>,
    pub compare: bool,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = if self.refreshing {
            Span::styled(" FETCHING ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        } else {
            Span::styled(" IDLE ", Style::default().fg(Color::Green))
        };
        let mode = if self.compare { "compare" } else { "single" };

        let line = Line::from(vec![
            Span::styled(
                " Stock Dashboard ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.ticker, Style::default().fg(Color::Cyan)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            state,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(mode, Style::default().fg(Color::Gray)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(
                    "refreshes: {}  updated: {}",
                    self.refresh_count,
                    self.last_updated.unwrap_or("---")
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

/// "User Input" sidebar: text fields and toggles.
pub struct SidebarPanel<'a> {
    selections: &'a Selections,
    editing: Option<EditField>,
    edit_buffer: &'a str,
}

impl<'a> SidebarPanel<'a> {
    pub fn new(selections: &'a Selections, editing: Option<EditField>, edit_buffer: &'a str) -> Self {
        Self {
            selections,
            editing,
            edit_buffer,
        }
    }

    fn field_line(&self, field: EditField, key: char, value: &'a str) -> Vec<Line<'a>> {
        let active = self.editing == Some(field);
        let (shown, style) = if active {
            (
                format!("{}_", self.edit_buffer),
                Style::default().fg(Color::Black).bg(Color::Yellow),
            )
        } else {
            (value.to_string(), Style::default().fg(Color::White))
        };
        vec![
            Line::from(vec![
                Span::styled(format!("[{}] ", key), Style::default().fg(Color::Yellow)),
                Span::styled(field.label(), Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(Span::styled(format!("    {}", shown), style)),
        ]
    }
}

fn toggle_line(key: char, label: &str, on: bool) -> Line<'static> {
    let mark = if on { "[x]" } else { "[ ]" };
    Line::from(vec![
        Span::styled(format!("[{}] ", key), Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("{} {}", mark, label),
            Style::default().fg(if on { Color::Green } else { Color::Gray }),
        ),
    ])
}

impl Widget for SidebarPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let s = self.selections;
        let mut lines = Vec::new();
        lines.extend(self.field_line(EditField::Ticker, 't', &s.ticker));
        lines.extend(self.field_line(EditField::StartDate, 's', &s.start_date));
        lines.extend(self.field_line(EditField::EndDate, 'e', &s.end_date));
        lines.push(Line::from(""));
        lines.push(toggle_line('d', "Hide Data", s.hide_data));
        lines.push(toggle_line('b', "Hide Balance Sheet", s.hide_balance_sheet));
        lines.push(toggle_line('c', "Compare Companies", s.compare));
        if s.compare {
            lines.extend(self.field_line(EditField::CompareTickers, 'm', &s.compare_tickers));
            lines.push(Line::from(vec![
                Span::styled("    compare: ", Style::default().fg(Color::DarkGray)),
                Span::styled(s.compare_column.label(), Style::default().fg(Color::Cyan)),
            ]));
        } else {
            lines.push(Line::from(vec![
                Span::styled("    plot: ", Style::default().fg(Color::DarkGray)),
                Span::styled(s.chart_column.label(), Style::default().fg(Color::Cyan)),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Columns",
            Style::default().fg(Color::DarkGray),
        )));
        for (i, col) in TABLE_COLUMNS.iter().enumerate() {
            let on = s.table_columns.contains(col);
            let key = char::from(b'1' + i as u8);
            lines.push(toggle_line(key, col.short_label(), on));
        }

        Paragraph::new(lines)
            .block(panel("User Input"))
            .render(area, buf);
    }
}

pub struct DataTablePanel<'a> {
    table: &'a TableView,
    scroll: usize,
}

impl<'a> DataTablePanel<'a> {
    pub fn new(table: &'a TableView, scroll: usize) -> Self {
        Self { table, scroll }
    }
}

impl Widget for DataTablePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!("Data ({} rows)", self.table.rows.len());
        if self.table.columns.is_empty() {
            Paragraph::new("no columns selected (1-8 to toggle)")
                .style(Style::default().fg(Color::DarkGray))
                .block(panel(&title))
                .render(area, buf);
            return;
        }

        let header = Row::new(
            std::iter::once(Cell::from("Date")).chain(
                self.table
                    .columns
                    .iter()
                    .map(|c| Cell::from(c.short_label())),
            ),
        )
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        let start = self.scroll.min(self.table.rows.len().saturating_sub(1));
        let rows = self.table.rows.iter().skip(start).map(|r| {
            let cells = std::iter::once(Cell::from(r.date.to_string())).chain(
                self.table
                    .columns
                    .iter()
                    .zip(r.values.iter())
                    .map(|(c, v)| Cell::from(format_cell(*c, *v))),
            );
            Row::new(cells)
        });

        let widths = std::iter::once(Constraint::Length(10))
            .chain(self.table.columns.iter().map(|_| Constraint::Min(9)))
            .collect::<Vec<_>>();

        Widget::render(
            Table::new(rows, widths)
                .header(header)
                .column_spacing(1)
                .block(panel(&title)),
            area,
            buf,
        );
    }
}

pub struct BalanceSheetPanel<'a> {
    sheet: &'a BalanceSheet,
}

impl<'a> BalanceSheetPanel<'a> {
    pub fn new(sheet: &'a BalanceSheet) -> Self {
        Self { sheet }
    }
}

impl Widget for BalanceSheetPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!("{} Balance Sheet", self.sheet.ticker);
        let header = Row::new(
            std::iter::once(Cell::from("")).chain(
                self.sheet
                    .periods
                    .iter()
                    .map(|p| Cell::from(p.to_string())),
            ),
        )
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        let rows = self.sheet.rows.iter().map(|r| {
            Row::new(
                std::iter::once(Cell::from(r.item.as_str())).chain(r.values.iter().map(|v| {
                    Cell::from(v.map(format_amount).unwrap_or_else(|| "-".to_string()))
                })),
            )
        });

        let widths = std::iter::once(Constraint::Min(24))
            .chain(self.sheet.periods.iter().map(|_| Constraint::Length(11)))
            .collect::<Vec<_>>();

        Widget::render(
            Table::new(rows, widths).header(header).block(panel(&title)),
            area,
            buf,
        );
    }
}

/// Error lines from the last refresh, shown in place of missing sections.
pub struct ErrorPanel<'a> {
    errors: &'a [String],
}

impl<'a> ErrorPanel<'a> {
    pub fn new(errors: &'a [String]) -> Self {
        Self { errors }
    }
}

impl Widget for ErrorPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = self
            .errors
            .iter()
            .map(|e| Line::from(Span::styled(e.as_str(), Style::default().fg(Color::Red))))
            .collect();
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel("Errors"))
            .render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(visible);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|m| {
                let color = if m.starts_with("[ERR]") {
                    Color::Red
                } else if m.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::Gray
                };
                Line::from(Span::styled(m.as_str(), Style::default().fg(color)))
            })
            .collect();

        Paragraph::new(lines).block(panel("Log")).render(area, buf);
    }
}

pub struct KeybindBar {
    pub editing: bool,
}

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
        let text = |t: &'static str| Span::styled(t, Style::default().fg(Color::DarkGray));
        let line = if self.editing {
            Line::from(vec![
                key(" [Enter]"),
                text(" apply  "),
                key("[Esc]"),
                text(" cancel  "),
                key("[Backspace]"),
                text(" delete"),
            ])
        } else {
            Line::from(vec![
                key(" [Q]"),
                text("uit  "),
                key("[U]"),
                text("pdate  "),
                key("[D]"),
                text("ata  "),
                key("[B]"),
                text("alance sheet  "),
                key("[C]"),
                text("ompare  "),
                key("[ ]"),
                text(" plot column  "),
                key("[1-8]"),
                text(" table columns  "),
                key("[PgUp/PgDn]"),
                text(" scroll"),
            ])
        };

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
