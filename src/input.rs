use crossterm::event::KeyCode;

use crate::model::column::{Column, TABLE_COLUMNS};

/// Text inputs the user can edit from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Ticker,
    StartDate,
    EndDate,
    CompareTickers,
}

impl EditField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ticker => "Single-Stock Ticker",
            Self::StartDate => "Start Date",
            Self::EndDate => "End Date",
            Self::CompareTickers => "Compare Tickers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    Refresh,
    ToggleData,
    ToggleBalanceSheet,
    ToggleCompare,
    NextChartColumn,
    PrevChartColumn,
    ToggleTableColumn(Column),
    Edit(EditField),
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    Insert(char),
    Backspace,
    Commit,
    Cancel,
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::F(5) => Some(UiCommand::Refresh),
        KeyCode::PageUp | KeyCode::Up => Some(UiCommand::ScrollUp),
        KeyCode::PageDown | KeyCode::Down => Some(UiCommand::ScrollDown),
        KeyCode::Char('[') => Some(UiCommand::PrevChartColumn),
        KeyCode::Char(']') => Some(UiCommand::NextChartColumn),
        KeyCode::Char(c @ '1'..='8') => {
            let idx = (*c as u8 - b'1') as usize;
            TABLE_COLUMNS.get(idx).map(|col| UiCommand::ToggleTableColumn(*col))
        }
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => Some(UiCommand::Quit),
            'u' => Some(UiCommand::Refresh),
            'd' => Some(UiCommand::ToggleData),
            'b' => Some(UiCommand::ToggleBalanceSheet),
            'c' => Some(UiCommand::ToggleCompare),
            't' => Some(UiCommand::Edit(EditField::Ticker)),
            's' => Some(UiCommand::Edit(EditField::StartDate)),
            'e' => Some(UiCommand::Edit(EditField::EndDate)),
            'm' => Some(UiCommand::Edit(EditField::CompareTickers)),
            _ => None,
        },
        _ => None,
    }
}

pub fn parse_edit_command(key_code: &KeyCode) -> Option<EditCommand> {
    match key_code {
        KeyCode::Enter => Some(EditCommand::Commit),
        KeyCode::Esc => Some(EditCommand::Cancel),
        KeyCode::Backspace => Some(EditCommand::Backspace),
        KeyCode::Char(c) if !c.is_control() => Some(EditCommand::Insert(*c)),
        _ => None,
    }
}
