/// Tool for paging through the date window
///
/// This module implements the habit_window MCP tool. It moves the window
/// (or re-anchors it) and renders every habit's completed and due days
/// across the visible dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{day_grid, day_headers, parse_day, DateWindow, DayHeader, HabitRow, Navigation};
use crate::storage::KeyValueSlot;
use crate::store::{HabitStore, StoreError};

/// Parameters for the window tool
#[derive(Debug, Default, Deserialize)]
pub struct WindowParams {
    /// Explicit anchor day; applied before `navigate`
    pub anchor: Option<String>,
    /// `back`, `forward` or `today`
    pub navigate: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WindowResponse {
    pub window: DateWindow,
    pub headers: Vec<DayHeader>,
    pub rows: Vec<HabitRow>,
    pub message: String,
}

/// Work out the new window from `current` and render the grid for it
pub fn habit_window<S: KeyValueSlot>(
    store: &HabitStore<S>,
    current: &DateWindow,
    params: WindowParams,
) -> Result<WindowResponse, StoreError> {
    let today = store.today();

    let mut window = *current;
    if let Some(anchor) = params.anchor.as_deref() {
        window.anchor = parse_day(anchor)?;
    }
    if let Some(navigation) = params.navigate.as_deref() {
        let navigation: Navigation = navigation.parse()?;
        window = window.navigate(navigation, today);
    }

    let dates = window.dates();
    let headers = day_headers(&dates, today);
    let rows = day_grid(store.habits(), &dates);
    let message = render(&window, &headers, &rows);

    Ok(WindowResponse {
        window,
        headers,
        rows,
        message,
    })
}

fn render(window: &DateWindow, headers: &[DayHeader], rows: &[HabitRow]) -> String {
    let name_width = rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(5);

    let mut out = format!(
        "📅 {} to {} (anchor {})\n",
        headers.first().map(|h| h.date.to_string()).unwrap_or_default(),
        headers.last().map(|h| h.date.to_string()).unwrap_or_default(),
        window.anchor
    );

    let months: String = headers
        .iter()
        .map(|h| {
            if h.starts_month {
                format!("{:<4}", month_abbrev(h.date))
            } else {
                "    ".to_string()
            }
        })
        .collect();
    out.push_str(&format!("{:width$} {}\n", "", months.trim_end(), width = name_width));

    let days: String = headers
        .iter()
        .map(|h| {
            if h.is_today {
                format!("[{:>2}]", h.date.day())
            } else {
                format!(" {:>2} ", h.date.day())
            }
        })
        .collect();
    out.push_str(&format!("{:width$} {}\n", "", days, width = name_width));

    if rows.is_empty() {
        out.push_str("\nNo habits yet.");
        return out;
    }

    for row in rows {
        let cells: String = row
            .cells
            .iter()
            .map(|cell| match (cell.completed, cell.due) {
                (true, _) => "  ✓ ",
                (false, true) => "  ◆ ",
                (false, false) => "  · ",
            })
            .collect();
        out.push_str(&format!("{:width$} {}\n", row.name, cells, width = name_width));
    }
    out.push_str("\n✓ done   ◆ due   [ ] today");
    out
}

fn month_abbrev(date: NaiveDate) -> String {
    date.format("%b").to_string()
}
