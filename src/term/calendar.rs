use std::path::Path;

use ratatui::buffer::Buffer;
use ratatui::crossterm::event::{Event, KeyCode};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use wishes::calendar::{
    CalendarState, CalendarStats, Cell, Direction, YearMonth, build_date_index, month_grid,
};
use wishes::{Date, Product};

use crate::term::model::Model;
use crate::term::style::{DATE, PURCHASED, Palette, TARGET, TODAY};
use crate::term::{Control, UnknownCommand, View};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const PREVIEW: usize = 10;

/// The month grid with a day cursor.
///
/// The cursor always lies inside the displayed month; moving it across a month edge
/// shows the neighbouring month.
pub struct Calendar {
    state: CalendarState,
    cursor: Date,
    today: Date,
    model: Model,
    palette: Palette,
}

impl Calendar {
    pub fn new(model: Model, today: Date, palette: Palette) -> Self {
        Self {
            state: CalendarState::at(today),
            cursor: today,
            today,
            model,
            palette,
        }
    }

    pub(crate) fn set_today(&mut self, today: Date) {
        self.today = today;
    }

    pub(crate) fn reload(&mut self, model: Model) {
        self.model = model;
    }

    pub(crate) fn model(&self) -> &Model {
        &self.model
    }

    pub(crate) fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub(crate) fn path(&self) -> &Path {
        self.model.path()
    }

    pub(crate) fn displayed(&self) -> YearMonth {
        self.state.displayed()
    }

    /// Keeps the day of month where possible, clamped to the length of the new month.
    fn place_cursor(&mut self, month: YearMonth) {
        let day = self.cursor.day().min(month.days());
        if let Some(date) = month.day(day) {
            self.cursor = date;
        }
    }

    pub(crate) fn show(&mut self, month: YearMonth) {
        self.state.show(month);
        self.place_cursor(month);
    }

    pub(crate) fn navigate(&mut self, direction: Direction) {
        let month = self.state.navigate(direction);
        self.place_cursor(month);
    }

    pub(crate) fn jump_to_today(&mut self) {
        self.state.jump_to_today(self.today);
        self.cursor = self.today;
    }

    pub(crate) fn select_day(&mut self, day: u32) -> bool {
        match self.displayed().day(day) {
            Some(date) => {
                self.cursor = date;
                true
            }
            None => false,
        }
    }

    fn move_cursor(&mut self, days: i64) {
        let Some(date) = self.cursor.add_days(days) else {
            return;
        };
        if !self.displayed().contains(date) {
            self.state.show(YearMonth::of(date));
        }
        self.cursor = date;
    }

    /// Selects the day under the cursor and returns it for the detail view.
    pub(crate) fn open(&mut self) -> Date {
        let index = build_date_index(self.model.products());
        let bucket = self.state.click(self.cursor, &index);
        log::debug!("Opened {} with {} products", self.cursor, bucket.len());
        self.cursor
    }

    pub(crate) fn close(&mut self) {
        self.state.close();
    }

    pub(crate) fn selected(&self) -> Option<Date> {
        self.state.selected()
    }

    fn render_cell(&self, cell: &Cell<'_, '_>, area: Rect, buf: &mut Buffer) {
        let border = if cell.date == self.cursor {
            self.palette.highlight
        } else if cell.is_today {
            TODAY
        } else {
            self.palette.border
        };
        let number = Span::from(format!("{:>2}", cell.day)).style(if cell.is_today {
            TODAY
        } else {
            DATE
        });
        let mut lines = Vec::new();
        if !cell.bucket.purchased.is_empty() {
            lines.push(count_line("●", cell.bucket.purchased.len(), PURCHASED));
        }
        if !cell.bucket.target.is_empty() {
            lines.push(count_line("○", cell.bucket.target.len(), TARGET));
        }
        lines.extend(
            cell.bucket
                .purchased
                .iter()
                .chain(&cell.bucket.target)
                .map(|p| Line::from(preview(p))),
        );
        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .border_style(border)
                    .title(number)
                    .title_alignment(Alignment::Right),
            )
            .render(area, buf);
    }
}

fn count_line(mark: &'static str, count: usize, style: Style) -> Line<'static> {
    Line::from(vec![
        Span::from(mark).style(style),
        Span::from(format!(" {count}")),
    ])
}

fn preview(product: &Product) -> String {
    let mut name = product.name.chars().take(PREVIEW).collect::<String>();
    if product.name.chars().count() > PREVIEW {
        name.push('…');
    }
    name
}

impl View for Calendar {
    fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let products = self.model.products();
        let index = build_date_index(products);
        let month = self.displayed();
        let grid = month_grid(month, &index, self.today);
        let CalendarStats {
            purchased,
            planned,
            purchased_this_month,
        } = CalendarStats::of(products, YearMonth::of(self.today));

        let title = Line::from(vec![
            Span::from(format!(" {month} ")).style(DATE),
            Span::from("● purchased ").style(PURCHASED),
            Span::from("○ planned ").style(TARGET),
        ]);
        let footer = Line::from(format!(
            " {purchased} purchased, {planned} planned, {purchased_this_month} this month "
        ));
        let block = Block::bordered()
            .title(title)
            .title_bottom(footer)
            .border_style(self.palette.border);
        let inner = block.inner(area);
        block.render(area, buf);

        let [header, body] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
        let columns: [Rect; 7] = Layout::horizontal([Constraint::Ratio(1, 7); 7]).areas(header);
        for (name, column) in WEEKDAYS.iter().zip(columns) {
            Line::from(*name)
                .style(self.palette.outside)
                .alignment(Alignment::Center)
                .render(column, buf);
        }

        let cells = grid.iter().collect::<Vec<_>>();
        let weeks = cells.chunks(7).collect::<Vec<_>>();
        let count = u32::try_from(weeks.len()).unwrap_or(1).max(1);
        let rows = Layout::vertical(vec![Constraint::Ratio(1, count); weeks.len()]).split(body);
        for (week, row) in weeks.iter().zip(rows.iter()) {
            let columns: [Rect; 7] =
                Layout::horizontal([Constraint::Ratio(1, 7); 7]).areas(*row);
            for (cell, column) in week.iter().zip(columns) {
                if let Some(cell) = cell {
                    self.render_cell(cell, column, buf);
                }
            }
        }
    }

    fn handle_event(&mut self, e: Event) -> Option<Control> {
        let Event::Key(e) = e else {
            return None;
        };
        if !e.is_press() {
            return None;
        }
        match e.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-7),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(7),
            KeyCode::Char('[') | KeyCode::PageUp => self.navigate(Direction::Previous),
            KeyCode::Char(']') | KeyCode::PageDown => self.navigate(Direction::Next),
            KeyCode::Home | KeyCode::Char('g') => {
                self.select_day(1);
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.select_day(self.displayed().days());
            }
            KeyCode::Char('t') => self.jump_to_today(),
            KeyCode::Enter => return Some(Control::Open),
            KeyCode::Char('e') => return Some(Control::Edit),
            _ => {}
        }
        None
    }

    fn command(&mut self, command: &str, args: &[&str]) -> Result<(), UnknownCommand> {
        let day = match (command, args) {
            ("today", []) => {
                self.jump_to_today();
                return Ok(());
            }
            ("day", [day]) => *day,
            (day, []) => day,
            _ => return Err(UnknownCommand),
        };
        let day = day.parse::<u32>().map_err(|_| UnknownCommand)?;
        if self.select_day(day) {
            Ok(())
        } else {
            Err(UnknownCommand)
        }
    }
}
