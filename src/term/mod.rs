mod calendar;
mod command;
mod detail;
mod editor;
mod model;
mod style;

use std::fmt::Display;

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{Event, KeyCode, KeyModifiers};
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::text::Text;
use ratatui::widgets::{Block, Clear, Widget};
use wishes::calendar::{Direction, YearMonth, build_date_index};
use wishes::parse::parse_month;
use wishes::store::JsonStore;
use wishes::{Currency, Date};

use crate::settings::Settings;
use crate::term::calendar::Calendar;
use crate::term::command::{CommandLine, Submit};
use crate::term::detail::{Detail, nth_product};
use crate::term::editor::run_editor;
use crate::term::model::Model;
use crate::term::style::Palette;

const COMPLETIONS: &[&str] = &[
    "month prev",
    "month next",
    "month today",
    "month",
    "today",
    "day",
    "open",
    "edit",
    "reload",
    "q",
];

pub fn run_term(store: JsonStore, settings: &Settings, today: Date) -> std::io::Result<()> {
    let model = Model::load(store)?;
    let palette = Palette::of(settings.theme);
    let calendar = Calendar::new(model, today, palette);
    let mut terminal = ratatui::init();
    let result = App::new(calendar, today, settings.currency, palette).run(&mut terminal);
    ratatui::restore();
    result
}

pub(crate) trait View {
    fn render(&mut self, area: Rect, buf: &mut Buffer);

    #[must_use]
    fn handle_event(&mut self, e: Event) -> Option<Control>;

    fn command(&mut self, command: &str, args: &[&str]) -> Result<(), UnknownCommand>;
}

#[derive(Eq, PartialEq)]
enum Focus {
    Input,
    View,
    Detail,
    Alert,
}

#[must_use]
pub(crate) enum Control {
    Quit,
    Edit,
    Reload,
    Open,
    Close,
    /// Position of the product within the open day
    Toggle(usize),
    Alert(String),
}

struct Error(String);

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error(s)
    }
}

impl From<std::io::Error> for Error {
    fn from(s: std::io::Error) -> Self {
        Error(s.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct App {
    focus: Focus,
    command: CommandLine,
    calendar: Calendar,
    detail: Option<Detail>,
    today: Date,
    currency: Currency,
    palette: Palette,
    alert: Alert,
}

impl App {
    fn new(calendar: Calendar, today: Date, currency: Currency, palette: Palette) -> Self {
        Self {
            focus: Focus::View,
            command: CommandLine::new(COMPLETIONS),
            calendar,
            detail: None,
            today,
            currency,
            palette,
            alert: Alert::new(),
        }
    }

    /// Moves "today" forward when the session outlives a midnight.
    fn set_today(&mut self, today: Date) {
        if today != self.today {
            log::debug!("Today is now {today}");
            self.today = today;
            self.calendar.set_today(today);
        }
    }

    fn run(&mut self, terminal: &mut ratatui::DefaultTerminal) -> std::io::Result<()> {
        loop {
            self.set_today(Date::today());
            terminal.draw(|frame| self.draw(frame))?;
            let Some(control) = self.handle_event(&event::read()?) else {
                continue;
            };
            if let Control::Quit = control {
                break;
            }
            if let Control::Edit = control {
                run_editor(terminal, self.calendar.path())?;
            }
            if let Err(e) = self.apply(control) {
                self.show_alert(e.0);
            }
        }
        Ok(())
    }

    fn apply(&mut self, control: Control) -> Result<(), Error> {
        match control {
            Control::Quit => {}
            Control::Edit | Control::Reload => {
                let model = self.calendar.model().reloaded()?;
                self.calendar.reload(model);
            }
            Control::Open => {
                let date = self.calendar.open();
                self.detail = Some(Detail::new(date));
                self.focus = Focus::Detail;
            }
            Control::Close => {
                self.calendar.close();
                self.detail = None;
                self.focus = Focus::View;
            }
            Control::Toggle(n) => self.toggle(n)?,
            Control::Alert(message) => self.show_alert(message),
        }
        Ok(())
    }

    fn show_alert(&mut self, message: String) {
        log::warn!("{message}");
        self.alert = Alert::from(message);
        self.focus = Focus::Alert;
    }

    fn toggle(&mut self, n: usize) -> Result<(), Error> {
        let Some(date) = self.calendar.selected() else {
            return Ok(());
        };
        let id = {
            let index = build_date_index(self.calendar.model().products());
            let Some(product) = nth_product(index.bucket(date), n) else {
                return Ok(());
            };
            product.id.clone()
        };
        self.calendar.model_mut().toggle_status(&id)?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let view_area = if let Focus::Input = self.focus {
            let [input_area, rest] =
                Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(frame.area());
            self.command.draw(input_area, frame, self.palette.border);
            rest
        } else {
            frame.area()
        };

        self.calendar.render(view_area, frame.buffer_mut());

        if let Some(detail) = &mut self.detail {
            let index = build_date_index(self.calendar.model().products());
            let bucket = index.bucket(detail.date());
            detail.draw(
                view_area,
                frame.buffer_mut(),
                bucket,
                self.currency,
                self.palette,
            );
        }

        if let Focus::Alert = self.focus {
            self.alert.draw(frame.area(), frame.buffer_mut(), self.palette);
        }
    }

    fn handle_event(&mut self, event: &Event) -> Option<Control> {
        if let Event::Key(key) = event
            && key.is_press()
            && key.code == KeyCode::Char('c')
            && key.modifiers == KeyModifiers::CONTROL
        {
            return Some(Control::Quit);
        }
        match self.focus {
            Focus::Input => match self.command.handle_event(event)? {
                Submit::Command(command) => {
                    self.focus = if self.detail.is_some() {
                        Focus::Detail
                    } else {
                        Focus::View
                    };
                    let mut iter = command.split_whitespace();
                    if let Some(command) = iter.next() {
                        let args = iter.collect::<Vec<&str>>();
                        return self
                            .handle_command(command, &args)
                            .unwrap_or_else(|e| Some(Control::Alert(e.0)));
                    }
                }
                Submit::Hide => {
                    self.focus = if self.detail.is_some() {
                        Focus::Detail
                    } else {
                        Focus::View
                    };
                }
            },
            Focus::View => {
                if let Event::Key(key) = event
                    && key.code == KeyCode::Char(':')
                    && key.is_press()
                {
                    self.focus = Focus::Input;
                    return None;
                }
                return self.calendar.handle_event(event.clone());
            }
            Focus::Detail => {
                if let Event::Key(key) = event
                    && key.code == KeyCode::Char(':')
                    && key.is_press()
                {
                    self.focus = Focus::Input;
                    return None;
                }
                let len = match (&self.detail, self.calendar.selected()) {
                    (Some(_), Some(date)) => {
                        build_date_index(self.calendar.model().products())
                            .bucket(date)
                            .len()
                    }
                    _ => 0,
                };
                return self.detail.as_mut()?.handle_event(event, len);
            }
            Focus::Alert => {
                if let Event::Key(key) = event
                    && key.is_press()
                    && matches!(key.code, KeyCode::Enter | KeyCode::Esc)
                {
                    self.focus = if self.detail.is_some() {
                        Focus::Detail
                    } else {
                        Focus::View
                    };
                }
            }
        }
        None
    }

    fn handle_command(&mut self, command: &str, args: &[&str]) -> Result<Option<Control>, Error> {
        match command {
            "q" | "quit" => Ok(Some(Control::Quit)),
            "edit" => Ok(Some(Control::Edit)),
            "reload" => Ok(Some(Control::Reload)),
            "open" => Ok(Some(Control::Open)),
            "month" => {
                let month = match *args {
                    ["prev"] => {
                        self.calendar.navigate(Direction::Previous);
                        return Ok(None);
                    }
                    ["next"] => {
                        self.calendar.navigate(Direction::Next);
                        return Ok(None);
                    }
                    ["today"] | [] => {
                        self.calendar.jump_to_today();
                        return Ok(None);
                    }
                    [text] if text.contains('-') => parse_month(text)
                        .ok_or_else(|| format!("Expected a month as YYYY-MM, got {text}"))?,
                    [month] => {
                        let month = month
                            .parse::<u32>()
                            .map_err(|err| format!("Failed to parse month: {err}"))?;
                        YearMonth::new(self.today.year(), month)
                            .ok_or_else(|| format!("No month {month}"))?
                    }
                    [month, year] => {
                        let month = month
                            .parse::<u32>()
                            .map_err(|err| format!("Failed to parse month: {err}"))?;
                        let year = year
                            .parse::<i32>()
                            .map_err(|err| format!("Failed to parse year: {err}"))?;
                        YearMonth::new(year, month)
                            .ok_or_else(|| format!("No month {month} in year {year}"))?
                    }
                    _ => return Err(format!("Unknown args to `month`: {args:?}").into()),
                };
                self.calendar.show(month);
                Ok(None)
            }
            _ => self
                .calendar
                .command(command, args)
                .map(|()| None)
                .map_err(|_| format!("Unknown command: {command}").into()),
        }
    }
}

#[derive(Debug)]
pub struct UnknownCommand;

struct Alert {
    text: String,
}

impl From<String> for Alert {
    fn from(value: String) -> Self {
        Self { text: value }
    }
}

impl Alert {
    fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    fn draw(&self, area: Rect, buf: &mut Buffer, palette: Palette) {
        let block = Block::bordered()
            .title(" Error ")
            .title_alignment(Alignment::Center)
            .border_style(palette.border);
        let area = popup_area(area, 60, 20);
        Clear.render(area, buf);
        (&block).render(area, buf);
        let area = block.inner(area);
        let [message_area, _, button_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .flex(Flex::Center)
        .areas(area);
        let button = Text::from(" Dismiss ").style(palette.highlight);
        let button_area = h_center(button_area, button.width());
        button.render(button_area, buf);
        let message = Text::from(self.text.as_str());
        let message_area = h_center(message_area, message.width());
        message.render(message_area, buf);
    }
}

pub(crate) fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

fn h_center(area: Rect, width: usize) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(
        u16::try_from(width).unwrap_or(area.width),
    )])
    .flex(Flex::Center)
    .areas(area);
    area
}
