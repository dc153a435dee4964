use std::collections::VecDeque;

use ratatui::Frame;
use ratatui::crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

const HISTORY: usize = 32;

/// The `:` command line with history and completion.
pub struct CommandLine {
    input: Input,
    history: VecDeque<String>,
    history_position: Option<usize>,
    completions: &'static [&'static str],
    completion: Option<usize>,
}

pub enum Submit {
    Command(String),
    Hide,
}

impl CommandLine {
    pub fn new(completions: &'static [&'static str]) -> Self {
        Self {
            input: Input::default(),
            history: VecDeque::with_capacity(HISTORY),
            history_position: None,
            completions,
            completion: None,
        }
    }

    pub fn draw(&self, area: Rect, frame: &mut Frame, border: Style) {
        let width = area.width.max(3) - 3;
        let scroll = self.input.visual_scroll(width as usize);
        let mut line = vec![Span::from(":"), Span::from(self.input.value())];
        if let Some(rest) = self
            .completion()
            .and_then(|c| c.strip_prefix(self.input.value()))
        {
            line.push(Span::from(rest).style(Color::DarkGray));
        }
        Paragraph::new(Line::from(line))
            .scroll((0, u16::try_from(scroll).unwrap_or(u16::MAX)))
            .style(Color::Yellow)
            .block(Block::bordered().border_style(border))
            .render(area, frame.buffer_mut());

        // past the prompt and the left border
        let x = self.input.visual_cursor().max(scroll) - scroll + 2;
        frame.set_cursor_position((area.x + u16::try_from(x).unwrap_or(area.width), area.y + 1));
    }

    fn completion(&self) -> Option<&'static str> {
        self.completion.map(|i| self.completions[i])
    }

    fn candidates(&self) -> impl Iterator<Item = usize> + '_ {
        let value = self.input.value();
        self.completions
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.starts_with(value) && c.len() != value.len())
            .map(|(i, _)| i)
    }

    fn refresh_completion(&mut self) {
        self.completion = if self.input.value().is_empty() {
            None
        } else {
            self.candidates().next()
        };
    }

    /// Moves to the next completion matching the typed prefix.
    fn cycle_completion(&mut self) {
        let Some(current) = self.completion else {
            return;
        };
        let next = self
            .candidates()
            .find(|&i| i > current)
            .or_else(|| self.candidates().next());
        self.completion = next;
    }

    fn set_history(&mut self, position: usize) {
        self.history_position = Some(position);
        self.set_value(self.history[position].clone());
    }

    fn set_value(&mut self, value: String) {
        self.input = Input::new(value);
        self.refresh_completion();
    }

    fn reset(&mut self) -> String {
        self.history_position = None;
        self.completion = None;
        self.input.value_and_reset()
    }

    fn remember(&mut self, value: &str) {
        if self.history.back().is_some_and(|last| last == value) {
            return;
        }
        if self.history.len() == HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(value.to_owned());
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<Submit> {
        if let Event::Key(key) = event {
            if !key.is_press() {
                return None;
            }
            match key.code {
                KeyCode::Esc => {
                    self.reset();
                    return Some(Submit::Hide);
                }
                KeyCode::Up => {
                    if !self.history.is_empty() {
                        let position = self
                            .history_position
                            .unwrap_or(self.history.len())
                            .saturating_sub(1);
                        self.set_history(position);
                    }
                    return None;
                }
                KeyCode::Down => {
                    if let Some(position) = self.history_position {
                        let position = (position + 1).min(self.history.len() - 1);
                        self.set_history(position);
                    }
                    return None;
                }
                KeyCode::Tab => {
                    self.cycle_completion();
                    return None;
                }
                KeyCode::Right if self.input.visual_cursor() == self.input.value().len() => {
                    if let Some(completion) = self.completion() {
                        self.set_value(completion.to_owned());
                        return None;
                    }
                }
                KeyCode::Enter => {
                    let value = self.reset();
                    if value.trim().is_empty() {
                        return Some(Submit::Hide);
                    }
                    self.remember(&value);
                    return Some(Submit::Command(value));
                }
                _ => {}
            }
        }

        if let Some(changed) = self.input.handle_event(event)
            && changed.value
        {
            self.history_position = None;
            self.refresh_completion();
        }
        None
    }
}
