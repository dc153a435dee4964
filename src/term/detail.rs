use ratatui::buffer::Buffer;
use ratatui::crossterm::event::{Event, KeyCode};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Padding, StatefulWidget, Widget};
use wishes::calendar::Bucket;
use wishes::{Currency, Date, Product};

use crate::term::Control;
use crate::term::popup_area;
use crate::term::style::{CATEGORY, DATE, NOTES, PURCHASED, Palette, TARGET};

/// Popup listing what was bought and what is planned on one day.
pub struct Detail {
    date: Date,
    /// Position among the day's products, purchased ones first
    selected: usize,
    state: ListState,
}

impl Detail {
    pub fn new(date: Date) -> Self {
        Self {
            date,
            selected: 0,
            state: ListState::default(),
        }
    }

    pub fn date(&self) -> Date {
        self.date
    }

    fn product_items<'a>(
        products: &[&'a Product],
        mark: &'static str,
        style: Style,
        currency: Currency,
    ) -> Vec<ListItem<'a>> {
        products
            .iter()
            .map(|product| {
                let mut first = vec![
                    Span::from(mark).style(style),
                    Span::from(" "),
                    Span::from(product.name.as_str()),
                    Span::from("  "),
                    Span::from(currency.format(product.price)),
                    Span::from("  "),
                    Span::from(format!("[{}]", product.category)).style(CATEGORY),
                    Span::from(format!("  {}", product.priority)),
                ];
                if let Some(store) = &product.store {
                    first.push(Span::from(format!("  at {store}")));
                }
                let mut lines = vec![Line::from(first)];
                if let Some(notes) = &product.notes {
                    lines.push(Line::from(format!("    {notes}")).style(NOTES));
                }
                ListItem::new(lines)
            })
            .collect()
    }

    pub fn draw(
        &mut self,
        area: Rect,
        buf: &mut Buffer,
        bucket: &Bucket<'_>,
        currency: Currency,
        palette: Palette,
    ) {
        let area = popup_area(area, 70, 60);
        Clear.render(area, buf);

        let title = Line::from(vec![Span::from(format!(
            " {} ",
            self.date.into_inner().format("%A, %-d %B %Y")
        ))
        .style(DATE)]);
        let mut totals = vec![Span::from(format!(
            " Spent {} ",
            currency.format(bucket.purchased_total())
        ))
        .style(PURCHASED)];
        if !bucket.target.is_empty() {
            totals.push(
                Span::from(format!("Planned {} ", currency.format(bucket.target_total())))
                    .style(TARGET),
            );
        }
        let block = Block::bordered()
            .title(title)
            .title_bottom(Line::from(totals))
            .title_alignment(Alignment::Center)
            .border_style(palette.border)
            .padding(Padding::horizontal(1));

        if bucket.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            Line::from("No products for this day")
                .style(NOTES)
                .alignment(Alignment::Center)
                .render(inner, buf);
            return;
        }

        self.selected = self.selected.min(bucket.len() - 1);
        let mut items = Vec::new();
        let mut positions = Vec::new();
        for (header, products, mark, style) in [
            ("Purchased", &bucket.purchased, "✓", PURCHASED),
            ("Planned", &bucket.target, "○", TARGET),
        ] {
            if products.is_empty() {
                continue;
            }
            let header = Line::from(format!("{header} ({})", products.len())).style(style);
            items.push(ListItem::new(header));
            for item in Self::product_items(products, mark, style, currency) {
                positions.push(items.len());
                items.push(item);
            }
        }
        self.state.select(positions.get(self.selected).copied());
        let list = List::new(items)
            .block(block)
            .highlight_style(palette.highlight);
        StatefulWidget::render(list, area, buf, &mut self.state);
    }

    /// `Space` flips the status of the highlighted product; the caller resolves it
    /// against the same day's products.
    pub fn handle_event(&mut self, e: &Event, len: usize) -> Option<Control> {
        let Event::Key(e) = e else {
            return None;
        };
        if !e.is_press() {
            return None;
        }
        match e.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => return Some(Control::Close),
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(len.saturating_sub(1));
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char(' ') if len > 0 => {
                return Some(Control::Toggle(self.selected.min(len - 1)));
            }
            _ => {}
        }
        None
    }
}

/// The day's products in the order the popup lists them.
pub fn nth_product<'a>(bucket: &Bucket<'a>, n: usize) -> Option<&'a Product> {
    bucket.purchased.iter().chain(&bucket.target).nth(n).copied()
}
