use std::fmt::{Display, Formatter, Result};

use anstyle::{AnsiColor, Color, Effects, Style};

use crate::calendar::{Bucket, CalendarStats, MonthGrid};
use crate::stats::Summary;
use crate::{Currency, Date, Product};

const DATE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightYellow)));
const PURCHASED: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
const TARGET: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlue)));
const TODAY: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::BrightMagenta)))
    .effects(Effects::BOLD);
const CATEGORY: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightCyan)));
const ADDITIONS: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack)));

const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

trait Format {
    fn format(&self, f: &mut Formatter<'_>, currency: Currency) -> Result;
}

/// A month page with purchased and planned counts per day.
pub struct MonthOutput<'i, 'a> {
    grid: MonthGrid<'i, 'a>,
    currency: Currency,
}

impl<'i, 'a> MonthOutput<'i, 'a> {
    #[must_use]
    pub fn new(grid: MonthGrid<'i, 'a>, currency: Currency) -> Self {
        Self { grid, currency }
    }
}

impl Display for MonthOutput<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "{}{}{}", DATE.render(), self.grid.month(), DATE.render_reset())?;
        writeln!(f, "{}", WEEKDAYS.map(|d| format!(" {d}")).join(" "))?;

        let cells = self.grid.iter().collect::<Vec<_>>();
        for week in cells.chunks(7) {
            let mut first = true;
            for cell in week {
                if first {
                    first = false;
                } else {
                    write!(f, " ")?;
                }
                let Some(cell) = cell else {
                    write!(f, "   ")?;
                    continue;
                };
                let style = if cell.is_today {
                    TODAY
                } else if !cell.bucket.purchased.is_empty() {
                    PURCHASED
                } else if !cell.bucket.target.is_empty() {
                    TARGET
                } else {
                    Style::new()
                };
                let marker = if cell.bucket.is_empty() { ' ' } else { '*' };
                write!(
                    f,
                    "{}{:>2}{}{marker}",
                    style.render(),
                    cell.day,
                    style.render_reset()
                )?;
            }
            writeln!(f)?;
        }

        for cell in self.grid.iter().flatten() {
            if cell.bucket.is_empty() {
                continue;
            }
            writeln!(f)?;
            (cell.date, cell.bucket).format(f, self.currency)?;
        }
        Ok(())
    }
}

/// Everything bought or planned on one day, with totals.
pub struct DayOutput<'i, 'a> {
    date: Date,
    bucket: &'i Bucket<'a>,
    currency: Currency,
}

impl<'i, 'a> DayOutput<'i, 'a> {
    #[must_use]
    pub fn new(date: Date, bucket: &'i Bucket<'a>, currency: Currency) -> Self {
        Self {
            date,
            bucket,
            currency,
        }
    }
}

impl Display for DayOutput<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        (self.date, self.bucket).format(f, self.currency)
    }
}

impl Format for (Date, &Bucket<'_>) {
    fn format(&self, f: &mut Formatter<'_>, currency: Currency) -> Result {
        let (date, bucket) = *self;
        write!(
            f,
            "{}* {} {date}{}",
            DATE.render(),
            date.into_inner().format("%A"),
            DATE.render_reset()
        )?;
        if bucket.is_empty() {
            writeln!(f)?;
            return writeln!(
                f,
                "{}No products for this day{}",
                ADDITIONS.render(),
                ADDITIONS.render_reset()
            );
        }
        writeln!(
            f,
            "{} -> {} products{}",
            ADDITIONS.render(),
            bucket.len(),
            ADDITIONS.render_reset()
        )?;
        if !bucket.purchased.is_empty() {
            writeln!(f, "Purchased ({})", bucket.purchased.len())?;
            for product in &bucket.purchased {
                write!(f, "  {}✓{} ", PURCHASED.render(), PURCHASED.render_reset())?;
                product.format(f, currency)?;
            }
        }
        if !bucket.target.is_empty() {
            writeln!(f, "Planned ({})", bucket.target.len())?;
            for product in &bucket.target {
                write!(f, "  {}○{} ", TARGET.render(), TARGET.render_reset())?;
                product.format(f, currency)?;
            }
        }
        write!(
            f,
            "{}Total spent: {}",
            ADDITIONS.render(),
            currency.format(bucket.purchased_total())
        )?;
        if !bucket.target.is_empty() {
            write!(f, ", planned: {}", currency.format(bucket.target_total()))?;
        }
        writeln!(f, "{}", ADDITIONS.render_reset())
    }
}

impl Format for &Product {
    fn format(&self, f: &mut Formatter<'_>, currency: Currency) -> Result {
        write!(
            f,
            "{} {} {}[{}]{}",
            self.name,
            currency.format(self.price),
            CATEGORY.render(),
            self.category,
            CATEGORY.render_reset()
        )?;
        if let Some(store) = &self.store {
            write!(f, " at {store}")?;
        }
        writeln!(f)?;
        if let Some(notes) = &self.notes {
            writeln!(f, "      {}{notes}{}", ADDITIONS.render(), ADDITIONS.render_reset())?;
        }
        Ok(())
    }
}

/// Filtered product list, one line per product.
pub struct ListOutput<'a> {
    products: &'a [&'a Product],
    currency: Currency,
}

impl<'a> ListOutput<'a> {
    #[must_use]
    pub fn new(products: &'a [&'a Product], currency: Currency) -> Self {
        Self { products, currency }
    }
}

impl Display for ListOutput<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for product in self.products {
            let (style, mark) = if product.is_purchased() {
                (PURCHASED, '✓')
            } else {
                (TARGET, '○')
            };
            write!(
                f,
                "{}{mark}{} {:<6} {:<6} ",
                style.render(),
                style.render_reset(),
                product.priority,
                product.id
            )?;
            product.format(f, self.currency)?;
        }
        let total = self.products.iter().map(|p| p.price).sum();
        writeln!(
            f,
            "{}{} products, {}{}",
            ADDITIONS.render(),
            self.products.len(),
            self.currency.format(total),
            ADDITIONS.render_reset()
        )
    }
}

pub struct SummaryOutput {
    summary: Summary,
    calendar: CalendarStats,
    currency: Currency,
}

impl SummaryOutput {
    #[must_use]
    pub fn new(summary: Summary, calendar: CalendarStats, currency: Currency) -> Self {
        Self {
            summary,
            calendar,
            currency,
        }
    }
}

impl Display for SummaryOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let Summary {
            total,
            pending,
            purchased,
            pending_value,
            purchased_value,
        } = self.summary;
        writeln!(f, "Products: {total}")?;
        writeln!(
            f,
            "{}Pending: {pending} ({}){}",
            TARGET.render(),
            self.currency.format(pending_value),
            TARGET.render_reset()
        )?;
        writeln!(
            f,
            "{}Purchased: {purchased} ({}){}",
            PURCHASED.render(),
            self.currency.format(purchased_value),
            PURCHASED.render_reset()
        )?;
        let CalendarStats {
            purchased,
            planned,
            purchased_this_month,
        } = self.calendar;
        writeln!(
            f,
            "{}With dates: {}, purchased: {purchased}, planned: {planned}, this month: {purchased_this_month}{}",
            ADDITIONS.render(),
            self.calendar.dated(),
            ADDITIONS.render_reset()
        )
    }
}
