use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::iter::FusedIterator;

use chrono::{Datelike, NaiveDate};

use crate::{Date, Price, Product};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Products touching one calendar day, split by which of their dates falls on it.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Bucket<'a> {
    pub purchased: Vec<&'a Product>,
    pub target: Vec<&'a Product>,
}

static EMPTY_BUCKET: Bucket<'static> = Bucket::new();

impl<'a> Bucket<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            purchased: Vec::new(),
            target: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.purchased.is_empty() && self.target.is_empty()
    }

    /// Number of entries in both lists; a product listed twice counts twice.
    #[must_use]
    pub fn len(&self) -> usize {
        self.purchased.len() + self.target.len()
    }

    #[must_use]
    pub fn purchased_total(&self) -> Price {
        self.purchased.iter().map(|p| p.price).sum()
    }

    #[must_use]
    pub fn target_total(&self) -> Price {
        self.target.iter().map(|p| p.price).sum()
    }
}

/// Sparse mapping from calendar day to the products bought or planned on it.
#[derive(Debug, Default, Clone)]
pub struct DateIndex<'a>(HashMap<Date, Bucket<'a>>);

impl<'a> DateIndex<'a> {
    #[must_use]
    pub fn get(&self, date: Date) -> Option<&Bucket<'a>> {
        self.0.get(&date)
    }

    /// Like [`DateIndex::get`], but days without products yield an empty bucket.
    #[must_use]
    pub fn bucket(&self, date: Date) -> &Bucket<'a> {
        self.0.get(&date).unwrap_or(&EMPTY_BUCKET)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Date, &Bucket<'a>)> {
        self.0.iter().map(|(date, bucket)| (*date, bucket))
    }

    /// All indexed days in ascending order.
    #[must_use]
    pub fn dates(&self) -> Vec<Date> {
        let mut dates = self.0.keys().copied().collect::<Vec<_>>();
        dates.sort_unstable();
        dates
    }
}

/// Groups products by the calendar days of their purchase and target dates.
///
/// A product with both dates shows up twice: in the `purchased` list of its
/// purchase day and in the `target` list of its target day, even if that is the
/// same day.
pub fn build_date_index<'a>(products: impl IntoIterator<Item = &'a Product>) -> DateIndex<'a> {
    let mut index: HashMap<Date, Bucket<'a>> = HashMap::new();
    for product in products {
        if let Some(date) = product.purchase_date {
            index.entry(date).or_default().purchased.push(product);
        }
        if let Some(date) = product.target_date {
            index.entry(date).or_default().target.push(product);
        }
    }
    DateIndex(index)
}

#[must_use]
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Length of a month in the Gregorian calendar, or 0 for month numbers outside `1..=12`.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

/// Earliest year whose every day is a valid [`Date`].
#[must_use]
pub fn min_year() -> i32 {
    NaiveDate::MIN.year()
}

/// Latest year whose every day is a valid [`Date`].
#[must_use]
pub fn max_year() -> i32 {
    NaiveDate::MAX.year()
}

impl YearMonth {
    /// `None` for a month outside `1..=12` or a year outside
    /// [`min_year`]`..=`[`max_year`].
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        ((1..=12).contains(&month) && (min_year()..=max_year()).contains(&year))
            .then_some(Self { year, month })
    }

    #[must_use]
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.month
    }

    #[must_use]
    pub fn days(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        MONTH_NAMES[self.month as usize - 1]
    }

    /// Date of a day in this month, `None` past the end of the month.
    #[must_use]
    pub fn day(self, day: u32) -> Option<Date> {
        Date::from_ymd(self.year, self.month, day)
    }

    /// Weekday of the 1st with Sunday as 0.
    #[must_use]
    pub fn first_weekday(self) -> u32 {
        // Sakamoto's method, valid for any proleptic Gregorian year.
        const OFFSETS: [i64; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
        let year = i64::from(self.year) - i64::from(self.month < 3);
        let weekday = year + year.div_euclid(4) - year.div_euclid(100)
            + year.div_euclid(400)
            + OFFSETS[self.month as usize - 1]
            + 1;
        u32::try_from(weekday.rem_euclid(7)).unwrap_or_default()
    }

    #[must_use]
    pub fn contains(self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The following month, `None` after December of [`max_year`].
    #[must_use]
    pub fn next(self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year.checked_add(1)?, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// The preceding month, `None` before January of [`min_year`].
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        if self.month == 1 {
            Self::new(self.year.checked_sub(1)?, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    #[must_use]
    pub fn navigate(self, direction: Direction) -> Option<Self> {
        match direction {
            Direction::Previous => self.previous(),
            Direction::Next => self.next(),
        }
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name(), self.year)
    }
}

/// One day of a month grid.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'i, 'a> {
    pub day: u32,
    pub date: Date,
    pub is_today: bool,
    pub bucket: &'i Bucket<'a>,
}

/// A Sunday-first calendar page: leading blanks for the days of the previous
/// month, then one cell per day. There is no trailing padding.
///
/// Iterating does not consume the grid, every call to [`MonthGrid::iter`]
/// starts again from the first placeholder.
#[derive(Debug, Clone, Copy)]
pub struct MonthGrid<'i, 'a> {
    month: YearMonth,
    index: &'i DateIndex<'a>,
    today: Date,
}

#[must_use]
pub fn month_grid<'i, 'a>(
    month: YearMonth,
    index: &'i DateIndex<'a>,
    today: Date,
) -> MonthGrid<'i, 'a> {
    MonthGrid {
        month,
        index,
        today,
    }
}

impl<'i, 'a> MonthGrid<'i, 'a> {
    #[must_use]
    pub fn month(&self) -> YearMonth {
        self.month
    }

    #[must_use]
    pub fn iter(&self) -> GridIter<'i, 'a> {
        GridIter {
            grid: *self,
            leading: self.month.first_weekday(),
            position: 0,
        }
    }
}

impl<'i, 'a> IntoIterator for MonthGrid<'i, 'a> {
    type Item = Option<Cell<'i, 'a>>;
    type IntoIter = GridIter<'i, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'i, 'a> IntoIterator for &MonthGrid<'i, 'a> {
    type Item = Option<Cell<'i, 'a>>;
    type IntoIter = GridIter<'i, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct GridIter<'i, 'a> {
    grid: MonthGrid<'i, 'a>,
    leading: u32,
    position: u32,
}

impl GridIter<'_, '_> {
    fn total(&self) -> u32 {
        self.leading + self.grid.month.days()
    }
}

impl<'i, 'a> Iterator for GridIter<'i, 'a> {
    type Item = Option<Cell<'i, 'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.total() {
            return None;
        }
        let position = self.position;
        self.position += 1;
        if position < self.leading {
            return Some(None);
        }
        let day = position - self.leading + 1;
        let date = self.grid.month.day(day)?;
        Some(Some(Cell {
            day,
            date,
            is_today: date == self.grid.today,
            bucket: self.grid.index.bucket(date),
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total() - self.position) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridIter<'_, '_> {}

impl FusedIterator for GridIter<'_, '_> {}

/// What the calendar is showing: the displayed month and, while a day's detail
/// view is open, the selected day.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CalendarState {
    displayed: YearMonth,
    selected: Option<Date>,
}

impl CalendarState {
    #[must_use]
    pub fn new(displayed: YearMonth) -> Self {
        Self {
            displayed,
            selected: None,
        }
    }

    /// Starts on the month containing `today`.
    #[must_use]
    pub fn at(today: Date) -> Self {
        Self::new(YearMonth::of(today))
    }

    #[must_use]
    pub fn displayed(&self) -> YearMonth {
        self.displayed
    }

    #[must_use]
    pub fn selected(&self) -> Option<Date> {
        self.selected
    }

    pub fn show(&mut self, month: YearMonth) {
        self.displayed = month;
    }

    /// Moves one month; stays put at the edge of the representable range.
    pub fn navigate(&mut self, direction: Direction) -> YearMonth {
        if let Some(month) = self.displayed.navigate(direction) {
            self.displayed = month;
        }
        self.displayed
    }

    pub fn jump_to_today(&mut self, today: Date) -> YearMonth {
        self.displayed = YearMonth::of(today);
        self.displayed
    }

    /// Selects `date` and returns its bucket, empty if nothing happened that day.
    pub fn click<'i, 'a>(&mut self, date: Date, index: &'i DateIndex<'a>) -> &'i Bucket<'a> {
        self.selected = Some(date);
        index.bucket(date)
    }

    pub fn close(&mut self) {
        self.selected = None;
    }
}

/// Counters shown above the calendar.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct CalendarStats {
    pub purchased: usize,
    pub planned: usize,
    pub purchased_this_month: usize,
}

impl CalendarStats {
    pub fn of<'a>(products: impl IntoIterator<Item = &'a Product>, month: YearMonth) -> Self {
        products
            .into_iter()
            .fold(CalendarStats::default(), |mut stats, product| {
                if let Some(date) = product.purchase_date {
                    stats.purchased += 1;
                    if month.contains(date) {
                        stats.purchased_this_month += 1;
                    }
                }
                if product.target_date.is_some() {
                    stats.planned += 1;
                }
                stats
            })
    }

    #[must_use]
    pub fn dated(&self) -> usize {
        self.purchased + self.planned
    }
}

#[cfg(test)]
mod test {
    use crate::calendar::{
        CalendarState, CalendarStats, Direction, YearMonth, build_date_index, days_in_month,
        is_leap_year, max_year, min_year, month_grid,
    };
    use crate::{Date, Price, Product};

    fn date(year: i32, month: u32, day: u32) -> Date {
        Date::from_ymd(year, month, day).unwrap()
    }

    fn month(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    fn scenario() -> Vec<Product> {
        vec![
            Product {
                purchase_date: Some(date(2024, 3, 15)),
                ..Product::new("1", "Headphones", 100)
            },
            Product {
                target_date: Some(date(2024, 3, 15)),
                ..Product::new("2", "Novel", 50)
            },
            Product {
                target_date: Some(date(2024, 3, 20)),
                ..Product::new("3", "Running shoes", 75)
            },
        ]
    }

    #[test]
    fn test_example_scenario() {
        let products = scenario();
        let index = build_date_index(&products);
        assert_eq!(index.len(), 2);
        assert_eq!(index.dates(), vec![date(2024, 3, 15), date(2024, 3, 20)]);

        let fifteenth = index.get(date(2024, 3, 15)).unwrap();
        assert_eq!(ids(&fifteenth.purchased), vec!["1"]);
        assert_eq!(ids(&fifteenth.target), vec!["2"]);

        let twentieth = index.get(date(2024, 3, 20)).unwrap();
        assert!(twentieth.purchased.is_empty());
        assert_eq!(ids(&twentieth.target), vec!["3"]);

        let mut state = CalendarState::new(month(2024, 3));
        let bucket = state.click(date(2024, 3, 15), &index);
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.purchased_total(), Price::from(100));
        assert_eq!(bucket.target_total(), Price::from(50));
        assert_eq!(state.selected(), Some(date(2024, 3, 15)));
    }

    #[test]
    fn test_both_dates_same_day() {
        let products = vec![Product {
            purchase_date: Some(date(2024, 5, 1)),
            target_date: Some(date(2024, 5, 1)),
            ..Product::new("a", "Lamp", 20)
        }];
        let index = build_date_index(&products);
        assert_eq!(index.len(), 1);
        let bucket = index.bucket(date(2024, 5, 1));
        assert_eq!(ids(&bucket.purchased), vec!["a"]);
        assert_eq!(ids(&bucket.target), vec!["a"]);
    }

    #[test]
    fn test_both_dates_different_days() {
        let products = vec![Product {
            purchase_date: Some(date(2024, 5, 3)),
            target_date: Some(date(2024, 4, 28)),
            ..Product::new("a", "Lamp", 20)
        }];
        let index = build_date_index(&products);
        assert_eq!(index.len(), 2);
        assert_eq!(ids(&index.bucket(date(2024, 5, 3)).purchased), vec!["a"]);
        assert!(index.bucket(date(2024, 5, 3)).target.is_empty());
        assert_eq!(ids(&index.bucket(date(2024, 4, 28)).target), vec!["a"]);
    }

    #[test]
    fn test_every_dated_product_is_indexed() {
        let products = (1..=40)
            .map(|i| Product {
                purchase_date: (i % 3 == 0).then(|| date(2024, 1, 1 + i % 28)),
                target_date: (i % 2 == 0).then(|| date(2024, 2, 1 + i % 29)),
                ..Product::new(i.to_string().as_str(), "Item", i64::from(i))
            })
            .collect::<Vec<_>>();
        let index = build_date_index(&products);
        for product in &products {
            if let Some(day) = product.purchase_date {
                assert!(index.bucket(day).purchased.contains(&product));
            }
            if let Some(day) = product.target_date {
                assert!(index.bucket(day).target.contains(&product));
            }
        }
        let entries = index.iter().map(|(_, b)| b.len()).sum::<usize>();
        assert_eq!(entries, 13 + 20);
    }

    #[test]
    fn test_undated_products_are_not_indexed() {
        let products = vec![Product::new("x", "Chair", 10)];
        assert!(build_date_index(&products).is_empty());
        assert!(build_date_index(&[]).is_empty());
    }

    #[test]
    fn test_missing_day_yields_empty_bucket() {
        let products = scenario();
        let index = build_date_index(&products);
        let bucket = index.bucket(date(2024, 3, 16));
        assert!(bucket.is_empty());
        assert_eq!(bucket.purchased_total(), Price::default());
        assert!(index.get(date(2024, 3, 16)).is_none());
    }

    #[test]
    fn test_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert!(is_leap_year(-4));
        assert!(!is_leap_year(2100));
    }

    #[test]
    fn test_days_in_month() {
        let lengths = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for (m, length) in (1..=12).zip(lengths) {
            assert_eq!(days_in_month(2023, m), length, "month {m}");
        }
        assert_eq!(days_in_month(2023, 0), 0);
        assert_eq!(days_in_month(2023, 13), 0);
    }

    #[test]
    fn test_first_weekday_matches_chrono() {
        let mut current = month(1899, 1);
        while current.year() < 2101 {
            assert_eq!(
                current.first_weekday(),
                current.day(1).unwrap().weekday_from_sunday(),
                "{current}"
            );
            current = current.next().unwrap();
        }
    }

    #[test]
    fn test_month_grid_layout() {
        let index = build_date_index(&[]);
        let today = date(2030, 1, 1);

        // March 2024 starts on a Friday
        let grid = month_grid(month(2024, 3), &index, today);
        let cells = grid.iter().collect::<Vec<_>>();
        assert_eq!(cells.len(), 5 + 31);
        assert!(cells[..5].iter().all(Option::is_none));
        let days = cells[5..]
            .iter()
            .map(|c| c.as_ref().unwrap().day)
            .collect::<Vec<_>>();
        assert_eq!(days, (1..=31).collect::<Vec<_>>());

        // September 2024 starts on a Sunday
        let grid = month_grid(month(2024, 9), &index, today);
        assert!(grid.iter().next().unwrap().is_some());
        assert_eq!(grid.iter().count(), 30);

        let grid = month_grid(month(2024, 2), &index, today);
        assert_eq!(grid.iter().flatten().count(), 29);
        assert_eq!(grid.iter().filter(Option::is_none).count(), 4);
    }

    #[test]
    fn test_month_grid_restarts() {
        let products = scenario();
        let index = build_date_index(&products);
        let grid = month_grid(month(2024, 3), &index, date(2024, 3, 20));
        let first = grid.iter().flatten().map(|c| c.day).collect::<Vec<_>>();
        let second = grid.into_iter().flatten().map(|c| c.day).collect::<Vec<_>>();
        assert_eq!(first, second);
    }

    #[test]
    fn test_month_grid_cells() {
        let products = scenario();
        let index = build_date_index(&products);
        let grid = month_grid(month(2024, 3), &index, date(2024, 3, 20));
        let cells = grid.iter().flatten().collect::<Vec<_>>();

        let today = cells.iter().filter(|c| c.is_today).collect::<Vec<_>>();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, date(2024, 3, 20));

        let fifteenth = &cells[14];
        assert_eq!(fifteenth.date, date(2024, 3, 15));
        assert_eq!(ids(&fifteenth.bucket.purchased), vec!["1"]);
        assert_eq!(ids(&fifteenth.bucket.target), vec!["2"]);
        assert!(cells[0].bucket.is_empty());

        let elsewhere = month_grid(month(2024, 4), &index, date(2024, 3, 20));
        assert!(elsewhere.iter().flatten().all(|c| !c.is_today && c.bucket.is_empty()));
    }

    #[test]
    fn test_navigation() {
        assert_eq!(month(2024, 12).navigate(Direction::Next), Some(month(2025, 1)));
        assert_eq!(month(2024, 1).navigate(Direction::Previous), Some(month(2023, 12)));
        assert_eq!(month(2024, 6).next(), Some(month(2024, 7)));

        let mut current = month(1999, 1);
        for _ in 0..30 {
            assert_eq!(current.next().and_then(YearMonth::previous), Some(current));
            assert_eq!(current.previous().and_then(YearMonth::next), Some(current));
            current = current.next().unwrap();
        }
    }

    #[test]
    fn test_navigation_before_year_one() {
        let mut current = month(2, 3);
        for _ in 0..40 {
            current = current.previous().unwrap();
        }
        assert_eq!(current, month(-2, 11));
        assert_eq!(current.days(), 30);
    }

    #[test]
    fn test_year_range() {
        assert!(YearMonth::new(i32::MAX, 12).is_none());
        assert!(YearMonth::new(i32::MIN, 1).is_none());
        assert!(YearMonth::new(300_000, 3).is_none());
        assert!(YearMonth::new(max_year() + 1, 1).is_none());
        assert!(YearMonth::new(min_year() - 1, 12).is_none());

        let last = month(max_year(), 12);
        assert_eq!(last.next(), None);
        assert_eq!(last.previous(), Some(month(max_year(), 11)));
        let first = month(min_year(), 1);
        assert_eq!(first.previous(), None);
        assert_eq!(first.next(), Some(month(min_year(), 2)));

        let mut state = CalendarState::new(last);
        assert_eq!(state.navigate(Direction::Next), last);
        let mut state = CalendarState::new(first);
        assert_eq!(state.navigate(Direction::Previous), first);
    }

    #[test]
    fn test_month_grid_at_year_range_edges() {
        let index = build_date_index(&[]);
        let today = date(2024, 3, 9);
        for current in [
            month(min_year(), 1),
            month(min_year(), 2),
            month(max_year(), 2),
            month(max_year(), 12),
        ] {
            let grid = month_grid(current, &index, today);
            let cells = grid.iter().collect::<Vec<_>>();
            let leading = current.first_weekday() as usize;
            assert_eq!(cells.len(), leading + current.days() as usize, "{current}");
            assert!(cells[..leading].iter().all(Option::is_none), "{current}");
            assert_eq!(cells.iter().flatten().count(), current.days() as usize, "{current}");
            assert_eq!(grid.iter().len(), cells.len());
        }
    }

    #[test]
    fn test_state_transitions() {
        let products = scenario();
        let index = build_date_index(&products);
        let mut state = CalendarState::at(date(2024, 3, 9));
        assert_eq!(state.displayed(), month(2024, 3));

        assert_eq!(state.navigate(Direction::Next), month(2024, 4));
        assert_eq!(state.navigate(Direction::Previous), month(2024, 3));

        assert!(state.click(date(2024, 3, 1), &index).is_empty());
        assert_eq!(state.selected(), Some(date(2024, 3, 1)));
        state.close();
        assert_eq!(state.selected(), None);

        state.show(month(1990, 7));
        assert_eq!(state.jump_to_today(date(2024, 3, 9)), month(2024, 3));
    }

    #[test]
    fn test_calendar_stats() {
        let mut products = scenario();
        products.push(Product {
            purchase_date: Some(date(2024, 2, 10)),
            target_date: Some(date(2024, 2, 1)),
            ..Product::new("4", "Desk", 300)
        });
        let stats = CalendarStats::of(&products, month(2024, 3));
        assert_eq!(
            stats,
            CalendarStats {
                purchased: 2,
                planned: 3,
                purchased_this_month: 1,
            }
        );
        assert_eq!(stats.dated(), 5);
    }

    #[test]
    fn test_display() {
        assert_eq!(month(2024, 3).to_string(), "March 2024");
        assert!(YearMonth::new(2024, 0).is_none());
        assert!(YearMonth::new(2024, 13).is_none());
    }
}
