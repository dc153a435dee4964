use std::fmt::{Display, Formatter};

use chrono::{DateTime, FixedOffset};
use derive_more::{Add, AddAssign, From, Sum};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Date;

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Technology",
    "Home",
    "Clothing",
    "Books",
    "Sports",
    "Music",
    "Travel",
    "Food",
    "Health",
    "Other",
];

#[must_use]
pub fn is_known_category(category: &str, custom: &[String]) -> bool {
    DEFAULT_CATEGORIES
        .iter()
        .copied()
        .chain(custom.iter().map(String::as_str))
        .any(|known| known.eq_ignore_ascii_case(category))
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, From)]
pub struct ProductId(pub String);

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Add, AddAssign, Sum)]
pub struct Price(Decimal);

impl Price {
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    #[must_use]
    pub fn into_inner(self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl From<i64> for Price {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        })
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Status {
    #[default]
    Pending,
    Purchased,
}

impl Status {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Status::Pending => Status::Purchased,
            Status::Purchased => Status::Pending,
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Status::Pending => "pending",
            Status::Purchased => "purchased",
        })
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Cop,
    Usd,
    Eur,
    Gbp,
    Jpy,
}

impl Currency {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Cop | Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Currency::Cop => "COP",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
        }
    }

    fn decimals(self) -> u32 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    /// Formats an amount like `$1234.50 USD`.
    #[must_use]
    pub fn format(self, price: Price) -> String {
        let amount = price.into_inner().round_dp(self.decimals());
        let decimals = self.decimals() as usize;
        format!(
            "{}{amount:.decimals$} {}",
            self.symbol(),
            self.code()
        )
    }
}

/// A wishlist entry as handed over by the snapshot boundary.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub priority: Priority,
    pub notes: Option<String>,
    pub store: Option<String>,
    pub status: Status,
    pub date_added: Option<DateTime<FixedOffset>>,
    pub target_date: Option<Date>,
    pub purchase_date: Option<Date>,
}

impl Product {
    /// A pending, medium priority product in the `Other` category without dates.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: impl Into<Price>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: "Other".to_owned(),
            price: price.into(),
            priority: Priority::default(),
            notes: None,
            store: None,
            status: Status::default(),
            date_added: None,
            target_date: None,
            purchase_date: None,
        }
    }

    #[must_use]
    pub fn is_purchased(&self) -> bool {
        self.status == Status::Purchased
    }
}
