use std::fmt::{Display, Formatter};
use std::io::Read;
use std::str::FromStr;

use chrono::format::{Item, Numeric, Pad, Parsed};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::YearMonth;
use crate::{Currency, Date, Positioned, Price, Priority, Product, ProductId, Status};

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

#[derive(Debug, Error, Eq, PartialEq)]
pub enum RowError {
    #[error("Missing product name")]
    MissingName,
    #[error("Missing price")]
    MissingPrice,
    #[error("Price must not be negative, got {0}")]
    NegativePrice(Decimal),
    #[error("Unknown priority {0:?}, expected low, medium or high")]
    Priority(String),
    #[error("Unknown status {0:?}, expected pending or purchased")]
    Status(String),
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("Unknown currency {0:?}, expected COP, USD, EUR, GBP or JPY")]
pub struct CurrencyError(String);

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed product snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Many(RowErrors),
}

#[derive(Debug)]
pub struct RowErrors(pub Vec<Positioned<RowError>>);

impl Display for RowErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Encountered the following errors while reading products:")?;
        for Positioned { row, value } in &self.0 {
            write!(f, "\nInvalid product in row {row}: {value}")?;
        }
        Ok(())
    }
}

/// Product identifiers arrive either as integers or as strings.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for ProductId {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Number(n) => ProductId(n.to_string()),
            RawId::Text(s) => ProductId(s),
        }
    }
}

impl From<&ProductId> for RawId {
    fn from(value: &ProductId) -> Self {
        match value.0.parse::<i64>() {
            Ok(n) if n.to_string() == value.0 => RawId::Number(n),
            _ => RawId::Text(value.0.clone()),
        }
    }
}

/// One row of the product table, as stored by the hosted backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProduct {
    pub id: RawId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "dateAdded")]
    pub created_at: Option<String>,
    #[serde(default, alias = "targetDate")]
    pub target_date: Option<String>,
    #[serde(default, alias = "purchaseDate")]
    pub purchase_date: Option<String>,
}

impl FromStr for Priority {
    type Err = RowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "baja" => Ok(Priority::Low),
            "medium" | "media" => Ok(Priority::Medium),
            "high" | "alta" => Ok(Priority::High),
            _ => Err(RowError::Priority(s.to_owned())),
        }
    }
}

impl FromStr for Status {
    type Err = RowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendiente" => Ok(Status::Pending),
            "purchased" | "comprado" => Ok(Status::Purchased),
            _ => Err(RowError::Status(s.to_owned())),
        }
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "COP" => Ok(Currency::Cop),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "JPY" => Ok(Currency::Jpy),
            _ => Err(CurrencyError(s.to_owned())),
        }
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

fn parse_with_offset(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, OFFSET_FORMAT))
        .ok()
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Truncates a date or timestamp to its calendar day.
///
/// Timestamps carrying an offset are moved to local time first; timestamps
/// without one keep the day as written.
#[must_use]
pub fn parse_day(text: &str) -> Option<Date> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Some(Date(date));
    }
    if let Some(timestamp) = parse_with_offset(text) {
        return Some(Date(timestamp.with_timezone(&Local).date_naive()));
    }
    parse_naive(text).map(|timestamp| Date(timestamp.date()))
}

/// Parses a creation timestamp. Values without an offset are taken as UTC.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    parse_with_offset(text)
        .or_else(|| parse_naive(text).map(|t| t.and_utc().fixed_offset()))
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|t| t.and_utc().fixed_offset())
        })
}

/// Parses a month in the format `YYYY-MM`.
#[must_use]
pub fn parse_month(text: &str) -> Option<YearMonth> {
    const ITEMS: &[Item<'static>] = &[
        Item::Numeric(Numeric::Year, Pad::Zero),
        Item::Literal("-"),
        Item::Numeric(Numeric::Month, Pad::Zero),
    ];

    let mut parsed = Parsed::new();
    chrono::format::parse(&mut parsed, text.trim(), ITEMS.iter()).ok()?;
    parsed.set_day(1).ok()?;
    parsed
        .to_naive_date()
        .ok()
        .map(|date| YearMonth::of(Date(date)))
}

fn day_field(id: &ProductId, field: &str, text: Option<String>) -> Option<Date> {
    let text = non_empty(text)?;
    let day = parse_day(&text);
    if day.is_none() {
        log::debug!("Ignoring unparseable {field} {text:?} of product {id}");
    }
    day
}

impl TryFrom<RawProduct> for Product {
    type Error = RowError;

    fn try_from(value: RawProduct) -> Result<Self, Self::Error> {
        let RawProduct {
            id,
            name,
            category,
            price,
            priority,
            notes,
            store,
            status,
            created_at,
            target_date,
            purchase_date,
        } = value;
        let id = ProductId::from(id);
        let name = non_empty(name).ok_or(RowError::MissingName)?;
        let price = Price::new(price.ok_or(RowError::MissingPrice)?);
        if price.is_negative() {
            return Err(RowError::NegativePrice(price.into_inner()));
        }
        let priority = non_empty(priority)
            .map(|p| p.parse::<Priority>())
            .transpose()?
            .unwrap_or_default();
        let status = non_empty(status)
            .map(|s| s.parse::<Status>())
            .transpose()?
            .unwrap_or_default();
        let date_added = non_empty(created_at).and_then(|text| {
            let timestamp = parse_timestamp(&text);
            if timestamp.is_none() {
                log::debug!("Ignoring unparseable creation time {text:?} of product {id}");
            }
            timestamp
        });
        let target_date = day_field(&id, "target date", target_date);
        let purchase_date = day_field(&id, "purchase date", purchase_date);
        Ok(Product {
            id,
            name: name.trim().to_owned(),
            category: non_empty(category).unwrap_or_else(|| "Other".to_owned()),
            price,
            priority,
            notes: non_empty(notes),
            store: non_empty(store),
            status,
            date_added,
            target_date,
            purchase_date,
        })
    }
}

impl From<&Product> for RawProduct {
    fn from(value: &Product) -> Self {
        RawProduct {
            id: RawId::from(&value.id),
            name: Some(value.name.clone()),
            category: Some(value.category.clone()),
            price: Some(value.price.into_inner()),
            priority: Some(value.priority.to_string()),
            notes: value.notes.clone(),
            store: value.store.clone(),
            status: Some(value.status.to_string()),
            created_at: value.date_added.map(|t| t.to_rfc3339()),
            target_date: value.target_date.map(|d| d.to_string()),
            purchase_date: value.purchase_date.map(|d| d.to_string()),
        }
    }
}

/// Reads a JSON array of product rows.
///
/// Rows failing the basic form checks are collected and reported together.
/// Dates that cannot be read are dropped from their row without failing it.
pub fn parse(r: impl Read) -> Result<Vec<Product>, Error> {
    let rows: Vec<RawProduct> = serde_json::from_reader(r)?;
    let mut products = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();
    for (index, row) in rows.into_iter().enumerate() {
        match Product::try_from(row) {
            Ok(product) => products.push(product),
            Err(e) => errors.push(Positioned::new(index + 1, e)),
        }
    }
    if errors.is_empty() {
        Ok(products)
    } else {
        Err(Error::Many(RowErrors(errors)))
    }
}

#[cfg(test)]
mod test {
    use chrono::{DateTime, Local, NaiveDate};
    use rust_decimal::Decimal;

    use crate::calendar::YearMonth;
    use crate::parse::{
        CurrencyError, Error, RawId, RowError, parse, parse_day, parse_month, parse_timestamp,
    };
    use crate::{Currency, Date, Positioned, Price, Priority, ProductId, Status};

    fn date(year: i32, month: u32, day: u32) -> Option<Date> {
        Date::from_ymd(year, month, day)
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("2024-03-15"), date(2024, 3, 15));
        assert_eq!(parse_day(" 2024-03-15 "), date(2024, 3, 15));
        assert_eq!(parse_day("2024-03-15T23:59:59"), date(2024, 3, 15));
        assert_eq!(parse_day("2024-03-15T00:00:00.000"), date(2024, 3, 15));
        assert_eq!(parse_day("2024-03-15 08:30:00"), date(2024, 3, 15));

        let tests = ["", "yesterday", "2024-02-30", "15.03.2024", "2024-03-15T25:00:00"];
        for text in tests {
            assert_eq!(parse_day(text), None, "{text}");
        }
    }

    #[test]
    fn test_parse_day_with_offset_uses_local_day() {
        for text in ["2024-03-15T23:30:00+00:00", "2024-03-15T01:00:00-05:00"] {
            let expected = DateTime::parse_from_rfc3339(text)
                .unwrap()
                .with_timezone(&Local)
                .date_naive();
            assert_eq!(parse_day(text), Some(Date(expected)), "{text}");
        }
        let expected = DateTime::parse_from_rfc3339("2024-03-15T10:20:30+00:00")
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(parse_day("2024-03-15 10:20:30.123+00"), Some(Date(expected)));
    }

    #[test]
    fn test_same_local_day_same_key() {
        let morning = parse_day("2024-06-01T08:00:00").unwrap();
        let evening = parse_day("2024-06-01T21:45:10.5").unwrap();
        assert_eq!(morning, evening);
    }

    #[test]
    fn test_parse_timestamp() {
        let with_offset = parse_timestamp("2024-03-15T10:20:30.5+02:00").unwrap();
        assert_eq!(with_offset.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(
            with_offset.naive_local(),
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_milli_opt(10, 20, 30, 500)
                .unwrap()
        );

        let naive = parse_timestamp("2024-03-15T10:20:30").unwrap();
        assert_eq!(naive.offset().local_minus_utc(), 0);
        assert!(parse_timestamp("2024-03-15").is_some());
        assert!(parse_timestamp("soon").is_none());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-03"), YearMonth::new(2024, 3));
        assert_eq!(parse_month("1999-12"), YearMonth::new(1999, 12));
        assert_eq!(parse_month("2024-13"), None);
        assert_eq!(parse_month("March"), None);
        assert_eq!(parse_month("2024"), None);
        assert_eq!(parse_month("300000-03"), None);
    }

    #[test]
    fn test_parse_priority_and_status() {
        assert_eq!("alta".parse(), Ok(Priority::High));
        assert_eq!("Medium".parse(), Ok(Priority::Medium));
        assert_eq!("baja".parse(), Ok(Priority::Low));
        assert_eq!(
            "urgent".parse::<Priority>(),
            Err(RowError::Priority("urgent".to_owned()))
        );
        assert_eq!("comprado".parse(), Ok(Status::Purchased));
        assert_eq!("pending".parse(), Ok(Status::Pending));
        assert_eq!(
            "lost".parse::<Status>(),
            Err(RowError::Status("lost".to_owned()))
        );
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!("usd".parse(), Ok(Currency::Usd));
        assert_eq!(" JPY".parse(), Ok(Currency::Jpy));
        assert_eq!(
            "BTC".parse::<Currency>(),
            Err(CurrencyError("BTC".to_owned()))
        );
    }

    #[test]
    fn test_parse_rows() {
        let json = r#"[
            {
                "id": 1,
                "user_id": "abc",
                "name": "Headphones",
                "category": "Technology",
                "price": "199.90",
                "priority": "alta",
                "notes": "",
                "store": "Tech shop",
                "status": "comprado",
                "created_at": "2024-03-01T09:00:00+00:00",
                "target_date": null,
                "purchase_date": "2024-03-15"
            },
            {
                "id": "b7",
                "name": "Novel",
                "price": 50,
                "targetDate": "2024-03-15",
                "purchaseDate": "sometime"
            }
        ]"#;
        let products = parse(json.as_bytes()).unwrap();
        assert_eq!(products.len(), 2);

        let headphones = &products[0];
        assert_eq!(headphones.id, ProductId::from("1"));
        assert_eq!(headphones.price, Price::new(Decimal::new(19990, 2)));
        assert_eq!(headphones.priority, Priority::High);
        assert_eq!(headphones.status, Status::Purchased);
        assert_eq!(headphones.notes, None);
        assert_eq!(headphones.store.as_deref(), Some("Tech shop"));
        assert_eq!(headphones.purchase_date, date(2024, 3, 15));
        assert_eq!(headphones.target_date, None);
        assert!(headphones.date_added.is_some());

        let novel = &products[1];
        assert_eq!(novel.id, ProductId::from("b7"));
        assert_eq!(novel.category, "Other");
        assert_eq!(novel.priority, Priority::Medium);
        assert_eq!(novel.status, Status::Pending);
        assert_eq!(novel.target_date, date(2024, 3, 15));
        assert_eq!(novel.purchase_date, None);
    }

    #[test]
    fn test_parse_row_errors() {
        let json = r#"[
            {"id": 1, "name": "Fine", "price": 1},
            {"id": 2, "name": "  ", "price": 1},
            {"id": 3, "name": "Refund", "price": -5},
            {"id": 4, "name": "Lamp"},
            {"id": 5, "name": "Chair", "price": 3, "priority": "someday"},
            {"id": 6, "name": "Gift", "price": 0}
        ]"#;
        let Err(Error::Many(errors)) = parse(json.as_bytes()) else {
            panic!("expected row errors");
        };
        assert_eq!(
            errors.0,
            vec![
                Positioned::new(2, RowError::MissingName),
                Positioned::new(3, RowError::NegativePrice(Decimal::from(-5))),
                Positioned::new(4, RowError::MissingPrice),
                Positioned::new(5, RowError::Priority("someday".to_owned())),
            ]
        );
        assert!(
            errors
                .to_string()
                .contains("Invalid product in row 3: Price must not be negative, got -5")
        );
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(matches!(parse("{".as_bytes()), Err(Error::Json(_))));
        assert!(matches!(parse("{}".as_bytes()), Err(Error::Json(_))));
        assert!(parse("[]".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_raw_id() {
        assert_eq!(RawId::from(&ProductId::from("42")), RawId::Number(42));
        assert_eq!(
            RawId::from(&ProductId::from("007")),
            RawId::Text("007".to_owned())
        );
        assert_eq!(ProductId::from(RawId::Number(42)), ProductId::from("42"));
    }
}
