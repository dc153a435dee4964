use chrono::{DateTime, FixedOffset, Local};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::parse::{RawId, RawProduct, RowError, parse_day};
use crate::{Date, Priority, Product, ProductId, Status};

#[derive(Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Invalid(#[from] RowError),
    #[error("Expected the {field} as YYYY-MM-DD, got {text:?}")]
    Date { field: &'static str, text: String },
    #[error("No product with id {0}")]
    UnknownId(ProductId),
}

/// A new product as entered by the user. Everything but name and price is optional.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub name: String,
    pub price: Decimal,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub store: Option<String>,
    pub notes: Option<String>,
    pub target_date: Option<String>,
    pub purchase_date: Option<String>,
}

/// One past the largest numeric id, so generated ids never collide.
#[must_use]
pub fn next_id(products: &[Product]) -> ProductId {
    let next = products
        .iter()
        .filter_map(|p| p.id.0.trim().parse::<i64>().ok())
        .max()
        .map_or(1, |max| max.saturating_add(1).max(1));
    ProductId(next.to_string())
}

fn checked_day(field: &'static str, text: Option<String>) -> Result<Option<Date>, Error> {
    match text.filter(|t| !t.trim().is_empty()) {
        None => Ok(None),
        Some(text) => parse_day(&text).map(Some).ok_or(Error::Date { field, text }),
    }
}

/// Adds a product created now in front of the others and returns it.
///
/// The draft goes through the same checks as a snapshot row. Unlike a row, a
/// date that cannot be read is an error. A purchase date marks the product
/// purchased.
pub fn add(products: &mut Vec<Product>, draft: Draft) -> Result<&Product, Error> {
    add_at(products, draft, Local::now().fixed_offset())
}

pub fn add_at(
    products: &mut Vec<Product>,
    draft: Draft,
    now: DateTime<FixedOffset>,
) -> Result<&Product, Error> {
    let Draft {
        name,
        price,
        category,
        priority,
        store,
        notes,
        target_date,
        purchase_date,
    } = draft;
    let target_date = checked_day("target date", target_date)?;
    let purchase_date = checked_day("purchase date", purchase_date)?;
    let status = if purchase_date.is_some() {
        Status::Purchased
    } else {
        Status::Pending
    };
    let id = next_id(products);
    let row = RawProduct {
        id: RawId::from(&id),
        name: Some(name),
        category,
        price: Some(price),
        priority: priority.map(|p| p.to_string()),
        notes,
        store,
        status: Some(status.to_string()),
        created_at: Some(now.to_rfc3339()),
        target_date: target_date.map(|d| d.to_string()),
        purchase_date: purchase_date.map(|d| d.to_string()),
    };
    let product = Product::try_from(row)?;
    log::info!("Added product {id} ({})", product.name);
    products.insert(0, product);
    Ok(&products[0])
}

/// Removes the product with `id` and returns it.
pub fn remove(products: &mut Vec<Product>, id: &ProductId) -> Result<Product, Error> {
    let position = products
        .iter()
        .position(|p| &p.id == id)
        .ok_or_else(|| Error::UnknownId(id.clone()))?;
    let product = products.remove(position);
    log::info!("Removed product {id} ({})", product.name);
    Ok(product)
}
