use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::{Price, Product, Status};

/// Counts and values of the whole wishlist, split by purchase status.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub pending: usize,
    pub purchased: usize,
    pub pending_value: Price,
    pub purchased_value: Price,
}

impl Summary {
    pub fn of<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        products
            .into_iter()
            .fold(Summary::default(), |mut summary, product| {
                summary.total += 1;
                match product.status {
                    Status::Pending => {
                        summary.pending += 1;
                        summary.pending_value += product.price;
                    }
                    Status::Purchased => {
                        summary.purchased += 1;
                        summary.purchased_value += product.price;
                    }
                }
                summary
            })
    }
}

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Filter {
    pub status: Option<Status>,
    pub search: String,
}

impl Filter {
    /// Status must match if set; the search text is matched case-insensitively
    /// against name, category and notes.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self.status.is_some_and(|status| status != product.status) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            Some(product.name.as_str()),
            Some(product.category.as_str()),
            product.notes.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("Unknown sort order {0:?}, expected newest, oldest, price-high, price-low or priority")]
pub struct SortOrderError(String);

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    PriceHigh,
    PriceLow,
    Priority,
}

impl FromStr for SortOrder {
    type Err = SortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "price-high" => Ok(SortOrder::PriceHigh),
            "price-low" => Ok(SortOrder::PriceLow),
            "priority" => Ok(SortOrder::Priority),
            _ => Err(SortOrderError(s.to_owned())),
        }
    }
}

/// Products without a creation time sort after all others.
fn by_date_added(
    lhs: Option<DateTime<FixedOffset>>,
    rhs: Option<DateTime<FixedOffset>>,
    newest_first: bool,
) -> Ordering {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) if newest_first => rhs.cmp(&lhs),
        (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl SortOrder {
    #[must_use]
    pub fn compare(self, lhs: &Product, rhs: &Product) -> Ordering {
        match self {
            SortOrder::Newest => by_date_added(lhs.date_added, rhs.date_added, true),
            SortOrder::Oldest => by_date_added(lhs.date_added, rhs.date_added, false),
            SortOrder::PriceHigh => rhs.price.cmp(&lhs.price),
            SortOrder::PriceLow => lhs.price.cmp(&rhs.price),
            SortOrder::Priority => rhs.priority.cmp(&lhs.priority),
        }
    }
}

/// The filtered products in the requested order. Ties keep their input order.
#[must_use]
pub fn select<'a>(products: &'a [Product], filter: &Filter, order: SortOrder) -> Vec<&'a Product> {
    let mut selected = products
        .iter()
        .filter(|p| filter.matches(p))
        .collect::<Vec<_>>();
    selected.sort_by(|lhs, rhs| order.compare(lhs, rhs));
    selected
}

#[cfg(test)]
mod test {
    use crate::parse::parse_timestamp;
    use crate::stats::{Filter, SortOrder, SortOrderError, Summary, select};
    use crate::{Price, Priority, Product, Status};

    fn products() -> Vec<Product> {
        vec![
            Product {
                category: "Books".to_owned(),
                priority: Priority::Low,
                date_added: parse_timestamp("2024-01-10T10:00:00Z"),
                ..Product::new("1", "Cookbook", 30)
            },
            Product {
                category: "Technology".to_owned(),
                priority: Priority::High,
                status: Status::Purchased,
                notes: Some("Noise cancelling".to_owned()),
                date_added: parse_timestamp("2024-02-01T10:00:00Z"),
                ..Product::new("2", "Headphones", 200)
            },
            Product {
                category: "Home".to_owned(),
                ..Product::new("3", "Lamp", 45)
            },
            Product {
                category: "Sports".to_owned(),
                priority: Priority::High,
                date_added: parse_timestamp("2023-12-24T18:00:00Z"),
                ..Product::new("4", "Running shoes", 120)
            },
        ]
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_summary() {
        let products = products();
        assert_eq!(
            Summary::of(&products),
            Summary {
                total: 4,
                pending: 3,
                purchased: 1,
                pending_value: Price::from(195),
                purchased_value: Price::from(200),
            }
        );
        assert_eq!(Summary::of(&[]), Summary::default());
    }

    #[test]
    fn test_filter() {
        let products = products();
        let all = Filter::default();
        assert!(products.iter().all(|p| all.matches(p)));

        let search = Filter {
            search: "NOISE".to_owned(),
            ..Filter::default()
        };
        assert_eq!(ids(&select(&products, &search, SortOrder::PriceLow)), vec!["2"]);

        let category = Filter {
            search: "tech".to_owned(),
            status: Some(Status::Pending),
        };
        assert!(select(&products, &category, SortOrder::Newest).is_empty());

        let pending = Filter {
            status: Some(Status::Pending),
            ..Filter::default()
        };
        assert_eq!(
            ids(&select(&products, &pending, SortOrder::PriceLow)),
            vec!["1", "3", "4"]
        );
    }

    #[test]
    fn test_sort_orders() {
        let products = products();
        let all = Filter::default();
        let tests = [
            (SortOrder::Newest, vec!["2", "1", "4", "3"]),
            (SortOrder::Oldest, vec!["4", "1", "2", "3"]),
            (SortOrder::PriceHigh, vec!["2", "4", "3", "1"]),
            (SortOrder::PriceLow, vec!["1", "3", "4", "2"]),
            (SortOrder::Priority, vec!["2", "4", "3", "1"]),
        ];
        for (order, expected) in tests {
            assert_eq!(ids(&select(&products, &all, order)), expected, "{order:?}");
        }
    }

    #[test]
    fn test_parse_sort_order() {
        assert_eq!("price-high".parse(), Ok(SortOrder::PriceHigh));
        assert_eq!("priority".parse(), Ok(SortOrder::Priority));
        assert_eq!(
            "cheapest".parse::<SortOrder>(),
            Err(SortOrderError("cheapest".to_owned()))
        );
    }
}
