//! Price range labels such as `"100-199"` or `"$100 - $199"`.
//!
//! A label is interpreted through the first two integers embedded in it; any
//! other characters (currency symbols, separators, words) are ignored, which
//! tolerates inconsistent formatting in the source catalog.

use crate::domain::model::ProductRecord;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

// 只認 ASCII 數字，`\d` 在 regex crate 會包含全形等 Unicode 數字
static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("integer pattern is valid"));

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBounds {
    pub min: u64,
    pub max: u64,
}

impl PriceBounds {
    pub fn contains(&self, price: u64) -> bool {
        self.min <= price && price <= self.max
    }
}

/// Parses the first two embedded integers of `label` as `[min, max]`.
///
/// Returns `None` when fewer than two integers are present or when one of
/// them does not fit in a `u64`.
pub fn parse_bounds(label: &str) -> Option<PriceBounds> {
    let mut numbers = INTEGER.find_iter(label).map(|m| m.as_str().parse::<u64>());
    let min = numbers.next()?.ok()?;
    let max = numbers.next()?.ok()?;
    Some(PriceBounds { min, max })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRangeEntry {
    pub label: String,
    pub bounds: Option<PriceBounds>,
}

/// Distinct range labels of a catalog in first-seen order.
///
/// Labels are deduplicated by exact string, so `"100-199"` and `"$100-$199"`
/// are two entries even though they encode the same interval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceRangeCatalog {
    entries: Vec<PriceRangeEntry>,
}

impl PriceRangeCatalog {
    pub fn discover(products: &[ProductRecord]) -> Self {
        Self::from_labels(products.iter().filter_map(|p| p.price_range.as_deref()))
    }

    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for label in labels {
            if !seen.insert(label) {
                continue;
            }
            let bounds = parse_bounds(label);
            match bounds {
                None => tracing::warn!(
                    "⚠️ Price range '{}' has fewer than two integers, skipped for matching",
                    label
                ),
                Some(b) if b.min > b.max => tracing::debug!(
                    "Price range '{}' has min {} above max {}, it can never match",
                    label,
                    b.min,
                    b.max
                ),
                Some(_) => {}
            }
            entries.push(PriceRangeEntry {
                label: label.to_string(),
                bounds,
            });
        }

        Self { entries }
    }

    /// First label, in discovery order, whose interval contains `price`.
    pub fn lookup(&self, price: u64) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.bounds.is_some_and(|b| b.contains(price)))
            .map(|entry| entry.label.as_str())
    }

    pub fn unmatchable_labels(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|entry| entry.bounds.is_none())
            .map(|entry| entry.label.as_str())
    }

    pub fn entries(&self) -> &[PriceRangeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
