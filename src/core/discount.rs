//! Range-aware discount transform.
//!
//! Eligible products get a floored, discounted price and are re-bucketed into
//! one of the price range labels already present in the catalog. Every
//! product is flagged with `on_sale`.

use crate::core::price_range::PriceRangeCatalog;
use crate::domain::model::{
    ProductRecord, TransformSummary, TransformedRecord, ON_SALE_FIELD, ORIGINAL_PRICE_FIELD,
    PRICE_RANGE_FIELD,
};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_range;
use serde_json::Number;

pub const DEFAULT_DISCOUNT_FACTOR: f64 = 0.2;
pub const DEFAULT_CATEGORY_KEYWORD: &str = "camera";

/// Eligible when any category contains `keyword`, ignoring case.
pub fn category_contains(keyword: &str) -> impl Fn(&ProductRecord) -> bool {
    let needle = keyword.to_lowercase();
    move |product| {
        product
            .categories
            .iter()
            .any(|category| category.to_lowercase().contains(&needle))
    }
}

/// `floor(price * (1 - factor))`
pub fn discounted_price(price: f64, discount_factor: f64) -> u64 {
    let discounted = (price * (1.0 - discount_factor)).floor();
    if discounted.is_finite() && discounted > 0.0 {
        discounted as u64
    } else {
        0
    }
}

#[derive(Debug, Clone)]
pub struct DiscountRule {
    discount_factor: f64,
    category_keyword: String,
}

impl DiscountRule {
    pub fn new(discount_factor: f64, category_keyword: &str) -> Result<Self> {
        validate_range("discount_factor", discount_factor, 0.0, 1.0)?;
        if category_keyword.trim().is_empty() {
            return Err(EtlError::InvalidConfigValueError {
                field: "category_keyword".to_string(),
                value: category_keyword.to_string(),
                reason: "Keyword cannot be empty".to_string(),
            });
        }
        Ok(Self {
            discount_factor,
            category_keyword: category_keyword.to_string(),
        })
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    pub fn category_keyword(&self) -> &str {
        &self.category_keyword
    }

    pub fn apply(&self, catalog: Vec<ProductRecord>) -> (Vec<TransformedRecord>, TransformSummary) {
        transform_with_summary(
            catalog,
            self.discount_factor,
            category_contains(&self.category_keyword),
        )
    }
}

impl Default for DiscountRule {
    fn default() -> Self {
        Self {
            discount_factor: DEFAULT_DISCOUNT_FACTOR,
            category_keyword: DEFAULT_CATEGORY_KEYWORD.to_string(),
        }
    }
}

pub fn transform<F>(
    catalog: Vec<ProductRecord>,
    discount_factor: f64,
    is_eligible: F,
) -> Vec<TransformedRecord>
where
    F: Fn(&ProductRecord) -> bool,
{
    transform_with_summary(catalog, discount_factor, is_eligible).0
}

pub fn transform_with_summary<F>(
    catalog: Vec<ProductRecord>,
    discount_factor: f64,
    is_eligible: F,
) -> (Vec<TransformedRecord>, TransformSummary)
where
    F: Fn(&ProductRecord) -> bool,
{
    let ranges = PriceRangeCatalog::discover(&catalog);
    tracing::debug!("Discovered {} distinct price ranges", ranges.len());

    let mut summary = TransformSummary {
        total: catalog.len(),
        unmatchable_labels: ranges.unmatchable_labels().map(str::to_string).collect(),
        ..Default::default()
    };

    let records = catalog
        .into_iter()
        .map(|product| {
            if !is_eligible(&product) {
                return pass_through(product);
            }

            let sale_price = discounted_price(product.price_value(), discount_factor);
            let price_range = ranges.lookup(sale_price).map(str::to_string);

            summary.discounted += 1;
            if price_range.is_none() {
                summary.unmatched_prices += 1;
                tracing::debug!(
                    "No price range contains discounted price {} (was {})",
                    sale_price,
                    product.price
                );
            }

            let mut extra = product.extra;
            extra.remove(ON_SALE_FIELD);
            extra.remove(ORIGINAL_PRICE_FIELD);
            extra.remove(PRICE_RANGE_FIELD);

            TransformedRecord {
                original_price: Some(product.price),
                price: Number::from(sale_price),
                categories: product.categories,
                price_range,
                on_sale: true,
                extra,
            }
        })
        .collect();

    (records, summary)
}

fn pass_through(product: ProductRecord) -> TransformedRecord {
    let mut extra = product.extra;
    extra.remove(ON_SALE_FIELD);

    TransformedRecord {
        price: product.price,
        categories: product.categories,
        price_range: product.price_range,
        original_price: None,
        on_sale: false,
        extra,
    }
}
