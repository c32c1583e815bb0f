//! Ordering of catalog items.
//!
//! Every sort is stable: items whose keys compare equal keep their input
//! order, so repeating a query yields the same sequence and the same pages.

use elecmat_features::{collate, parse_price};
use elecmat_model::{CatalogItem, SortKey};
use std::cmp::Ordering;

/// Compare two items under the given sort key.
pub fn compare(a: &CatalogItem, b: &CatalogItem, key: SortKey) -> Ordering {
    match key {
        SortKey::PriceLow => parse_price(&a.price).total_cmp(&parse_price(&b.price)),
        SortKey::PriceHigh => parse_price(&b.price).total_cmp(&parse_price(&a.price)),
        SortKey::Name => collate(&a.name, &b.name),
        SortKey::Supplier => collate(a.supplier_label(), b.supplier_label()),
        SortKey::Relevance => b
            .is_on_sale
            .cmp(&a.is_on_sale)
            .then_with(|| collate(&a.name, &b.name)),
    }
}

/// Sort items into a new sequence, leaving the input untouched.
pub fn sort_items<'a, I>(items: I, key: SortKey) -> Vec<&'a CatalogItem>
where
    I: IntoIterator<Item = &'a CatalogItem>,
{
    match key {
        SortKey::PriceLow | SortKey::PriceHigh => {
            // Parse each price once rather than per comparison
            let mut keyed: Vec<(f64, &CatalogItem)> = items
                .into_iter()
                .map(|item| (parse_price(&item.price), item))
                .collect();
            if key == SortKey::PriceLow {
                keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            } else {
                keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
            }
            keyed.into_iter().map(|(_, item)| item).collect()
        }
        _ => {
            let mut sorted: Vec<&CatalogItem> = items.into_iter().collect();
            sorted.sort_by(|a, b| compare(a, b, key));
            sorted
        }
    }
}
