//! Facet counts and result descriptions for listing screens.
//!
//! Converts a snapshot and the current `QuerySpec` into the filter sidebar
//! (values with counts and selection state), the active filter chips, and
//! the one-line result summary shown above a grid.

use elecmat_features::{collate, parse_price, BrandExtractor, PriceBucket};
use elecmat_model::{CatalogItem, FilterFacet, FilterSet, QuerySpec, ResultPage, ON_SALE};
use elecmat_query::apply_filters_with;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single facet value with count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    /// Items carrying this value
    pub count: usize,
    /// Whether currently selected in the query
    pub selected: bool,
}

/// One filter group in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    /// Display name (e.g. "Brand")
    pub name: String,
    /// Filter category the values feed, if selectable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterFacet>,
    pub values: Vec<FacetValue>,
}

impl Facet {
    fn new(name: &str, filter: Option<FilterFacet>) -> Self {
        Self {
            name: name.to_string(),
            filter,
            values: Vec::new(),
        }
    }

    /// Count for a value, 0 if absent.
    pub fn count(&self, value: &str) -> usize {
        self.values
            .iter()
            .find(|v| v.value == value)
            .map_or(0, |v| v.count)
    }
}

/// All sidebar facets for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFacets {
    pub brands: Facet,
    pub suppliers: Facet,
    pub categories: Facet,
    pub availability: Facet,
    pub price_ranges: Facet,
}

/// Compute facet counts.
///
/// Counts cover items matching the search term only, ignoring the selected
/// filters, so selecting a value never hides its siblings.
pub fn compute_facets(
    items: &[CatalogItem],
    spec: &QuerySpec,
    brands: &dyn BrandExtractor,
) -> CatalogFacets {
    let searched = apply_filters_with(items, &spec.search_term, &FilterSet::default(), brands);
    let filters = &spec.filters;

    let mut brand_counts: HashMap<String, usize> = HashMap::new();
    let mut supplier_counts: HashMap<String, usize> = HashMap::new();
    let mut category_counts: HashMap<String, usize> = HashMap::new();
    let mut stock_counts: HashMap<String, usize> = HashMap::new();
    let mut bucket_counts = [0usize; PriceBucket::ALL.len()];
    let mut on_sale = 0;

    for item in &searched {
        if let Some(brand) = brands.brand(item) {
            *brand_counts.entry(brand).or_insert(0) += 1;
        }
        if let Some(supplier) = item.supplier.as_deref().filter(|s| !s.is_empty()) {
            *supplier_counts.entry(supplier.to_string()).or_insert(0) += 1;
        }
        if !item.category.is_empty() {
            *category_counts.entry(item.category.clone()).or_insert(0) += 1;
        }
        if let Some(status) = &item.stock_status {
            *stock_counts.entry(status.label().to_string()).or_insert(0) += 1;
        }
        if item.is_on_sale {
            on_sale += 1;
        }

        let price = parse_price(&item.price);
        if price > 0.0 {
            for (slot, bucket) in bucket_counts.iter_mut().zip(PriceBucket::ALL) {
                if bucket.contains(price) {
                    *slot += 1;
                }
            }
        }
    }

    let mut availability = Facet::new("Availability", Some(FilterFacet::Availability));
    availability.values = ranked(stock_counts, filters, FilterFacet::Availability);
    if on_sale > 0 {
        availability.values.push(FacetValue {
            value: ON_SALE.to_string(),
            count: on_sale,
            selected: filters.is_selected(FilterFacet::Availability, ON_SALE),
        });
    }

    let mut price_ranges = Facet::new("Price", Some(FilterFacet::PriceRanges));
    price_ranges.values = PriceBucket::ALL
        .iter()
        .zip(bucket_counts)
        .map(|(bucket, count)| FacetValue {
            value: bucket.label().to_string(),
            count,
            selected: filters.is_selected(FilterFacet::PriceRanges, bucket.label()),
        })
        .collect();

    let mut brand_facet = Facet::new("Brand", Some(FilterFacet::Brands));
    brand_facet.values = ranked(brand_counts, filters, FilterFacet::Brands);

    let mut supplier_facet = Facet::new("Supplier", Some(FilterFacet::Suppliers));
    supplier_facet.values = ranked(supplier_counts, filters, FilterFacet::Suppliers);

    let mut category_facet = Facet::new("Category", None);
    category_facet.values = category_counts
        .into_iter()
        .map(|(value, count)| FacetValue {
            value,
            count,
            selected: false,
        })
        .collect();
    sort_values(&mut category_facet.values);

    CatalogFacets {
        brands: brand_facet,
        suppliers: supplier_facet,
        categories: category_facet,
        availability,
        price_ranges,
    }
}

fn ranked(counts: HashMap<String, usize>, filters: &FilterSet, facet: FilterFacet) -> Vec<FacetValue> {
    let mut values: Vec<FacetValue> = counts
        .into_iter()
        .map(|(value, count)| FacetValue {
            selected: filters.is_selected(facet, &value),
            value,
            count,
        })
        .collect();
    sort_values(&mut values);
    values
}

// Most common first; ties alphabetical so output is deterministic
fn sort_values(values: &mut [FacetValue]) {
    values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| collate(&a.value, &b.value)));
}

/// Active filter chips, e.g. `Brand: Hager`.
pub fn describe_filters(spec: &QuerySpec) -> Vec<String> {
    let mut chips = Vec::new();

    if !spec.search_term.is_empty() {
        chips.push(format!("Search: \"{}\"", spec.search_term));
    }

    for facet in FilterFacet::ALL {
        let label = match facet {
            FilterFacet::Brands => "Brand",
            FilterFacet::PriceRanges => "Price",
            FilterFacet::Availability => "Availability",
            FilterFacet::Suppliers => "Supplier",
        };
        for value in spec.filters.values(facet) {
            let shown = if value == ON_SALE { "On Sale" } else { value.as_str() };
            chips.push(format!("{}: {}", label, shown));
        }
    }

    chips
}

/// One-line description of a result page.
pub fn summarize_page(page: &ResultPage) -> String {
    if page.total_items == 0 {
        return "No products found".to_string();
    }

    let noun = if page.total_items == 1 { "product" } else { "products" };
    format!(
        "Showing {}-{} of {} {}",
        page.start_index + 1,
        page.end_index,
        page.total_items,
        noun
    )
}
