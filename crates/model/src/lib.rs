//! Core domain model for the electrical-materials catalog.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `CatalogItem`: A product record as supplied by an item source
//! - `StockStatus`: In Stock, Low Stock, Out of Stock
//! - `QuerySpec`: Search term, filters, sort key and page window for one query
//! - `ResultPage`: One page of filtered and sorted items plus pagination metadata
//! - `CompareTray`: A bounded selection of items for side-by-side comparison

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Synthetic availability value selecting discounted items.
pub const ON_SALE: &str = "on-sale";

/// Maximum number of items the comparison tray holds.
pub const COMPARE_LIMIT: usize = 3;

/// Errors raised when parsing query parameters from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("Unknown sort key: {0}")]
    UnknownSortKey(String),
    #[error("Unknown filter facet: {0}")]
    UnknownFacet(String),
}

/// Stock level of a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
    /// Label not recognised; kept verbatim
    Other(String),
}

impl StockStatus {
    /// Display label, as it appears in snapshots and availability filters.
    pub fn label(&self) -> &str {
        match self {
            Self::InStock => "In Stock",
            Self::LowStock => "Low Stock",
            Self::OutOfStock => "Out of Stock",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for StockStatus {
    fn from(s: &str) -> Self {
        match s {
            "In Stock" => Self::InStock,
            "Low Stock" => Self::LowStock,
            "Out of Stock" => Self::OutOfStock,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for StockStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<StockStatus> for String {
    fn from(status: StockStatus) -> Self {
        status.label().to_string()
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Item identifier. Snapshots carry either integers or strings.
///
/// Equality compares the canonical numeric form when both sides have one,
/// so `42` and `"42"` identify the same item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl ItemId {
    /// Canonical numeric form, if the id is (or parses as) an integer.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl PartialEq for ItemId {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl Eq for ItemId {}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A product record in the electrical-materials listing.
///
/// Immutable snapshot supplied per query; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Unique within a snapshot when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,

    pub name: String,

    /// Free-form classification (not a closed set)
    #[serde(default)]
    pub category: String,

    /// Display price, e.g. "£1,234.56"
    #[serde(default)]
    pub price: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,

    /// Absent means available/unspecified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_status: Option<StockStatus>,

    #[serde(default)]
    pub is_on_sale: bool,

    /// Present only when on sale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<String>,

    #[serde(default)]
    pub highlights: Vec<String>,
}

impl CatalogItem {
    /// Create a minimal item with just a name and display price.
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            category: String::new(),
            price: price.into(),
            supplier: None,
            stock_status: None,
            is_on_sale: false,
            sale_price: None,
            highlights: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ItemId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn with_stock(mut self, status: StockStatus) -> Self {
        self.stock_status = Some(status);
        self
    }

    pub fn with_highlights(mut self, highlights: Vec<String>) -> Self {
        self.highlights = highlights;
        self
    }

    /// Mark the item as discounted with the given sale price.
    pub fn on_sale(mut self, sale_price: impl Into<String>) -> Self {
        self.is_on_sale = true;
        self.sale_price = Some(sale_price.into());
        self
    }

    /// Supplier label, empty when absent.
    pub fn supplier_label(&self) -> &str {
        self.supplier.as_deref().unwrap_or("")
    }
}

/// Whether two records refer to the same product.
///
/// Ids decide when both sides carry one. Otherwise the names are compared,
/// which conflates distinct unidentified items sharing a name.
pub fn same_item(a: &CatalogItem, b: &CatalogItem) -> bool {
    match (&a.id, &b.id) {
        (Some(x), Some(y)) => x == y,
        _ => a.name == b.name,
    }
}

/// Filter categories a listing exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterFacet {
    Brands,
    PriceRanges,
    Availability,
    Suppliers,
}

impl FilterFacet {
    pub const ALL: [FilterFacet; 4] = [
        FilterFacet::Brands,
        FilterFacet::PriceRanges,
        FilterFacet::Availability,
        FilterFacet::Suppliers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brands => "brands",
            Self::PriceRanges => "priceRanges",
            Self::Availability => "availability",
            Self::Suppliers => "suppliers",
        }
    }
}

impl FromStr for FilterFacet {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brands" | "brand" => Ok(Self::Brands),
            "priceRanges" | "price" => Ok(Self::PriceRanges),
            "availability" => Ok(Self::Availability),
            "suppliers" | "supplier" => Ok(Self::Suppliers),
            other => Err(SpecError::UnknownFacet(other.to_string())),
        }
    }
}

/// Selected values per filter category.
///
/// An empty set means "no selection" and never excludes anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSet {
    #[serde(default)]
    pub brands: BTreeSet<String>,
    #[serde(default)]
    pub price_ranges: BTreeSet<String>,
    #[serde(default)]
    pub availability: BTreeSet<String>,
    #[serde(default)]
    pub suppliers: BTreeSet<String>,
}

impl FilterSet {
    pub fn values(&self, facet: FilterFacet) -> &BTreeSet<String> {
        match facet {
            FilterFacet::Brands => &self.brands,
            FilterFacet::PriceRanges => &self.price_ranges,
            FilterFacet::Availability => &self.availability,
            FilterFacet::Suppliers => &self.suppliers,
        }
    }

    pub fn values_mut(&mut self, facet: FilterFacet) -> &mut BTreeSet<String> {
        match facet {
            FilterFacet::Brands => &mut self.brands,
            FilterFacet::PriceRanges => &mut self.price_ranges,
            FilterFacet::Availability => &mut self.availability,
            FilterFacet::Suppliers => &mut self.suppliers,
        }
    }

    /// Select or deselect a value. Returns true if it is now selected.
    pub fn toggle(&mut self, facet: FilterFacet, value: impl Into<String>) -> bool {
        let value = value.into();
        let set = self.values_mut(facet);
        if set.remove(&value) {
            false
        } else {
            set.insert(value);
            true
        }
    }

    pub fn is_selected(&self, facet: FilterFacet, value: &str) -> bool {
        self.values(facet).contains(value)
    }

    /// Number of selected values across all categories.
    pub fn active_count(&self) -> usize {
        FilterFacet::ALL.iter().map(|f| self.values(*f).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// On-sale items first, then by name
    #[default]
    Relevance,
    PriceLow,
    PriceHigh,
    Name,
    Supplier,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Relevance,
        SortKey::PriceLow,
        SortKey::PriceHigh,
        SortKey::Name,
        SortKey::Supplier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Name => "name",
            Self::Supplier => "supplier",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Relevance => "Most Relevant",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
            Self::Name => "Name: A-Z",
            Self::Supplier => "Supplier",
        }
    }
}

impl FromStr for SortKey {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SpecError::UnknownSortKey(s.to_string()))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied parameters for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    /// Empty means no text filtering
    #[serde(default)]
    pub search_term: String,

    #[serde(default)]
    pub filters: FilterSet,

    #[serde(default)]
    pub sort_key: SortKey,

    /// 1-indexed requested page
    #[serde(default = "default_page")]
    pub page: usize,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    12
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            filters: FilterSet::default(),
            sort_key: SortKey::default(),
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_filter(mut self, facet: FilterFacet, value: impl Into<String>) -> Self {
        self.filters.values_mut(facet).insert(value.into());
        self
    }

    pub fn with_sort(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    pub items: Vec<CatalogItem>,
    pub total_items: usize,
    /// Never below 1, even for an empty result
    pub total_pages: usize,
    /// Always within `[1, total_pages]`
    pub current_page: usize,
    pub start_index: usize,
    /// Exclusive
    pub end_index: usize,
}

impl ResultPage {
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Page numbers for pagination controls, a window centred on the
    /// current page (e.g. `[3, 4, 5, 6, 7]` on page 5 of 10).
    pub fn page_numbers(&self, max_visible: usize) -> Vec<usize> {
        if max_visible == 0 {
            return Vec::new();
        }
        if self.total_pages <= max_visible {
            return (1..=self.total_pages).collect();
        }

        let half = max_visible / 2;
        let start = self.current_page.saturating_sub(half).max(1);
        let end = (start + max_visible - 1).min(self.total_pages);
        let start = (end + 1).saturating_sub(max_visible).max(1);

        (start..=end).collect()
    }
}

/// Outcome of toggling an item in the comparison tray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayOutcome {
    Added,
    Removed,
    /// Tray already at capacity; nothing changed
    Full,
}

/// Bounded selection of items for side-by-side comparison.
///
/// Identity follows [`same_item`], so a selection survives re-querying.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareTray {
    capacity: usize,
    items: Vec<CatalogItem>,
}

impl Default for CompareTray {
    fn default() -> Self {
        Self::with_capacity(COMPARE_LIMIT)
    }
}

impl CompareTray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Add the item if absent, remove it if present.
    pub fn toggle(&mut self, item: &CatalogItem) -> TrayOutcome {
        if let Some(pos) = self.items.iter().position(|i| same_item(i, item)) {
            self.items.remove(pos);
            return TrayOutcome::Removed;
        }
        if self.is_full() {
            return TrayOutcome::Full;
        }
        self.items.push(item.clone());
        TrayOutcome::Added
    }

    pub fn contains(&self, item: &CatalogItem) -> bool {
        self.items.iter().any(|i| same_item(i, item))
    }

    pub fn remove(&mut self, item: &CatalogItem) -> bool {
        let before = self.items.len();
        self.items.retain(|i| !same_item(i, item));
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(current_page: usize, total_pages: usize) -> ResultPage {
        ResultPage {
            items: Vec::new(),
            total_items: total_pages * 10,
            total_pages,
            current_page,
            start_index: 0,
            end_index: 0,
        }
    }

    #[test]
    fn test_stock_status_labels() {
        assert_eq!(StockStatus::from("In Stock"), StockStatus::InStock);
        assert_eq!(StockStatus::from("Low Stock"), StockStatus::LowStock);
        assert_eq!(StockStatus::from("Out of Stock"), StockStatus::OutOfStock);
        assert_eq!(
            StockStatus::from("Pre-order"),
            StockStatus::Other("Pre-order".to_string())
        );
        assert_eq!(StockStatus::OutOfStock.label(), "Out of Stock");
    }

    #[test]
    fn test_item_deserialization() {
        let json = r#"{
            "id": "17",
            "name": "Prysmian 6242Y Twin & Earth 2.5mm 100m",
            "category": "cables",
            "price": "£89.99",
            "supplier": "Screwfix",
            "stockStatus": "Low Stock",
            "isOnSale": true,
            "salePrice": "£79.99",
            "highlights": ["BASEC approved"]
        }"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id.as_ref().and_then(ItemId::as_number), Some(17));
        assert_eq!(item.stock_status, Some(StockStatus::LowStock));
        assert!(item.is_on_sale);
        assert_eq!(item.sale_price.as_deref(), Some("£79.99"));
        assert_eq!(item.highlights, vec!["BASEC approved".to_string()]);
    }

    #[test]
    fn test_item_optional_fields_default() {
        let item: CatalogItem = serde_json::from_str(r#"{"name": "Wago 221-413"}"#).unwrap();
        assert_eq!(item.id, None);
        assert_eq!(item.supplier, None);
        assert_eq!(item.stock_status, None);
        assert!(!item.is_on_sale);
        assert!(item.highlights.is_empty());
        assert_eq!(item.supplier_label(), "");
    }

    #[test]
    fn test_stock_status_serializes_as_label() {
        let item = CatalogItem::new("MCB", "£5.00").with_stock(StockStatus::OutOfStock);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["stockStatus"], "Out of Stock");
    }

    #[test]
    fn test_item_id_canonical_equality() {
        assert_eq!(ItemId::from(42), ItemId::from("42"));
        assert_ne!(ItemId::from(42), ItemId::from("43"));
        assert_eq!(ItemId::from("sku-a"), ItemId::from("sku-a"));
        assert_eq!(ItemId::from("sku-a").as_number(), None);
    }

    #[test]
    fn test_same_item_by_id() {
        let a = CatalogItem::new("Socket", "£3.00").with_id(1);
        let b = CatalogItem::new("Socket", "£3.00").with_id(2);
        let c = CatalogItem::new("Renamed", "£3.00").with_id("1");
        assert!(!same_item(&a, &b));
        assert!(same_item(&a, &c));
    }

    #[test]
    fn test_same_item_name_fallback() {
        let a = CatalogItem::new("Socket", "£3.00").with_supplier("CEF");
        let b = CatalogItem::new("Socket", "£4.00").with_supplier("TLC");
        let c = CatalogItem::new("Socket", "£4.00").with_id(9);
        assert!(same_item(&a, &b));
        assert!(same_item(&a, &c));
        assert!(!same_item(&a, &CatalogItem::new("Switch", "£3.00")));
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("price-low".parse::<SortKey>(), Ok(SortKey::PriceLow));
        assert_eq!("supplier".parse::<SortKey>(), Ok(SortKey::Supplier));
        assert_eq!(
            "cheapest".parse::<SortKey>(),
            Err(SpecError::UnknownSortKey("cheapest".to_string()))
        );
        assert_eq!(
            serde_json::to_string(&SortKey::PriceHigh).unwrap(),
            "\"price-high\""
        );
    }

    #[test]
    fn test_filter_facet_parsing() {
        assert_eq!("brands".parse::<FilterFacet>(), Ok(FilterFacet::Brands));
        assert_eq!("priceRanges".parse::<FilterFacet>(), Ok(FilterFacet::PriceRanges));
        assert_eq!("supplier".parse::<FilterFacet>(), Ok(FilterFacet::Suppliers));
        assert_eq!(
            "colour".parse::<FilterFacet>(),
            Err(SpecError::UnknownFacet("colour".to_string()))
        );
    }

    #[test]
    fn test_query_spec_defaults() {
        let spec: QuerySpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec, QuerySpec::default());
        assert_eq!(spec.page, 1);
        assert_eq!(spec.page_size, 12);
        assert_eq!(spec.sort_key, SortKey::Relevance);
    }

    #[test]
    fn test_filter_set_toggle_and_count() {
        let mut filters = FilterSet::default();
        assert!(filters.is_empty());
        assert!(filters.toggle(FilterFacet::Brands, "Hager"));
        assert!(filters.toggle(FilterFacet::Availability, ON_SALE));
        assert_eq!(filters.active_count(), 2);
        assert!(!filters.toggle(FilterFacet::Brands, "Hager"));
        assert!(!filters.is_selected(FilterFacet::Brands, "Hager"));
        assert_eq!(filters.active_count(), 1);
        filters.clear();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_page_numbers_window() {
        assert_eq!(page(5, 10).page_numbers(5), vec![3, 4, 5, 6, 7]);
        assert_eq!(page(1, 10).page_numbers(5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page(10, 10).page_numbers(5), vec![6, 7, 8, 9, 10]);
        assert_eq!(page(2, 3).page_numbers(5), vec![1, 2, 3]);
    }

    #[test]
    fn test_page_navigation_flags() {
        assert!(!page(1, 1).has_prev());
        assert!(!page(1, 1).has_next());
        assert!(page(2, 3).has_prev());
        assert!(page(2, 3).has_next());
    }

    #[test]
    fn test_compare_tray_cap() {
        let mut tray = CompareTray::new();
        for n in 0..3 {
            let item = CatalogItem::new(format!("RCBO {}", n), "£20.00").with_id(n);
            assert_eq!(tray.toggle(&item), TrayOutcome::Added);
        }
        let extra = CatalogItem::new("RCBO 3", "£20.00").with_id(3);
        assert_eq!(tray.toggle(&extra), TrayOutcome::Full);
        assert_eq!(tray.len(), COMPARE_LIMIT);
        assert!(!tray.contains(&extra));
    }

    #[test]
    fn test_compare_tray_toggle_removes() {
        let mut tray = CompareTray::new();
        let item = CatalogItem::new("Isolator", "£12.00").with_id("7");
        tray.toggle(&item);
        let requeried = CatalogItem::new("Isolator", "£11.00").with_id(7);
        assert!(tray.contains(&requeried));
        assert_eq!(tray.toggle(&requeried), TrayOutcome::Removed);
        assert!(tray.is_empty());
    }
}
