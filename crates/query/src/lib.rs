//! Catalog query engine.
//!
//! Turns a raw item snapshot plus a `QuerySpec` into one `ResultPage`:
//! filter, then sort, then paginate. Every step is a pure transform; no
//! state survives between calls and malformed input degrades to a safe
//! default instead of an error.

use elecmat_features::{in_price_range, matches_text, parse_price, BrandExtractor, LeadingWord};
use elecmat_model::{CatalogItem, FilterFacet, FilterSet, QuerySpec, ResultPage, SortKey, ON_SALE};
use elecmat_rank::sort_items;
use std::borrow::Borrow;

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Requested page sizes above this are capped; `None` honours any size
    pub max_page_size: Option<usize>,
}

impl EngineConfig {
    /// Configuration that caps page sizes at `max`.
    pub fn capped(max: usize) -> Self {
        Self {
            max_page_size: Some(max),
        }
    }
}

/// Number of pages `total_items` fills at `page_size`, never less than one.
pub fn page_count(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

/// Whether an item passes every filter stage.
///
/// Stages are AND-composed; values selected within one stage are OR-composed.
/// An empty stage passes everything.
pub fn matches(
    item: &CatalogItem,
    search_term: &str,
    filters: &FilterSet,
    brands: &dyn BrandExtractor,
) -> bool {
    let needle = search_term.to_lowercase();
    passes(item, &needle, filters, brands)
}

fn passes(
    item: &CatalogItem,
    needle: &str,
    filters: &FilterSet,
    brands: &dyn BrandExtractor,
) -> bool {
    if !needle.is_empty() && !matches_text(item, needle) {
        return false;
    }

    if !filters.brands.is_empty() {
        let brand = brands.brand(item);
        if !brand.is_some_and(|b| filters.brands.contains(&b)) {
            return false;
        }
    }

    if !filters.price_ranges.is_empty() {
        // Zero means unknown; it cannot prove membership in any bucket
        let price = parse_price(&item.price);
        if price == 0.0 || !filters.price_ranges.iter().any(|r| in_price_range(price, r)) {
            return false;
        }
    }

    if !filters.availability.is_empty() {
        let by_stock = item
            .stock_status
            .as_ref()
            .is_some_and(|s| filters.availability.contains(s.label()));
        let by_sale = item.is_on_sale && filters.availability.contains(ON_SALE);
        if !(by_stock || by_sale) {
            return false;
        }
    }

    if !filters.suppliers.is_empty() {
        let supplier = item.supplier.as_deref();
        if !supplier.is_some_and(|s| filters.suppliers.contains(s)) {
            return false;
        }
    }

    true
}

/// Narrow `items` to those passing every stage, in input order.
pub fn apply_filters<'a>(
    items: &'a [CatalogItem],
    search_term: &str,
    filters: &FilterSet,
) -> Vec<&'a CatalogItem> {
    apply_filters_with(items, search_term, filters, &LeadingWord)
}

/// Same as [`apply_filters`] with a caller-supplied brand strategy.
pub fn apply_filters_with<'a>(
    items: &'a [CatalogItem],
    search_term: &str,
    filters: &FilterSet,
    brands: &dyn BrandExtractor,
) -> Vec<&'a CatalogItem> {
    let needle = search_term.to_lowercase();
    items
        .iter()
        .filter(|item| passes(item, &needle, filters, brands))
        .collect()
}

/// Cut one page out of an already filtered and sorted sequence.
///
/// The requested page is clamped into `[1, total_pages]`, and an empty input
/// is still page 1 of 1. A page size of 0 is treated as 1.
pub fn paginate<T: Borrow<CatalogItem>>(items: &[T], page: usize, page_size: usize) -> ResultPage {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = page_count(total_items, page_size);
    let current_page = page.clamp(1, total_pages);
    let start_index = ((current_page - 1) * page_size).min(total_items);
    let end_index = (start_index + page_size).min(total_items);

    ResultPage {
        items: items[start_index..end_index]
            .iter()
            .map(|item| {
                let item: &CatalogItem = item.borrow();
                item.clone()
            })
            .collect(),
        total_items,
        total_pages,
        current_page,
        start_index,
        end_index,
    }
}

/// Query engine with a configurable page-size policy and brand strategy.
#[derive(Debug, Clone)]
pub struct Engine<B = LeadingWord> {
    config: EngineConfig,
    brands: B,
}

impl Engine<LeadingWord> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            brands: LeadingWord,
        }
    }
}

impl Default for Engine<LeadingWord> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<B: BrandExtractor> Engine<B> {
    /// Replace the brand strategy.
    pub fn with_brand_extractor<C: BrandExtractor>(self, brands: C) -> Engine<C> {
        Engine {
            config: self.config,
            brands,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn brand_extractor(&self) -> &B {
        &self.brands
    }

    /// Page size actually applied for a requested size.
    ///
    /// Zero is treated as 1, matching [`paginate`].
    pub fn effective_page_size(&self, requested: usize) -> usize {
        let size = requested.max(1);
        match self.config.max_page_size {
            Some(max) => size.min(max.max(1)),
            None => size,
        }
    }

    /// Filter, sort and paginate `items` according to `spec`.
    pub fn run(&self, items: &[CatalogItem], spec: &QuerySpec) -> ResultPage {
        let filtered = apply_filters_with(items, &spec.search_term, &spec.filters, &self.brands);
        let matched = filtered.len();
        let sorted = sort_items(filtered, spec.sort_key);
        let page = paginate(&sorted, spec.page, self.effective_page_size(spec.page_size));

        tracing::debug!(
            candidates = items.len(),
            matched,
            sort = %spec.sort_key,
            page = page.current_page,
            total_pages = page.total_pages,
            "Catalog query"
        );

        page
    }
}

/// Run a query with the default engine, honouring the requested page size.
pub fn query(items: &[CatalogItem], spec: &QuerySpec) -> ResultPage {
    Engine::new(EngineConfig::default()).run(items, spec)
}

/// View state of a listing screen driving the engine.
///
/// Changing what is matched sends the listing back to page 1; changing the
/// page size keeps the current page valid for the new size.
#[derive(Debug, Clone, Default)]
pub struct ListingState {
    spec: QuerySpec,
    last_total: Option<usize>,
}

impl ListingState {
    pub fn new(spec: QuerySpec) -> Self {
        Self {
            spec,
            last_total: None,
        }
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// Total matched by the most recent run.
    pub fn last_total(&self) -> Option<usize> {
        self.last_total
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.spec.search_term = term.into();
        self.spec.page = 1;
    }

    /// Returns true if the value is now selected.
    pub fn toggle_filter(&mut self, facet: FilterFacet, value: impl Into<String>) -> bool {
        self.spec.page = 1;
        self.spec.filters.toggle(facet, value)
    }

    pub fn clear_filters(&mut self) {
        self.spec.filters.clear();
        self.spec.page = 1;
    }

    pub fn set_sort(&mut self, sort_key: SortKey) {
        self.spec.sort_key = sort_key;
        self.spec.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.spec.page = page;
    }

    /// Change the page size, keeping the current page valid for the size
    /// `engine` will actually apply.
    pub fn set_page_size<B: BrandExtractor>(&mut self, engine: &Engine<B>, page_size: usize) {
        self.spec.page_size = page_size;
        if let Some(total) = self.last_total {
            let total_pages = page_count(total, engine.effective_page_size(page_size));
            self.spec.page = self.spec.page.clamp(1, total_pages);
        }
    }

    pub fn active_filter_count(&self) -> usize {
        self.spec.filters.active_count()
    }

    /// Execute the current query and adopt the clamped page.
    pub fn run<B: BrandExtractor>(&mut self, engine: &Engine<B>, items: &[CatalogItem]) -> ResultPage {
        let page = engine.run(items, &self.spec);
        self.spec.page = page.current_page;
        self.last_total = Some(page.total_items);
        page
    }
}
