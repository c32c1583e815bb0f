//! Field helpers for catalog matching and ordering.
//!
//! Provides pure functions over `CatalogItem` fields:
//! - Price parsing from display text
//! - Price-range bucket membership
//! - Case-insensitive text matching
//! - Brand extraction strategies
//! - Accent- and case-aware collation for name/supplier ordering

use elecmat_model::CatalogItem;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Parse a display price such as `"£1,234.56"` into a number.
///
/// Takes the first run of digits (with thousands separators and an optional
/// decimal part) and ignores everything around it. Returns `0.0` when no
/// number is found.
pub fn parse_price(text: &str) -> f64 {
    let Some(start) = text.find(|c: char| c.is_ascii_digit()) else {
        return 0.0;
    };

    let rest = &text[start..];
    let mut digits = String::with_capacity(rest.len());
    let mut chars = rest.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '0'..='9' => digits.push(c),
            ',' => {}
            _ => break,
        }
        chars.next();
    }

    if chars.next() == Some('.') {
        let fraction: String = chars.take_while(|c| c.is_ascii_digit()).collect();
        if !fraction.is_empty() {
            digits.push('.');
            digits.push_str(&fraction);
        }
    }

    digits.parse().unwrap_or(0.0)
}

/// Named price interval used for coarse filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceBucket {
    Under50,
    From50To200,
    From200To500,
    Over500,
}

impl PriceBucket {
    /// In display order.
    pub const ALL: [PriceBucket; 4] = [
        PriceBucket::Under50,
        PriceBucket::From50To200,
        PriceBucket::From200To500,
        PriceBucket::Over500,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Under50 => "Under £50",
            Self::From50To200 => "£50 - £200",
            Self::From200To500 => "£200 - £500",
            Self::Over500 => "Over £500",
        }
    }

    /// Exact, case-sensitive label lookup.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == label)
    }

    pub fn contains(&self, price: f64) -> bool {
        match self {
            Self::Under50 => price < 50.0,
            Self::From50To200 => (50.0..=200.0).contains(&price),
            Self::From200To500 => (200.0..=500.0).contains(&price),
            Self::Over500 => price > 500.0,
        }
    }
}

/// Whether `price` falls in the bucket named `label`.
///
/// Unknown labels match nothing.
pub fn in_price_range(price: f64, label: &str) -> bool {
    PriceBucket::from_label(label).is_some_and(|b| b.contains(price))
}

/// Case-insensitive substring match against name, supplier, category and
/// highlights. `needle` must already be lowercased.
pub fn matches_text(item: &CatalogItem, needle: &str) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(needle);

    hit(item.name.as_str())
        || item.supplier.as_deref().is_some_and(hit)
        || hit(item.category.as_str())
        || item.highlights.iter().any(|h| hit(h.as_str()))
}

/// Strategy deriving a brand facet value from an item.
///
/// Snapshots carry no brand field, so the brand is computed. Swap the
/// strategy to change what "brand" means without touching the filters.
pub trait BrandExtractor {
    fn brand(&self, item: &CatalogItem) -> Option<String>;
}

/// First whitespace-delimited word of the item name.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadingWord;

impl BrandExtractor for LeadingWord {
    fn brand(&self, item: &CatalogItem) -> Option<String> {
        item.name.split_whitespace().next().map(str::to_string)
    }
}

impl<F> BrandExtractor for F
where
    F: Fn(&CatalogItem) -> Option<String>,
{
    fn brand(&self, item: &CatalogItem) -> Option<String> {
        self(item)
    }
}

/// Locale-style string ordering for names and suppliers.
///
/// Compares in levels: base letters ignoring accents and case, then
/// accents, then case with lower case first. Raw text breaks any remaining
/// tie so the order is total.
pub fn collate(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented(a).cmp(accented(b)))
        .then_with(|| case_pattern(a).cmp(case_pattern(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn accented(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

// false sorts first, so lower case precedes upper case
fn case_pattern(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("£1,234.50"), 1234.50);
        assert_eq!(parse_price("£49.99"), 49.99);
        assert_eq!(parse_price("£12"), 12.0);
        assert_eq!(parse_price("£1,000,000"), 1_000_000.0);
        assert_eq!(parse_price("From £7.20 inc VAT"), 7.20);
    }

    #[test]
    fn test_parse_price_unparsable() {
        assert_eq!(parse_price("N/A"), 0.0);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("£"), 0.0);
    }

    #[test]
    fn test_parse_price_trailing_dot() {
        assert_eq!(parse_price("£15."), 15.0);
    }

    #[test]
    fn test_bucket_boundaries() {
        assert!(in_price_range(49.99, "Under £50"));
        assert!(!in_price_range(50.0, "Under £50"));
        assert!(in_price_range(50.0, "£50 - £200"));
        assert!(in_price_range(200.0, "£50 - £200"));
        assert!(in_price_range(200.0, "£200 - £500"));
        assert!(in_price_range(500.0, "£200 - £500"));
        assert!(!in_price_range(500.0, "Over £500"));
        assert!(in_price_range(500.01, "Over £500"));
    }

    #[test]
    fn test_unknown_bucket_fails_closed() {
        assert!(!in_price_range(10.0, "Under £20"));
        assert!(!in_price_range(10.0, "under £50"));
        assert_eq!(PriceBucket::from_label(""), None);
    }

    #[test]
    fn test_matches_text_fields() {
        let item = CatalogItem::new("Hager 10A MCB", "£4.50")
            .with_category("Protection")
            .with_supplier("City Electrical Factors")
            .with_highlights(vec!["Type B curve".to_string()]);

        assert!(matches_text(&item, "hager"));
        assert!(matches_text(&item, "electrical"));
        assert!(matches_text(&item, "protect"));
        assert!(matches_text(&item, "type b"));
        assert!(!matches_text(&item, "rcbo"));
    }

    #[test]
    fn test_matches_text_missing_supplier() {
        let item = CatalogItem::new("Junction box", "£2.00");
        assert!(!matches_text(&item, "screwfix"));
    }

    #[test]
    fn test_leading_word_brand() {
        let item = CatalogItem::new("  Schneider Electric RCD", "£40.00");
        assert_eq!(LeadingWord.brand(&item), Some("Schneider".to_string()));
        assert_eq!(LeadingWord.brand(&CatalogItem::new("", "£1")), None);
    }

    #[test]
    fn test_closure_brand_strategy() {
        let by_supplier = |item: &CatalogItem| item.supplier.clone();
        let item = CatalogItem::new("Cable", "£1").with_supplier("Toolstation");
        assert_eq!(by_supplier.brand(&item), Some("Toolstation".to_string()));
    }

    #[test]
    fn test_collate() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("cable", "Cable"), Ordering::Less);
        assert_eq!(collate("Cable", "cable"), Ordering::Greater);
        assert_eq!(collate("same", "same"), Ordering::Equal);
        assert_eq!(collate("", "a"), Ordering::Less);
    }

    #[test]
    fn test_collate_accents() {
        assert_eq!(collate("Élan socket", "Zeta gland"), Ordering::Less);
        assert_eq!(collate("ecran", "écran"), Ordering::Less);
        assert_eq!(collate("cote", "côte"), Ordering::Less);
        assert_eq!(collate("côte", "coté"), Ordering::Greater);
        assert_eq!(collate("Ångström", "angstrom"), Ordering::Greater);
    }
}
