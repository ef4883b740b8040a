//! Catalog filtering and sorting

use std::cmp::Ordering;

use clap::ValueEnum;

use crate::products::Product;

/// Order in which visible products are listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// Title, A to Z
    #[default]
    NameAsc,

    /// Title, Z to A
    NameDesc,

    /// Base price, lowest first
    PriceAsc,

    /// Base price, highest first
    PriceDesc,
}

impl SortOrder {
    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortOrder::NameAsc => a.title.cmp(&b.title),
            SortOrder::NameDesc => b.title.cmp(&a.title),
            SortOrder::PriceAsc => a.price.cmp(&b.price),
            SortOrder::PriceDesc => b.price.cmp(&a.price),
        }
    }
}

/// Search, category and sort selection applied to the loaded catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Free-text query, matched case-insensitively against title, description and brand
    pub query: String,

    /// Exact (case-sensitive) category to keep
    pub category: Option<String>,

    /// Sort order
    pub sort: SortOrder,
}

impl FilterState {
    /// Returns whether `product` passes the text and category filters.
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_category(product) && matches_query(&self.query.to_lowercase(), product)
    }

    fn matches_category(&self, product: &Product) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| product.category == category)
    }
}

/// Apply `state` to `catalog`, returning the visible products in display order.
///
/// The sort is stable, so products with equal keys keep their catalog order and
/// applying the same state to its own output changes nothing.
pub fn apply(catalog: &[Product], state: &FilterState) -> Vec<Product> {
    let query = state.query.to_lowercase();

    let mut visible: Vec<Product> = catalog
        .iter()
        .filter(|product| state.matches_category(product) && matches_query(&query, product))
        .cloned()
        .collect();

    visible.sort_by(|a, b| state.sort.compare(a, b));

    visible
}

fn matches_query(query: &str, product: &Product) -> bool {
    if query.is_empty() {
        return true;
    }

    product.title.to_lowercase().contains(query)
        || product.description.to_lowercase().contains(query)
        || product
            .brand
            .as_deref()
            .is_some_and(|brand| brand.to_lowercase().contains(query))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::products::ProductId;

    use super::*;

    fn product(id: u32, title: &str, price: i64, category: &str, brand: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            description: format!("{title} description"),
            price: Decimal::from(price),
            discount_percentage: Decimal::ZERO,
            rating: 4.5,
            stock: 10,
            brand: brand.map(str::to_string),
            category: category.to_string(),
            thumbnail: String::new(),
            images: Vec::new(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Banana", 3, "groceries", None),
            product(2, "iPhone 9", 549, "smartphones", Some("Apple")),
            product(3, "Apple", 2, "groceries", None),
            product(4, "Galaxy S8", 499, "smartphones", Some("Samsung")),
            product(5, "Lipstick", 12, "beauty", Some("Chic Cosmetics")),
        ]
    }

    fn titles(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn default_state_sorts_by_name() {
        let visible = apply(&catalog(), &FilterState::default());

        assert_eq!(
            titles(&visible),
            ["Apple", "Banana", "Galaxy S8", "Lipstick", "iPhone 9"]
        );
    }

    #[test]
    fn empty_catalog_yields_empty_result() {
        assert!(apply(&[], &FilterState::default()).is_empty());
    }

    #[test]
    fn query_matches_title_case_insensitively() {
        let state = FilterState {
            query: "GALAXY".to_string(),
            ..FilterState::default()
        };

        assert_eq!(titles(&apply(&catalog(), &state)), ["Galaxy S8"]);
    }

    #[test]
    fn query_matches_brand() {
        let state = FilterState {
            query: "apple".to_string(),
            ..FilterState::default()
        };

        // "Apple" by title, "iPhone 9" by brand.
        assert_eq!(titles(&apply(&catalog(), &state)), ["Apple", "iPhone 9"]);
    }

    #[test]
    fn query_matches_description() {
        let state = FilterState {
            query: "lipstick desc".to_string(),
            ..FilterState::default()
        };

        assert_eq!(titles(&apply(&catalog(), &state)), ["Lipstick"]);
    }

    #[test]
    fn missing_brand_only_fails_the_brand_field() {
        let state = FilterState {
            query: "banana".to_string(),
            ..FilterState::default()
        };

        assert_eq!(titles(&apply(&catalog(), &state)), ["Banana"]);
    }

    #[test]
    fn category_filter_is_exact_and_case_sensitive() {
        let state = FilterState {
            category: Some("groceries".to_string()),
            ..FilterState::default()
        };

        assert_eq!(titles(&apply(&catalog(), &state)), ["Apple", "Banana"]);

        let state = FilterState {
            category: Some("Groceries".to_string()),
            ..FilterState::default()
        };

        assert!(apply(&catalog(), &state).is_empty());
    }

    #[test]
    fn query_and_category_combine() {
        let state = FilterState {
            query: "s".to_string(),
            category: Some("smartphones".to_string()),
            sort: SortOrder::PriceDesc,
        };

        assert_eq!(titles(&apply(&catalog(), &state)), ["iPhone 9", "Galaxy S8"]);
    }

    #[test]
    fn price_ascending_uses_base_price() {
        let mut cheap_after_discount = product(1, "A", 100, "x", None);
        cheap_after_discount.discount_percentage = Decimal::from(90);

        let catalog = [cheap_after_discount, product(2, "B", 50, "x", None)];
        let state = FilterState {
            sort: SortOrder::PriceAsc,
            ..FilterState::default()
        };

        assert_eq!(titles(&apply(&catalog, &state)), ["B", "A"]);
    }

    #[test]
    fn name_descending() {
        let catalog = [
            product(1, "Apple", 1, "x", None),
            product(2, "Banana", 1, "x", None),
        ];
        let state = FilterState {
            sort: SortOrder::NameDesc,
            ..FilterState::default()
        };

        assert_eq!(titles(&apply(&catalog, &state)), ["Banana", "Apple"]);
    }

    #[test]
    fn equal_keys_keep_catalog_order() {
        let catalog = [
            product(1, "First", 10, "x", None),
            product(2, "Second", 10, "x", None),
            product(3, "Third", 10, "x", None),
        ];

        for sort in [SortOrder::PriceAsc, SortOrder::PriceDesc] {
            let state = FilterState {
                sort,
                ..FilterState::default()
            };

            assert_eq!(
                titles(&apply(&catalog, &state)),
                ["First", "Second", "Third"],
                "ties must keep their order for {sort:?}"
            );
        }
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let states = [
            FilterState::default(),
            FilterState {
                query: "a".to_string(),
                category: None,
                sort: SortOrder::PriceDesc,
            },
            FilterState {
                query: String::new(),
                category: Some("smartphones".to_string()),
                sort: SortOrder::NameDesc,
            },
        ];

        for state in states {
            let once = apply(&catalog(), &state);
            let twice = apply(&once, &state);

            assert_eq!(once, twice, "re-applying {state:?} changed the result");
        }
    }

    #[test]
    fn matches_agrees_with_apply() {
        let state = FilterState {
            query: "phone".to_string(),
            ..FilterState::default()
        };

        let matching: Vec<_> = catalog().into_iter().filter(|p| state.matches(p)).collect();

        assert_eq!(titles(&matching), ["iPhone 9"]);
    }
}
