//! Shared test fixtures

use rust_decimal::Decimal;

use crate::products::{Product, ProductId};

/// A product with the given id, title, base price and discount percentage.
pub(crate) fn product(id: u32, title: &str, price: Decimal, discount_percentage: Decimal) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        description: format!("{title} description"),
        price,
        discount_percentage,
        rating: 4.5,
        stock: 10,
        brand: Some("Acme".to_string()),
        category: "general".to_string(),
        thumbnail: format!("https://cdn.example.com/{id}/thumbnail.png"),
        images: vec![format!("https://cdn.example.com/{id}/1.png")],
    }
}
