//! End-to-end storefront flow: browse, fill the cart and favorites, restart,
//! and check out, with a mocked catalog and an on-disk mirror.

use std::sync::Arc;

use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use storefront::{
    catalog::MockCatalogApi,
    checkout::CheckoutDetails,
    context::AppContext,
    database,
    filters::SortOrder,
    products::{Product, ProductId, ProductPage},
};
use testresult::TestResult;

fn product(id: u32, title: &str, price: u32, discount: u32) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        description: format!("{title} for every day"),
        price: Decimal::from(price),
        discount_percentage: Decimal::from(discount),
        rating: 4.0,
        stock: 3,
        brand: None,
        category: "essentials".to_string(),
        thumbnail: format!("https://cdn.example.com/{id}.png"),
        images: Vec::new(),
    }
}

fn catalog() -> Vec<Product> {
    vec![
        product(1, "Kettle", 100, 0),
        product(2, "Mug", 50, 50),
        product(3, "Teapot", 80, 0),
    ]
}

fn api() -> MockCatalogApi {
    let mut api = MockCatalogApi::new();

    api.expect_products().returning(|_| {
        Ok(ProductPage {
            products: catalog(),
            total: 3,
            skip: 0,
            limit: 30,
        })
    });

    api
}

async fn open(url: &str) -> Result<AppContext, Box<dyn std::error::Error>> {
    let pool = database::connect(url).await?;

    Ok(AppContext::with_parts(Arc::new(api()), pool, 30, iso::USD).await?)
}

#[tokio::test]
async fn cart_and_favorites_survive_restart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}", dir.path().join("storefront.db").display());

    let mut app = open(&url).await?;

    app.catalog.load_first_page().await?;
    app.catalog.set_sort(SortOrder::PriceAsc);

    let visible: Vec<String> = app.catalog.visible().into_iter().map(|p| p.title).collect();
    assert_eq!(visible, ["Mug", "Teapot", "Kettle"]);

    let kettle = app.catalog.fetch_product(ProductId::new(1)).await?;
    let mug = app.catalog.fetch_product(ProductId::new(2)).await?;

    app.cart.add(&kettle, 1);
    app.cart.add(&mug, 2);
    app.favorites.add(&mug);
    app.favorites.add(&mug);

    assert_eq!(app.cart.total_quantity(), 3);
    assert_eq!(app.cart.summary().total, Decimal::from(135));

    app.shutdown().await?;

    let mut app = open(&url).await?;

    assert_eq!(app.cart.len(), 2);
    assert_eq!(app.cart.quantity_of(mug.id), 2);
    assert_eq!(app.cart.summary().discount, Decimal::from(15));
    assert_eq!(app.favorites.len(), 1);
    assert!(app.favorites.contains(mug.id));

    // Stock is not enforced.
    app.cart.add(&kettle, 10);
    assert_eq!(app.cart.quantity_of(kettle.id), 11);

    let receipt = app.checkout(&CheckoutDetails {
        name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        phone: "+1 555 010 0199".to_string(),
    })?;

    // 11 x 100 + 2 x 25 = 1150, 15% off.
    assert_eq!(receipt.subtotal(), Money::from_minor(115_000, iso::USD));
    assert_eq!(receipt.total(), Money::from_minor(97_750, iso::USD));
    assert!(app.cart.is_empty());

    app.shutdown().await?;

    let app = open(&url).await?;

    assert!(app.cart.is_empty(), "checkout clears the persisted cart");
    assert_eq!(app.favorites.len(), 1);

    app.shutdown().await?;

    Ok(())
}

#[tokio::test]
async fn ids_continue_after_restart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}", dir.path().join("storefront.db").display());

    let mut app = open(&url).await?;

    let [kettle, mug, teapot] = <[Product; 3]>::try_from(catalog()).map_err(|_rest| "catalog size")?;

    app.cart.add(&kettle, 1);
    let second = app.cart.add(&mug, 1).ok_or("line not created")?;
    app.cart.remove(second);

    app.shutdown().await?;

    let mut app = open(&url).await?;

    let third = app.cart.add(&teapot, 1).ok_or("line not created")?;

    // Line 2 was removed before the restart, so the counter restarts after line 1.
    assert_eq!(third.get(), 2);

    app.shutdown().await?;

    Ok(())
}
