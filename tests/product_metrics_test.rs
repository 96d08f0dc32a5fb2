mod common;

use assert_matches::assert_matches;
use common::TestApp;
use inventory_api::{
    errors::ServiceError,
    services::{ItemParams, ProductParams},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn item(status: &str) -> ItemParams {
    ItemParams {
        size: Some("M".into()),
        color: Some("heather".into()),
        status: Some(status.into()),
    }
}

#[tokio::test]
async fn stored_prices_give_exact_margin() {
    let app = TestApp::new().await;
    let product = app
        .state
        .services
        .products
        .create(ProductParams {
            sku: Some("TEE-1".into()),
            wholesale: Some("10.00".into()),
            retail: Some("15.00".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(product.margin().unwrap(), dec!(100) / dec!(3));
}

#[tokio::test]
async fn half_sold_items_give_one_half() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let product = services
        .products
        .create(ProductParams {
            sku: Some("TEE-1".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    for _ in 0..5 {
        services.items.create(&product, item("sold")).await.unwrap();
        services.items.create(&product, item("unsold")).await.unwrap();
    }

    assert_eq!(
        services.products.sell_through(product.id).await.unwrap(),
        dec!(0.5)
    );
}

#[tokio::test]
async fn sell_through_follows_status_changes() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let product = services
        .products
        .create(ProductParams {
            sku: Some("TEE-1".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let first = services.items.create(&product, item("unsold")).await.unwrap();
    services.items.create(&product, item("unsold")).await.unwrap();
    services.items.create(&product, item("sold")).await.unwrap();
    assert_eq!(
        services.products.sell_through(product.id).await.unwrap(),
        Decimal::ONE / dec!(3)
    );

    services
        .items
        .update(
            first,
            ItemParams {
                status: Some("sold".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(
        services.products.sell_through(product.id).await.unwrap(),
        dec!(2) / dec!(3)
    );
}

#[tokio::test]
async fn product_without_items_has_no_sell_through() {
    let app = TestApp::new().await;
    let product = app
        .state
        .services
        .products
        .create(ProductParams {
            sku: Some("EMPTY".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_matches!(
        app.state.services.products.sell_through(product.id).await,
        Err(ServiceError::InvalidState(_))
    );
}

#[tokio::test]
async fn zero_retail_has_no_margin() {
    let app = TestApp::new().await;
    let product = app
        .state
        .services
        .products
        .create(ProductParams {
            sku: Some("FREE".into()),
            wholesale: Some("2".into()),
            retail: Some("0".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_matches!(product.margin(), Err(ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn delete_reports_removed_items() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let product = services
        .products
        .create(ProductParams {
            sku: Some("TEE-1".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    services.items.create(&product, item("sold")).await.unwrap();
    services.items.create(&product, item("sold")).await.unwrap();

    assert_eq!(services.products.delete(product.id).await.unwrap(), 2);
    assert_matches!(
        services.products.delete(product.id).await,
        Err(ServiceError::NotFound(_))
    );
}
