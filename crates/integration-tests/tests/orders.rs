//! Integration tests for orders, contacts and line items.
//!
//! These tests require:
//! - A running `PostgreSQL` database reachable via `MARKETPLACE_DATABASE_URL`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use marketplace_core::{ContactId, OrderState};
use marketplace_integration_tests::TestContext;
use marketplace_store::db::{ContactRepository, OrderRepository, RepositoryError};
use marketplace_store::models::ContactDetails;

fn address() -> ContactDetails {
    ContactDetails {
        city: "Moscow".to_owned(),
        street: "Tverskaya".to_owned(),
        house: "1".to_owned(),
        phone: "+7 900 000 00 00".to_owned(),
        ..ContactDetails::default()
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (MARKETPLACE_DATABASE_URL)"]
async fn test_newest_order_is_listed_first() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("orders").await;
    let orders = OrderRepository::new(&ctx.pool);

    let older = orders.create(user.id, OrderState::New, None).await.unwrap();
    let basket = orders
        .create(user.id, OrderState::Basket, None)
        .await
        .unwrap();

    let listed = orders.list_for_user(user.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, basket.id);
    assert_eq!(listed[0].state, OrderState::Basket);
    assert_eq!(listed[1].id, older.id);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (MARKETPLACE_DATABASE_URL)"]
async fn test_order_lifecycle() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("lifecycle").await;
    let orders = OrderRepository::new(&ctx.pool);
    let order = orders
        .create(user.id, OrderState::Basket, None)
        .await
        .unwrap();

    // Skipping a step is rejected and leaves the state untouched.
    let skipped = orders.transition(order.id, OrderState::Sent).await;
    assert!(matches!(skipped, Err(RepositoryError::Validation(e)) if e.field == "state"));
    assert_eq!(
        orders.get(order.id).await.unwrap().unwrap().state,
        OrderState::Basket
    );

    for state in [OrderState::New, OrderState::Confirmed, OrderState::Assembled] {
        let moved = orders.transition(order.id, state).await.unwrap();
        assert_eq!(moved.state, state);
    }

    let canceled = orders
        .transition(order.id, OrderState::Canceled)
        .await
        .unwrap();
    assert_eq!(canceled.state, OrderState::Canceled);

    assert!(
        orders
            .transition(order.id, OrderState::New)
            .await
            .is_err()
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (MARKETPLACE_DATABASE_URL)"]
async fn test_transition_of_missing_order() {
    let ctx = TestContext::new().await;
    let orders = OrderRepository::new(&ctx.pool);

    let result = orders
        .transition(marketplace_core::OrderId::new(-1), OrderState::New)
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (MARKETPLACE_DATABASE_URL)"]
async fn test_order_contact_must_belong_to_user() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_user("owner").await;
    let stranger = ctx.create_user("stranger").await;
    let contacts = ContactRepository::new(&ctx.pool);
    let orders = OrderRepository::new(&ctx.pool);

    let contact = contacts.create(owner.id, &address()).await.unwrap();

    let own = orders
        .create(owner.id, OrderState::New, Some(contact.id))
        .await
        .unwrap();
    assert_eq!(own.contact_id, Some(contact.id));

    let foreign = orders
        .create(stranger.id, OrderState::New, Some(contact.id))
        .await;
    assert!(matches!(foreign, Err(RepositoryError::Validation(e)) if e.field == "contact_id"));

    let basket = orders
        .create(stranger.id, OrderState::Basket, None)
        .await
        .unwrap();
    let attach = orders.set_contact(basket.id, Some(contact.id)).await;
    assert!(matches!(attach, Err(RepositoryError::Validation(_))));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (MARKETPLACE_DATABASE_URL)"]
async fn test_contact_is_scoped_to_user() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_user("scoped").await;
    let stranger = ctx.create_user("scoped-other").await;
    let contacts = ContactRepository::new(&ctx.pool);

    let contact = contacts.create(owner.id, &address()).await.unwrap();

    assert!(!contacts.delete(stranger.id, contact.id).await.unwrap());
    assert!(contacts.get(contact.id).await.unwrap().is_some());
    assert!(contacts.delete(owner.id, contact.id).await.unwrap());
    assert!(contacts.get(contact.id).await.unwrap().is_none());
    assert!(contacts.get(ContactId::new(-1)).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (MARKETPLACE_DATABASE_URL)"]
async fn test_order_items_follow_listing() {
    let ctx = TestContext::new().await;
    let buyer = ctx.create_user("buyer").await;
    let (_, shop) = ctx.create_shop("Gadgets").await;
    let (product, listing) = ctx.create_listing(&shop).await;
    let orders = OrderRepository::new(&ctx.pool);

    let order = orders
        .create(buyer.id, OrderState::Basket, None)
        .await
        .unwrap();
    let item = orders.add_item(order.id, listing.id, 2).await.unwrap();

    assert_eq!(item.product_id, product.id);
    assert_eq!(item.shop_id, shop.id);
    assert_eq!(item.quantity, 2);

    let negative = orders.add_item(order.id, listing.id, -1).await;
    assert!(matches!(negative, Err(RepositoryError::Validation(e)) if e.field == "quantity"));

    let items = orders.items(order.id).await.unwrap();
    assert_eq!(items.len(), 1);

    assert!(orders.remove_item(item.id).await.unwrap());
    assert!(orders.items(order.id).await.unwrap().is_empty());
}
