//! Integration tests for the generic admin site.
//!
//! These tests require:
//! - A running `PostgreSQL` database reachable via `MARKETPLACE_DATABASE_URL`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::{Map, Value, json};

use marketplace_core::OrderState;
use marketplace_integration_tests::TestContext;
use marketplace_store::admin::{AdminError, AdminSite, ENTITIES};
use marketplace_store::db::OrderRepository;

fn changes(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (MARKETPLACE_DATABASE_URL)"]
async fn test_every_entity_can_be_listed_and_counted() {
    let ctx = TestContext::new().await;
    ctx.create_user("admin-list").await;
    let site = AdminSite::new(&ctx.pool);

    for meta in ENTITIES {
        let rows = site.list(meta.name, 5, 0).await.unwrap();
        assert!(rows.len() <= 5, "{}", meta.name);
        for row in &rows {
            let object = row.as_object().unwrap();
            assert_eq!(object.len(), meta.list_display.len(), "{}", meta.name);
        }
        assert!(site.count(meta.name).await.unwrap() >= 0);
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (MARKETPLACE_DATABASE_URL)"]
async fn test_show_hides_password() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("admin-show").await;
    let site = AdminSite::new(&ctx.pool);

    let row = site.get("user", user.id.as_i32()).await.unwrap().unwrap();
    assert_eq!(row["email"], Value::from(user.email.as_str()));
    assert_eq!(row["is_active"], Value::from(false));
    assert!(row.get("password").is_none());

    assert!(site.get("user", -1).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (MARKETPLACE_DATABASE_URL)"]
async fn test_edit_order_state() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("admin-edit").await;
    let order = OrderRepository::new(&ctx.pool)
        .create(user.id, OrderState::Basket, None)
        .await
        .unwrap();
    let site = AdminSite::new(&ctx.pool);
    let id = order.id.as_i32();

    let row = site
        .update("order", id, &changes(json!({"state": "delivered"})))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row["state"], Value::from("delivered"));

    let invalid = site
        .update("order", id, &changes(json!({"state": "lost"})))
        .await;
    assert!(matches!(invalid, Err(AdminError::Validation(_))));

    let read_only = site
        .update("order", id, &changes(json!({"user_id": 1})))
        .await;
    assert!(matches!(read_only, Err(AdminError::Validation(e)) if e.message.contains("user_id")));

    let missing = site
        .update("order", -1, &changes(json!({"state": "new"})))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (MARKETPLACE_DATABASE_URL)"]
async fn test_edit_rejects_constraint_violation() {
    let ctx = TestContext::new().await;
    let (_, shop) = ctx.create_shop("Admin").await;
    let (_, listing) = ctx.create_listing(&shop).await;
    let site = AdminSite::new(&ctx.pool);

    let result = site
        .update(
            "product_info",
            listing.id.as_i32(),
            &changes(json!({"price": -5})),
        )
        .await;
    assert!(matches!(result, Err(AdminError::Validation(e)) if e.field == "price"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (MARKETPLACE_DATABASE_URL)"]
async fn test_delete_cascades() {
    let ctx = TestContext::new().await;
    let (owner, shop) = ctx.create_shop("Gone").await;
    let site = AdminSite::new(&ctx.pool);

    assert!(site.delete("user", owner.id.as_i32()).await.unwrap());
    assert!(site.get("shop", shop.id.as_i32()).await.unwrap().is_none());
    assert!(!site.delete("user", owner.id.as_i32()).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (MARKETPLACE_DATABASE_URL)"]
async fn test_unknown_entity() {
    let ctx = TestContext::new().await;
    let site = AdminSite::new(&ctx.pool);

    assert!(matches!(
        site.count("person").await,
        Err(AdminError::UnknownEntity(name)) if name == "person"
    ));
}
