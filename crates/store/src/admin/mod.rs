//! Administrative registry.
//!
//! Every entity of the `market` schema is described once in [`ENTITIES`].
//! [`AdminSite`] performs list/show/edit/delete generically from that
//! description, so adding an entity to the admin means adding one entry here.

pub mod site;

use serde::Serialize;

pub use site::{AdminError, AdminSite};

/// Admin description of one table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntityMeta {
    /// Registry key, used on the command line.
    pub name: &'static str,
    /// Fully qualified table name.
    pub table: &'static str,
    /// Human-readable singular label.
    pub verbose_name: &'static str,
    /// Human-readable plural label.
    pub verbose_name_plural: &'static str,
    /// Columns shown in list views, in display order.
    pub list_display: &'static [&'static str],
    /// Columns the admin may change.
    pub editable: &'static [&'static str],
    /// Columns never returned by the admin.
    pub hidden: &'static [&'static str],
    /// `ORDER BY` clause of list views.
    pub ordering: &'static str,
}

impl EntityMeta {
    /// Whether the admin may write `column`.
    #[must_use]
    pub fn is_editable(&self, column: &str) -> bool {
        self.editable.contains(&column)
    }
}

/// All registered entities.
pub static ENTITIES: &[EntityMeta] = &[
    EntityMeta {
        name: "user",
        table: "market.user",
        verbose_name: "user",
        verbose_name_plural: "users",
        list_display: &["id", "email", "first_name", "last_name", "type", "is_active"],
        editable: &[
            "first_name",
            "last_name",
            "date_of_birth",
            "company",
            "position",
            "is_active",
            "is_staff",
            "is_superuser",
            "type",
        ],
        hidden: &["password"],
        ordering: "email",
    },
    EntityMeta {
        name: "shop",
        table: "market.shop",
        verbose_name: "shop",
        verbose_name_plural: "shops",
        list_display: &["id", "name", "url", "state", "user_id"],
        editable: &["name", "url", "state"],
        hidden: &[],
        ordering: "name, id",
    },
    EntityMeta {
        name: "category",
        table: "market.category",
        verbose_name: "category",
        verbose_name_plural: "categories",
        list_display: &["id", "name"],
        editable: &["name"],
        hidden: &[],
        ordering: "name, id",
    },
    EntityMeta {
        name: "product",
        table: "market.product",
        verbose_name: "product",
        verbose_name_plural: "products",
        list_display: &["id", "name", "model", "category_id"],
        editable: &["name", "model", "category_id"],
        hidden: &[],
        ordering: "name, id",
    },
    EntityMeta {
        name: "parameter",
        table: "market.parameter",
        verbose_name: "parameter",
        verbose_name_plural: "parameters",
        list_display: &["id", "name"],
        editable: &["name"],
        hidden: &[],
        ordering: "name, id",
    },
    EntityMeta {
        name: "product_info",
        table: "market.product_info",
        verbose_name: "product info",
        verbose_name_plural: "product infos",
        list_display: &["id", "product_id", "shop_id", "quantity", "price", "price_rrc"],
        editable: &["quantity", "price", "price_rrc"],
        hidden: &[],
        ordering: "id",
    },
    EntityMeta {
        name: "product_parameter",
        table: "market.product_parameter",
        verbose_name: "product parameter",
        verbose_name_plural: "product parameters",
        list_display: &["id", "product_info_id", "parameter_id", "value"],
        editable: &["value"],
        hidden: &[],
        ordering: "id",
    },
    EntityMeta {
        name: "contact",
        table: "market.contact",
        verbose_name: "user contact",
        verbose_name_plural: "user contacts",
        list_display: &["id", "user_id", "city", "street", "house", "phone"],
        editable: &[
            "city",
            "street",
            "house",
            "structure",
            "building",
            "apartment",
            "phone",
        ],
        hidden: &[],
        ordering: "id",
    },
    EntityMeta {
        name: "order",
        table: "market.order",
        verbose_name: "order",
        verbose_name_plural: "orders",
        list_display: &["id", "user_id", "state", "created_at", "contact_id"],
        editable: &["state", "contact_id"],
        hidden: &[],
        ordering: "created_at DESC, id DESC",
    },
    EntityMeta {
        name: "order_item",
        table: "market.order_item",
        verbose_name: "item in an order",
        verbose_name_plural: "items in orders",
        list_display: &["id", "order_id", "product_info_id", "quantity"],
        editable: &["quantity"],
        hidden: &[],
        ordering: "order_id, id",
    },
    EntityMeta {
        name: "confirm_email_token",
        table: "market.confirm_email_token",
        verbose_name: "email confirmation token",
        verbose_name_plural: "email confirmation tokens",
        list_display: &["id", "user_id", "key", "created_at"],
        editable: &["user_id"],
        hidden: &[],
        ordering: "created_at DESC, id DESC",
    },
];

/// Look an entity up by registry key.
#[must_use]
pub fn entity(name: &str) -> Option<&'static EntityMeta> {
    ENTITIES.iter().find(|meta| meta.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_is_registered_once() {
        assert_eq!(ENTITIES.len(), 11);

        let mut names: Vec<&str> = ENTITIES.iter().map(|meta| meta.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ENTITIES.len());
    }

    #[test]
    fn test_entity_lookup() {
        assert_eq!(entity("order").map(|meta| meta.table), Some("market.order"));
        assert!(entity("person").is_none());
        assert!(entity("").is_none());
    }

    #[test]
    fn test_list_display_leads_with_id() {
        for meta in ENTITIES {
            assert_eq!(meta.list_display.first(), Some(&"id"), "{}", meta.name);
        }
    }

    #[test]
    fn test_keys_and_hidden_columns_are_not_editable() {
        for meta in ENTITIES {
            assert!(!meta.is_editable("id"), "{}", meta.name);
            for column in meta.hidden {
                assert!(!meta.is_editable(column), "{}.{column}", meta.name);
                assert!(!meta.list_display.contains(column), "{}.{column}", meta.name);
            }
        }
    }

    #[test]
    fn test_token_key_is_read_only() {
        let meta = entity("confirm_email_token");
        assert_eq!(meta.map(|m| m.is_editable("key")), Some(false));
    }

    #[test]
    fn test_password_is_hidden() {
        assert_eq!(entity("user").map(|m| m.hidden), Some(&["password"][..]));
    }
}
