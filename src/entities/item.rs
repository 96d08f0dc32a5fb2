use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Whether a physical unit has been sold
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemStatus {
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "unsold")]
    Unsold,
}

/// A single physical unit of a product
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning product, fixed at creation
    pub product_id: Uuid,

    pub size: String,

    pub color: String,

    pub status: ItemStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(now);

        for (label, value) in [("Size", &active_model.size), ("Color", &active_model.color)] {
            if let ActiveValue::Set(text) | ActiveValue::Unchanged(text) = value {
                if text.trim().is_empty() {
                    return Err(DbErr::Custom(format!(
                        "Validation error: {label} can't be blank"
                    )));
                }
            }
        }

        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_its_text_form() {
        assert_eq!(ItemStatus::Sold.to_string(), "sold");
        assert_eq!(ItemStatus::from_str("unsold").unwrap(), ItemStatus::Unsold);
        assert!(ItemStatus::from_str("lost").is_err());
    }

    #[test]
    fn status_db_value_matches_text_form() {
        assert_eq!(ItemStatus::Sold.to_value(), "sold".to_string());
        assert_eq!(ItemStatus::Unsold.to_value(), "unsold".to_string());
    }
}
