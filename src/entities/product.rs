use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{self, ItemStatus};
use crate::errors::ServiceError;

/// Product entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Product name
    pub name: Option<String>,

    /// Product description
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Free-form category label
    pub category: Option<String>,

    /// SKU (Stock Keeping Unit), never blank once persisted
    pub sku: String,

    /// Price paid to the supplier
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub wholesale: Option<Decimal>,

    /// Price charged to the customer
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub retail: Option<Decimal>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Profit margin as a percentage of the retail price: `100 * (retail - wholesale) / retail`.
    ///
    /// Exact decimal arithmetic, no rounding. Fails with [`ServiceError::InvalidState`] when
    /// either price is missing or the retail price is zero.
    pub fn margin(&self) -> Result<Decimal, ServiceError> {
        let (wholesale, retail) = match (self.wholesale, self.retail) {
            (Some(wholesale), Some(retail)) => (wholesale, retail),
            _ => {
                return Err(ServiceError::InvalidState(format!(
                    "margin of product {} needs both wholesale and retail prices",
                    self.id
                )))
            }
        };

        if retail.is_zero() {
            return Err(ServiceError::InvalidState(format!(
                "margin of product {} is undefined for a zero retail price",
                self.id
            )));
        }

        retail
            .checked_sub(wholesale)
            .and_then(|profit| Decimal::ONE_HUNDRED.checked_mul(profit))
            .and_then(|scaled| scaled.checked_div(retail))
            .ok_or_else(|| {
                ServiceError::InvalidState(format!("margin of product {} overflowed", self.id))
            })
    }
}

/// Fraction of `items` marked sold: `sold / total`, as an exact decimal.
///
/// An empty slice has no defined sell-through and yields [`ServiceError::InvalidState`].
pub fn sell_through(items: &[item::Model]) -> Result<Decimal, ServiceError> {
    let total = items.len();
    if total == 0 {
        return Err(ServiceError::InvalidState(
            "sell-through is undefined for a product without items".to_string(),
        ));
    }

    let sold = items
        .iter()
        .filter(|item| item.status == ItemStatus::Sold)
        .count();

    Decimal::from(sold)
        .checked_div(Decimal::from(total))
        .ok_or_else(|| ServiceError::InvalidState("sell-through overflowed".to_string()))
}

/// Product entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::item::Entity")]
    Items,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
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

        if let ActiveValue::Set(sku) | ActiveValue::Unchanged(sku) = &active_model.sku {
            if sku.trim().is_empty() {
                return Err(DbErr::Custom("Validation error: Sku can't be blank".to_string()));
            }
        }

        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(wholesale: Option<Decimal>, retail: Option<Decimal>) -> Model {
        Model {
            id: Uuid::new_v4(),
            name: Some("Tee".into()),
            description: None,
            category: None,
            sku: "TEE-1".into(),
            wholesale,
            retail,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item_with(status: ItemStatus) -> item::Model {
        item::Model {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            size: "M".into(),
            color: "heather".into(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn margin_is_exact_one_third_of_a_hundred() {
        let p = product(Some(dec!(10.00)), Some(dec!(15.00)));
        assert_eq!(p.margin().unwrap(), dec!(100) / dec!(3));
    }

    #[test]
    fn margin_can_be_negative_when_selling_below_cost() {
        let p = product(Some(dec!(20)), Some(dec!(10)));
        assert_eq!(p.margin().unwrap(), dec!(-100));
    }

    #[test]
    fn margin_on_zero_retail_is_invalid_state() {
        let p = product(Some(dec!(10)), Some(Decimal::ZERO));
        assert!(matches!(p.margin(), Err(ServiceError::InvalidState(_))));
    }

    #[test]
    fn margin_without_prices_is_invalid_state() {
        assert!(matches!(
            product(None, Some(dec!(15))).margin(),
            Err(ServiceError::InvalidState(_))
        ));
        assert!(matches!(
            product(Some(dec!(10)), None).margin(),
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[test]
    fn sell_through_half_sold_is_exactly_one_half() {
        let items: Vec<_> = (0..5)
            .map(|_| item_with(ItemStatus::Sold))
            .chain((0..5).map(|_| item_with(ItemStatus::Unsold)))
            .collect();
        assert_eq!(sell_through(&items).unwrap(), dec!(0.5));
    }

    #[test]
    fn sell_through_one_of_three() {
        let items = vec![
            item_with(ItemStatus::Sold),
            item_with(ItemStatus::Unsold),
            item_with(ItemStatus::Unsold),
        ];
        assert_eq!(sell_through(&items).unwrap(), Decimal::ONE / dec!(3));
    }

    #[test]
    fn sell_through_without_items_is_invalid_state() {
        assert!(matches!(sell_through(&[]), Err(ServiceError::InvalidState(_))));
    }
}
