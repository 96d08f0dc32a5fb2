use crate::{
    entities::{item, product},
    errors::ServiceError,
    services::{full_messages, normalize_optional_string},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Product fields a create or update may set, in the order errors are reported
pub const PERMITTED_FIELDS: [&str; 6] = [
    "name",
    "description",
    "category",
    "sku",
    "wholesale",
    "retail",
];

/// Submitted product fields. `None` means the field was not submitted at all;
/// anything else sent alongside is dropped during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProductParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sku: Option<String>,
    pub wholesale: Option<String>,
    pub retail: Option<String>,
}

/// Product attributes after merging submitted params, validated before any write
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ProductAttributes {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub sku: String,
    #[validate(custom = "validate_number")]
    pub wholesale: Option<String>,
    #[validate(custom = "validate_number")]
    pub retail: Option<String>,
}

/// Digits after the decimal point a stored price keeps (`Decimal(12, 2)`)
const PRICE_SCALE: u32 = 2;

/// Prices must stay below 10^10 to fit the 10 integer digits of `Decimal(12, 2)`
const PRICE_LIMIT: i64 = 10_000_000_000;

fn price_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_number(value: &str) -> Result<(), ValidationError> {
    let price =
        Decimal::from_str(value).map_err(|_| price_error("not_a_number", "is not a number"))?;

    if price.normalize().scale() > PRICE_SCALE {
        return Err(price_error(
            "too_many_decimal_places",
            "must have at most 2 decimal places",
        ));
    }
    if price.abs() >= Decimal::from(PRICE_LIMIT) {
        return Err(price_error("too_large", "is too large"));
    }
    Ok(())
}

fn parse_price(label: &str, value: Option<&str>) -> Result<Option<Decimal>, ServiceError> {
    value
        .map(|raw| {
            Decimal::from_str(raw).map_err(|_| {
                ServiceError::ValidationError(vec![format!("{label} is not a number")])
            })
        })
        .transpose()
}

impl ProductAttributes {
    /// Current attributes of a stored product
    pub fn from_model(model: &product::Model) -> Self {
        Self {
            name: model.name.clone(),
            description: model.description.clone(),
            category: model.category.clone(),
            sku: model.sku.clone(),
            wholesale: model.wholesale.map(|d| d.to_string()),
            retail: model.retail.map(|d| d.to_string()),
        }
    }

    /// Applies submitted params; fields that were not submitted keep their value
    pub fn merge(mut self, params: ProductParams) -> Self {
        if let Some(name) = params.name {
            self.name = normalize_optional_string(Some(name));
        }
        if let Some(description) = params.description {
            self.description = normalize_optional_string(Some(description));
        }
        if let Some(category) = params.category {
            self.category = normalize_optional_string(Some(category));
        }
        if let Some(sku) = params.sku {
            self.sku = sku.trim().to_string();
        }
        if let Some(wholesale) = params.wholesale {
            self.wholesale = normalize_optional_string(Some(wholesale));
        }
        if let Some(retail) = params.retail {
            self.retail = normalize_optional_string(Some(retail));
        }
        self
    }

    /// Validates and returns the full error messages on failure
    pub fn check(&self) -> Result<(), ServiceError> {
        self.validate().map_err(|errors| {
            ServiceError::ValidationError(full_messages(&errors, &PERMITTED_FIELDS))
        })
    }

    fn apply(&self, active: &mut product::ActiveModel) -> Result<(), ServiceError> {
        active.name = Set(self.name.clone());
        active.description = Set(self.description.clone());
        active.category = Set(self.category.clone());
        active.sku = Set(self.sku.clone());
        active.wholesale = Set(parse_price("Wholesale", self.wholesale.as_deref())?);
        active.retail = Set(parse_price("Retail", self.retail.as_deref())?);
        Ok(())
    }
}

/// Service for managing products and their owned items
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All products, oldest first
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<product::Model>, ServiceError> {
        let products = product::Entity::find()
            .order_by_asc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(products)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))
    }

    /// Validates and stores a new product
    #[instrument(skip(self))]
    pub async fn create(&self, params: ProductParams) -> Result<product::Model, ServiceError> {
        let attributes = ProductAttributes::default().merge(params);
        if let Err(err) = attributes.check() {
            warn!(error = %err, "Rejected product create");
            return Err(err);
        }

        let mut active = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            ..Default::default()
        };
        attributes.apply(&mut active)?;

        let product = active.insert(&*self.db).await?;
        info!(product_id = %product.id, sku = %product.sku, "Created product");
        Ok(product)
    }

    /// Merges submitted params into a stored product and saves it if still valid
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn update(
        &self,
        product: product::Model,
        params: ProductParams,
    ) -> Result<product::Model, ServiceError> {
        let attributes = ProductAttributes::from_model(&product).merge(params);
        if let Err(err) = attributes.check() {
            warn!(error = %err, "Rejected product update");
            return Err(err);
        }

        let mut active: product::ActiveModel = product.into();
        attributes.apply(&mut active)?;

        let product = active.update(&*self.db).await?;
        info!(product_id = %product.id, "Updated product");
        Ok(product)
    }

    /// Deletes a product together with all of its items, atomically.
    /// Returns the number of items removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, product_id: Uuid) -> Result<u64, ServiceError> {
        let txn = self.db.begin().await?;

        let items_removed = item::Entity::delete_many()
            .filter(item::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?
            .rows_affected;

        let result = product::Entity::delete_by_id(product_id).exec(&txn).await?;
        if result.rows_affected == 0 {
            // dropping the transaction rolls the item deletes back
            return Err(ServiceError::not_found("Product", product_id));
        }

        txn.commit().await?;
        info!(product_id = %product_id, items_removed, "Deleted product");
        Ok(items_removed)
    }

    /// Items owned by a product, oldest first
    #[instrument(skip(self))]
    pub async fn items_for(&self, product_id: Uuid) -> Result<Vec<item::Model>, ServiceError> {
        let items = item::Entity::find()
            .filter(item::Column::ProductId.eq(product_id))
            .order_by_asc(item::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(items)
    }

    /// Sell-through computed from the product's items as currently stored
    #[instrument(skip(self))]
    pub async fn sell_through(&self, product_id: Uuid) -> Result<Decimal, ServiceError> {
        let items = self.items_for(product_id).await?;
        product::sell_through(&items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(sku: Option<&str>) -> ProductParams {
        ProductParams {
            name: Some("Heather tee".into()),
            sku: sku.map(str::to_string),
            wholesale: Some("10.00".into()),
            retail: Some("15.00".into()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_sku_is_blank() {
        let attributes = ProductAttributes::default().merge(params(None));
        match attributes.check() {
            Err(ServiceError::ValidationError(messages)) => {
                assert_eq!(messages, vec!["Sku can't be blank".to_string()])
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn whitespace_sku_is_blank() {
        let attributes = ProductAttributes::default().merge(params(Some("   ")));
        assert!(attributes.check().is_err());
    }

    #[test]
    fn errors_are_ordered_by_permitted_fields() {
        let attributes = ProductAttributes::default().merge(ProductParams {
            retail: Some("lots".into()),
            wholesale: Some("some".into()),
            ..Default::default()
        });
        match attributes.check() {
            Err(ServiceError::ValidationError(messages)) => assert_eq!(
                messages,
                vec![
                    "Sku can't be blank".to_string(),
                    "Wholesale is not a number".to_string(),
                    "Retail is not a number".to_string(),
                ]
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn prices_must_fit_the_stored_column() {
        let attributes = ProductAttributes::default().merge(ProductParams {
            sku: Some("TEE-1".into()),
            wholesale: Some("10.005".into()),
            retail: Some("123456789012345".into()),
            ..Default::default()
        });
        match attributes.check() {
            Err(ServiceError::ValidationError(messages)) => assert_eq!(
                messages,
                vec![
                    "Wholesale must have at most 2 decimal places".to_string(),
                    "Retail is too large".to_string(),
                ]
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn prices_at_the_column_bounds_are_accepted() {
        let attributes = ProductAttributes::default().merge(ProductParams {
            sku: Some("TEE-1".into()),
            wholesale: Some("10.100".into()),
            retail: Some("9999999999.99".into()),
            ..Default::default()
        });
        assert!(attributes.check().is_ok());
    }

    #[test]
    fn merge_keeps_fields_that_were_not_submitted() {
        let existing = ProductAttributes {
            name: Some("Tee".into()),
            category: Some("Shirts".into()),
            sku: "TEE-1".into(),
            ..Default::default()
        };
        let merged = existing.merge(ProductParams {
            name: Some("  ".into()),
            sku: Some("TEE-2".into()),
            ..Default::default()
        });
        assert_eq!(merged.name, None);
        assert_eq!(merged.category.as_deref(), Some("Shirts"));
        assert_eq!(merged.sku, "TEE-2");
        assert!(merged.check().is_ok());
    }

    #[test]
    fn blank_prices_are_absent_not_invalid() {
        let attributes = ProductAttributes::default().merge(ProductParams {
            sku: Some("TEE-1".into()),
            wholesale: Some("".into()),
            ..Default::default()
        });
        assert_eq!(attributes.wholesale, None);
        assert!(attributes.check().is_ok());
    }
}
