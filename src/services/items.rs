use crate::{
    entities::{item, product, ItemStatus},
    errors::ServiceError,
    services::{full_messages, normalize_optional_string},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Item fields a create or update may set, in the order errors are reported
pub const PERMITTED_FIELDS: [&str; 3] = ["size", "color", "status"];

/// Submitted item fields; `None` means not submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ItemParams {
    pub size: Option<String>,
    pub color: Option<String>,
    /// `sold` or `unsold`
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ItemAttributes {
    #[validate(length(min = 1, message = "can't be blank"))]
    pub size: String,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub color: String,
    #[validate(length(min = 1, message = "can't be blank"), custom = "validate_status")]
    pub status: String,
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    // blank is reported by the length check
    if value.is_empty() || ItemStatus::from_str(value).is_ok() {
        return Ok(());
    }
    let mut err = ValidationError::new("inclusion");
    err.message = Some("is not included in the list".into());
    Err(err)
}

impl ItemAttributes {
    pub fn from_model(model: &item::Model) -> Self {
        Self {
            size: model.size.clone(),
            color: model.color.clone(),
            status: model.status.to_string(),
        }
    }

    /// Applies submitted params; fields that were not submitted keep their value
    pub fn merge(mut self, params: ItemParams) -> Self {
        if let Some(size) = params.size {
            self.size = normalize_optional_string(Some(size)).unwrap_or_default();
        }
        if let Some(color) = params.color {
            self.color = normalize_optional_string(Some(color)).unwrap_or_default();
        }
        if let Some(status) = params.status {
            self.status = normalize_optional_string(Some(status)).unwrap_or_default();
        }
        self
    }

    pub fn check(&self) -> Result<ItemStatus, ServiceError> {
        self.validate().map_err(|errors| {
            ServiceError::ValidationError(full_messages(&errors, &PERMITTED_FIELDS))
        })?;
        ItemStatus::from_str(&self.status).map_err(|_| {
            ServiceError::ValidationError(vec!["Status is not included in the list".to_string()])
        })
    }
}

/// Service for items, always addressed through their owning product
#[derive(Clone)]
pub struct ItemService {
    db: Arc<DatabaseConnection>,
}

impl ItemService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get an item, provided it belongs to `product_id`
    #[instrument(skip(self))]
    pub async fn get_for_product(
        &self,
        product_id: Uuid,
        item_id: Uuid,
    ) -> Result<item::Model, ServiceError> {
        item::Entity::find_by_id(item_id)
            .filter(item::Column::ProductId.eq(product_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Item", item_id))
    }

    /// Validates and stores a new item under `product`
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn create(
        &self,
        product: &product::Model,
        params: ItemParams,
    ) -> Result<item::Model, ServiceError> {
        let attributes = ItemAttributes::default().merge(params);
        let status = attributes.check().map_err(|err| {
            warn!(error = %err, "Rejected item create");
            err
        })?;

        let item = item::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            size: Set(attributes.size),
            color: Set(attributes.color),
            status: Set(status),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(item_id = %item.id, status = %item.status, "Created item");
        Ok(item)
    }

    /// Merges submitted params into a stored item and saves it if still valid
    #[instrument(skip(self, item), fields(item_id = %item.id, product_id = %item.product_id))]
    pub async fn update(
        &self,
        item: item::Model,
        params: ItemParams,
    ) -> Result<item::Model, ServiceError> {
        let attributes = ItemAttributes::from_model(&item).merge(params);
        let status = attributes.check().map_err(|err| {
            warn!(error = %err, "Rejected item update");
            err
        })?;

        let mut active: item::ActiveModel = item.into();
        active.size = Set(attributes.size);
        active.color = Set(attributes.color);
        active.status = Set(status);

        let item = active.update(&*self.db).await?;
        info!(item_id = %item.id, status = %item.status, "Updated item");
        Ok(item)
    }

    #[instrument(skip(self, item), fields(item_id = %item.id, product_id = %item.product_id))]
    pub async fn delete(&self, item: item::Model) -> Result<(), ServiceError> {
        let item_id = item.id;
        let result = item.delete(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Item", item_id));
        }
        info!("Deleted item");
        Ok(())
    }
}
