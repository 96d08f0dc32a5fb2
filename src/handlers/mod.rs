pub mod common;
pub mod extract;
pub mod items;
pub mod products;

use crate::db::DbPool;
use crate::services::{ItemService, ProductService};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub items: Arc<ItemService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            products: Arc::new(ProductService::new(db_pool.clone())),
            items: Arc::new(ItemService::new(db_pool)),
        }
    }
}
