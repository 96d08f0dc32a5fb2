pub mod item;
pub mod product;

pub use item::ItemStatus;
