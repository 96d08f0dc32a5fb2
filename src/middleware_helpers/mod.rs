pub mod method_override;
pub mod request_id;

pub use method_override::{method_override_middleware, FormBodyLimit};
pub use request_id::request_id_middleware;
