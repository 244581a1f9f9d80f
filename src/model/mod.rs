// Re-export all model types from submodules.

pub use order::SortOrder;
pub use quantity::{Quantity, QuantityError};
pub use record::{MetricRecord, ResourceList, format_resources, identity_key};

mod order;
mod quantity;
mod record;
