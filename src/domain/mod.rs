pub mod claim;
pub mod schema;
