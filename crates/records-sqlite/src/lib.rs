mod error;
mod open;
mod models;
mod legacy;
mod insert;
mod query;
mod schema;
mod engine;

pub use open::{Db, DbOptions, SourceDb};
pub use models::*;
pub use insert::*;
pub use query::*;
pub use schema::Table;
pub use engine::*;
