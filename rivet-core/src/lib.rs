mod as_value;
mod collection;
mod column_def;
mod condition;
mod connection;
mod database;
mod error;
mod join;
mod model;
mod order;
mod persistence;
mod query;
mod schema;
mod select;
mod selection;
mod sql_writer;
mod util;
mod validation;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use collection::*;
pub use column_def::*;
pub use condition::*;
pub use connection::*;
pub use database::*;
pub use error::*;
pub use join::*;
pub use model::*;
pub use order::*;
pub use persistence::*;
pub use query::*;
pub use schema::*;
pub use select::*;
pub use selection::*;
pub use sql_writer::*;
pub use util::*;
pub use validation::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
