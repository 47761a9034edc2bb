mod column;
mod conventions;
mod entity;
mod error;
mod fetch;
mod schema;
mod sql_writer;
mod storage;
mod table_ref;
mod util;
mod validate;
mod value;

pub use column::*;
pub use conventions::*;
pub use entity::*;
pub use error::*;
pub use fetch::*;
pub use schema::*;
pub use sql_writer::*;
pub use storage::*;
pub use table_ref::*;
pub use util::*;
pub use validate::*;
pub use value::*;

pub type Result<T> = std::result::Result<T, Error>;
