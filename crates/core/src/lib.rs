mod content;
mod core;
mod edit;
mod editor;
mod history;
mod mapping;
mod marks;
mod ops;
mod query;
mod schema;

pub use crate::content::*;
pub use crate::core::*;
pub use crate::edit::*;
pub use crate::editor::*;
pub use crate::marks::*;
pub use crate::ops::*;
pub use crate::query::*;
pub use crate::schema::*;
