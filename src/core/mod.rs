pub mod body;
pub mod dispatch;
pub mod persist;
pub mod request;
pub mod runner;

pub use crate::domain::model::{FieldDefinition, FieldKind, QueryParam, RequestDefinition};
pub use crate::domain::ports::{Dispatcher, Storage};
pub use crate::utils::error::Result;
