//! Error types shared by the tagpack crates: status codes, the [`ErrorExt`]
//! trait, and [`StackError`] with its context frames.

pub mod context;
pub mod ext;
pub mod stack;
pub mod status_code;
pub mod types;

pub use context::*;
pub use ext::*;
pub use stack::*;
pub use status_code::*;
pub use types::*;

pub type TagpackResult<T> = Result<T, StackError>;
