mod chat;
mod common;
mod document;
mod source;

pub use chat::*;
pub use common::*;
pub use document::*;
pub use source::*;
