mod reminder;
mod status;

pub use crate::reminder::api::*;
pub use crate::status::api::*;
