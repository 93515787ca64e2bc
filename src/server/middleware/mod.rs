//! This module holds the middleware definitions

pub(crate) use handle_not_found::handle_not_found;
pub(crate) use json_extractor_error::json_extractor_error;

mod handle_not_found;
mod json_extractor_error;
