pub mod api_error;
pub mod api_utils;
pub mod date_utils;
pub mod number_format;
pub mod query;
