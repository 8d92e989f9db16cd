// Converters module - response shape normalization
//
// Flattens the nested DramaBox response bodies into the record lists the
// REST API returns.

pub mod dramabox_to_api;

pub use dramabox_to_api::{extract_dramas, extract_streaming_links, extract_suggestions};
