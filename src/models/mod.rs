// Data models for the DramaBox API

pub mod dramabox;

pub use dramabox::{ChapterBatchRequest, StreamingLink, SuggestRequest, TheaterRequest};
