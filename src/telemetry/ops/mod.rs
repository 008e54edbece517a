pub mod chunk;
pub mod summarize;
pub mod ask;
