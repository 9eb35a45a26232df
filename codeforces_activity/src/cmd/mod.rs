pub mod fetch;
pub mod summarize;
