mod engine;

pub use engine::{SearchConfig, SearchEngine};
