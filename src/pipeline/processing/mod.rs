// Pipeline processing: raw text parsing, field classification, and normalization

pub mod classify;
pub mod normalize;
pub mod parser;
