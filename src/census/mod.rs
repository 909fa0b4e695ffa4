mod moe;

pub use moe::{propagate, propagate_proportion, MoeMode};
pub(crate) use moe::round_to;
