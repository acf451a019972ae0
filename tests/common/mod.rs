#![allow(dead_code)]

pub mod builders;
pub mod harness;

pub use builders::{mentions_from_docs, MentionBuilder};
pub use harness::TestHarness;
