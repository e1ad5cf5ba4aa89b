//! # foresight-channels
//!
//! Messaging platform integrations for Foresight.

pub mod telegram;
pub(crate) mod utils;
