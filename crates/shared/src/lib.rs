pub mod domain;
pub mod error;
pub mod protocol;

pub use alloy_primitives::{Address, Bytes, B256, U256, U64};
