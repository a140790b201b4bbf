//! Time integration methods.

mod low_storage_rk;

pub use low_storage_rk::{LowStorageRk, Stage};
