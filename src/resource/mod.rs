//! Resources managed by lwsync
//!
//! Every managed value is a [`declarative::Resource`]: read the current
//! value, compare it with the desired one, write only on a mismatch.

pub mod likewise_setting;

pub use likewise_setting::{LikewiseSetting, StorePrefetch};
