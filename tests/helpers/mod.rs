#![allow(unused_imports)]
pub mod clock;
pub mod test_store;

pub use clock::*;
pub use test_store::*;
