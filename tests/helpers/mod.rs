#![allow(dead_code)]
pub mod clock;
pub mod test_app;

pub use clock::*;
pub use test_app::*;
