//! Domain types for AlphaWave

pub mod bar;
pub mod history;

pub use bar::Bar;
pub use history::{BarError, BarHistory};
