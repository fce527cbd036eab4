pub mod bridge;
pub mod exports;

pub use bridge::Bridge;
pub use exports::{Close, Init, Read, ReadResult, ReleaseBuffer, Write};
