pub mod driver;
pub mod engine;
pub mod games;
