pub mod consts;
pub mod detection;
pub mod error;
pub mod field;
pub mod pipeline;
