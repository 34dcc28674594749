pub mod baseline;
pub mod error;
pub mod extract;
pub mod io;
pub mod normalize;
pub mod peaks;
pub mod pipeline;
pub mod render;
pub mod smooth;
pub mod trace;
