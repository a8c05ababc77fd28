pub mod analyzer;
pub mod metrics;
pub mod patterns;
pub mod synthetic;

pub use analyzer::*;
pub use metrics::*;
pub use patterns::*;
pub use synthetic::*;
