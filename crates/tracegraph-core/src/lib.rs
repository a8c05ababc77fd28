pub mod error;
pub mod node;
pub mod trace;
pub mod traits;
pub mod types;

pub use error::*;
pub use node::*;
pub use trace::*;
pub use traits::*;
pub use types::*;
