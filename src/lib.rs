pub use rivet_core::*;
pub use rivet_macros::Model;
