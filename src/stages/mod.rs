pub mod aggregate;
pub mod analyze;
pub mod context;
pub mod diagnostics;
pub mod plan;
pub mod rank;
pub mod segment;

pub use aggregate::*;
pub use analyze::*;
pub use context::*;
pub use diagnostics::*;
pub use plan::*;
pub use rank::*;
pub use segment::*;
