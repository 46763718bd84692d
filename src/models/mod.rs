pub mod analysis;
pub mod chunk;
pub mod claim;
pub mod priority;
pub mod turn;

pub use analysis::*;
pub use chunk::*;
pub use claim::*;
pub use priority::*;
pub use turn::*;
