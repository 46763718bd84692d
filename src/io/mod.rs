pub mod input;
pub mod output;
pub mod roster;
pub mod store;

pub use input::*;
pub use output::*;
pub use roster::*;
pub use store::*;
