pub mod case;
mod focus;
pub mod machine;
pub mod message;
pub mod runner;

pub use case::*;
pub use machine::*;
pub use message::*;
pub use runner::*;
