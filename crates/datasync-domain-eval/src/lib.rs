pub mod aggregate;
pub mod board;
pub mod judge;
pub mod scheduler;

pub use aggregate::*;
pub use board::*;
pub use judge::*;
pub use scheduler::*;
