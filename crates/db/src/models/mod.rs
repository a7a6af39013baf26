pub mod candidate;
pub mod deal;
pub mod job;
pub mod ticket;

pub use candidate::*;
pub use deal::*;
pub use job::*;
pub use ticket::*;
