pub mod base;
pub mod candidate;
pub mod deal;
pub mod entity;
pub mod job;
pub mod query;
pub mod ticket;

pub use base::{BaseDao, DaoError, DaoResult, PaginatedResult, PaginationParams};
pub use candidate::CandidateCreate;
pub use deal::DealCreate;
pub use entity::{Entity, EntityStats, Repository, StatBucket, UpdateOutcome, to_wire_json};
pub use job::JobCreate;
pub use query::{ListQuery, QueryFields};
pub use ticket::TicketCreate;
