//! Leader election.
//!
//! Election is stateless: recomputed on every request that needs to
//! know the leader, from a fixed priority list plus a liveness-and-
//! length vote. There is no term number or lease.

pub mod election;

pub use election::{PeerStatus, elect_leader};
