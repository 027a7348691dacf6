//! Transaction validation: the gate between the HTTP surface and the
//! mempool.

pub mod error;
pub mod workflow;

pub use error::ValidationError;
pub use workflow::{TxValidator, WorkflowValidator};
