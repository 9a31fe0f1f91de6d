mod assignment;
mod config;
mod constraint_store;
mod constraints;
mod decision_stack;
mod engine;
mod error;
mod theories;
mod types;

pub use assignment::AssignmentTrait;
pub use config::{Cutoff, EngineConfig, Strategy};
pub use constraint_store::{ConstraintStore, StoredConstraint};
pub use constraints::{Parity, ParityConstraint, ParityConstraintTrait, ParityFact};
pub use decision_stack::{DecisionStack, Reason};
pub use engine::{CheckResult, Propagation, PropagationResult, State, XorEngine};
pub use error::{Error, MalformedKind, Result};
pub use types::{Boolean, Literal};
