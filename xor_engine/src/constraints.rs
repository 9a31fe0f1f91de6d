mod parity_constraint;

pub use parity_constraint::{Parity, ParityConstraint, ParityConstraintTrait, ParityFact};
