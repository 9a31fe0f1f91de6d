use thiserror::Error;

use crate::Literal;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    #[error("malformed constraint {constraint_id}: {kind}")]
    MalformedConstraint {
        constraint_id: usize,
        kind: MalformedKind,
    },

    #[error("invalid cutoff {0}: expected a value within [0, 1]")]
    InvalidCutoff(f64),

    #[error("unknown strategy `{0}`")]
    UnknownStrategy(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MalformedKind {
    #[error("empty literal set")]
    EmptyLiteralSet,

    #[error("literal {0} is outside the declared universe")]
    LiteralOutsideUniverse(Literal),

    #[error("facts of the same constraint disagree on the parity")]
    InconsistentParity,
}

pub type Result<T> = std::result::Result<T, Error>;
