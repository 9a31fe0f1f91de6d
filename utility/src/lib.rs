mod bit_set;
mod set;

pub use bit_set::BitSet;
pub use set::Set;
