use std::ops::{BitXor, Not};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boolean(bool);

impl Boolean {
    pub const FALSE: Self = Self(false);
    pub const TRUE: Self = Self(true);
}

impl From<bool> for Boolean {
    #[inline(always)]
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl From<Boolean> for bool {
    #[inline(always)]
    fn from(value: Boolean) -> Self {
        value.0
    }
}

impl Not for Boolean {
    type Output = Boolean;
    #[inline(always)]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

impl BitXor<bool> for Boolean {
    type Output = Boolean;
    #[inline(always)]
    fn bitxor(self, rhs: bool) -> Self::Output {
        Self(self.0 ^ rhs)
    }
}

impl std::fmt::Debug for Boolean {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", if self.0 { "TRUE" } else { "FALSE" })
    }
}
