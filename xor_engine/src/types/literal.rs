use std::ops::Not;

use super::boolean::Boolean;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    bits: usize,
}

impl Literal {
    #[inline(always)]
    pub fn new(index: usize, value: Boolean) -> Self {
        debug_assert!(((index << 1) >> 1) == index);
        return Self {
            bits: (index << 1) | bool::from(value) as usize,
        };
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        return self.bits >> 1;
    }

    #[inline(always)]
    pub fn value(&self) -> Boolean {
        return Boolean::from(self.bits & 1 == 1);
    }

    #[inline(always)]
    pub fn is_positive(&self) -> bool {
        return self.bits & 1 == 1;
    }
}

impl Not for Literal {
    type Output = Literal;
    #[inline(always)]
    fn not(self) -> Self::Output {
        Literal {
            bits: self.bits ^ 1,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}l_{}",
            if self.is_positive() { "" } else { "!" },
            self.index()
        )
    }
}

impl std::fmt::Debug for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

#[cfg(test)]
mod test {
    use super::{Boolean, Literal};

    #[test]
    fn test_literal_packing() {
        let literal = Literal::new(42, Boolean::TRUE);
        assert_eq!(literal.index(), 42);
        assert_eq!(literal.value(), Boolean::TRUE);
        assert!(literal.is_positive());

        let complement = !literal;
        assert_eq!(complement.index(), 42);
        assert_eq!(complement.value(), Boolean::FALSE);
        assert_eq!(!complement, literal);
        assert_eq!(format!("{} {}", literal, complement), "l_42 !l_42");
    }
}
