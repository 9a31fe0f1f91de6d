use crate::{Boolean, Literal};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    #[inline(always)]
    pub fn bit(&self) -> bool {
        return matches!(self, Self::Odd);
    }

    #[inline(always)]
    pub fn from_bit(bit: bool) -> Self {
        return if bit { Self::Odd } else { Self::Even };
    }
}

impl std::fmt::Display for Parity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Even => "even",
                Self::Odd => "odd",
            }
        )
    }
}

pub trait ParityConstraintTrait {
    fn iter_terms(&self) -> impl Iterator<Item = Literal> + Clone + '_;
    fn parity(&self) -> Parity;
    /// すべてのリテラルが割り当て済みの場合のみ Some
    fn is_satisfied_by(&self, value: impl Fn(usize) -> Option<Boolean>) -> Option<bool> {
        let mut number_of_true_literals = 0;
        for literal in self.iter_terms() {
            if value(literal.index())? == literal.value() {
                number_of_true_literals += 1;
            }
        }
        return Some((number_of_true_literals % 2 == 1) == self.parity().bit());
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParityConstraint {
    literals: Vec<Literal>,
    parity: Parity,
}

impl ParityConstraint {
    pub fn new(literals: impl IntoIterator<Item = Literal>, parity: Parity) -> Self {
        Self {
            literals: literals.into_iter().collect(),
            parity,
        }
    }
}

impl ParityConstraintTrait for ParityConstraint {
    fn iter_terms(&self) -> impl Iterator<Item = Literal> + Clone + '_ {
        self.literals.iter().cloned()
    }

    fn parity(&self) -> Parity {
        self.parity
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ParityFact {
    pub constraint_id: usize,
    pub parity: Parity,
    pub literal: Literal,
}

#[cfg(test)]
mod test {
    use super::{Parity, ParityConstraint, ParityConstraintTrait};
    use crate::{Boolean, Literal};

    fn lit(index: usize, value: bool) -> Literal {
        Literal::new(index, Boolean::from(value))
    }

    #[test]
    fn test_is_satisfied_by() {
        // l_0 + !l_1 = odd
        let constraint = ParityConstraint::new([lit(0, true), lit(1, false)], Parity::Odd);
        let values = |t: [bool; 2]| move |index: usize| Some(Boolean::from(t[index]));

        assert_eq!(constraint.is_satisfied_by(values([true, true])), Some(true));
        assert_eq!(constraint.is_satisfied_by(values([true, false])), Some(false));
        assert_eq!(constraint.is_satisfied_by(values([false, false])), Some(true));
        assert_eq!(constraint.is_satisfied_by(|_| None), None);
    }

    #[test]
    fn test_parity_bit() {
        assert!(Parity::Odd.bit());
        assert!(!Parity::Even.bit());
        assert_eq!(Parity::from_bit(true), Parity::Odd);
        assert_eq!(Parity::from_bit(false), Parity::Even);
        assert_eq!(Parity::Even.to_string(), "even");
    }
}
