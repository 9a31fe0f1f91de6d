use crate::{Boolean, Literal};

/// エンジンが探索側 (ホスト) に要求する割り当ての読み取り口
pub trait AssignmentTrait {
    fn current_value(&self, index: usize) -> Option<Boolean>;

    fn decision_level(&self) -> usize;

    #[inline(always)]
    fn is_assigned(&self, index: usize) -> bool {
        return self.current_value(index).is_some();
    }

    #[inline(always)]
    fn is_true(&self, literal: Literal) -> bool {
        return self.current_value(literal.index()) == Some(literal.value());
    }

    #[inline(always)]
    fn is_false(&self, literal: Literal) -> bool {
        return self.current_value(literal.index()) == Some(!literal.value());
    }
}
