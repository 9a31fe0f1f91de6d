use std::ops::Range;

use crate::{AssignmentTrait, Boolean, Literal};

/// 割り当て理由
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reason<ExplainKeyT> {
    /// 決定
    Decision,
    /// 伝播 (ホスト側で管理する説明への鍵)
    Propagation { explain_key: ExplainKeyT },
}

impl<ExplainKeyT> Reason<ExplainKeyT> {
    #[inline(always)]
    pub fn is_decision(&self) -> bool {
        return matches!(self, Self::Decision);
    }
}

#[derive(Clone, Debug)]
pub struct DecisionStack<ExplainKeyT> {
    variables: Vec<VariableState>,
    assignment_stack: Vec<Assignment<ExplainKeyT>>,
    decision_orders: Vec<usize>,
}

impl<ExplainKeyT> Default for DecisionStack<ExplainKeyT> {
    fn default() -> Self {
        Self {
            variables: Vec::default(),
            assignment_stack: Vec::default(),
            decision_orders: Vec::default(),
        }
    }
}

impl<ExplainKeyT> DecisionStack<ExplainKeyT>
where
    ExplainKeyT: Copy,
{
    pub fn with_variables(number_of_variables: usize) -> Self {
        let mut decision_stack = Self::default();
        for _ in 0..number_of_variables {
            decision_stack.add_variable(Boolean::FALSE);
        }
        return decision_stack;
    }

    pub fn number_of_variables(&self) -> usize {
        return self.variables.len();
    }

    pub fn number_of_assignments(&self) -> usize {
        return self.assignment_stack.len();
    }

    pub fn add_variable(&mut self, initial_phase: Boolean) {
        self.variables.push(VariableState {
            phase: initial_phase,
            order: None,
        });
    }

    pub fn phase(&self, index: usize) -> Boolean {
        return self.variables[index].phase;
    }

    pub fn get_assignment(&self, order: usize) -> Literal {
        let index = self.assignment_stack[order].index;
        debug_assert!(self.variables[index].order == Some(order));
        return Literal::new(index, self.variables[index].phase);
    }

    pub fn get_reason(&self, index: usize) -> Option<Reason<ExplainKeyT>> {
        return self.variables[index]
            .order
            .map(|order| self.assignment_stack[order].reason);
    }

    pub fn order_range(&self, decision_level: usize) -> Range<usize> {
        let start = if decision_level == 0 {
            0
        } else {
            self.decision_orders[decision_level - 1]
        };
        let end = if decision_level < self.decision_orders.len() {
            self.decision_orders[decision_level]
        } else {
            self.assignment_stack.len()
        };
        return start..end;
    }

    pub fn assign(&mut self, literal: Literal, reason: Reason<ExplainKeyT>) {
        let state = &mut self.variables[literal.index()];
        assert!(state.order.is_none(), "{} is already assigned", literal);

        let order = self.assignment_stack.len();
        if reason.is_decision() {
            self.decision_orders.push(order);
        }
        self.assignment_stack.push(Assignment {
            index: literal.index(),
            decision_level: self.decision_orders.len(),
            reason,
        });
        state.order = Some(order);
        state.phase = literal.value();
    }

    pub fn backjump(&mut self, backjump_level: usize) {
        while self.decision_orders.len() > backjump_level {
            let Some(assignment) = self.assignment_stack.pop() else {
                unreachable!("decision without assignment");
            };
            debug_assert!(assignment.decision_level == self.decision_orders.len());
            if assignment.reason.is_decision() {
                let decision_order = self.decision_orders.pop();
                debug_assert!(decision_order == Some(self.assignment_stack.len()));
            }
            self.variables[assignment.index].order = None;
        }
    }
}

impl<ExplainKeyT> AssignmentTrait for DecisionStack<ExplainKeyT> {
    #[inline(always)]
    fn current_value(&self, index: usize) -> Option<Boolean> {
        let state = &self.variables[index];
        return state.order.map(|_| state.phase);
    }

    #[inline(always)]
    fn decision_level(&self) -> usize {
        return self.decision_orders.len();
    }
}

#[derive(Clone, Debug)]
struct Assignment<ExplainKeyT> {
    index: usize,
    decision_level: usize,
    reason: Reason<ExplainKeyT>,
}

#[derive(Clone, Copy, Debug)]
struct VariableState {
    phase: Boolean,
    order: Option<usize>,
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::{DecisionStack, Reason};
    use crate::{AssignmentTrait, Boolean, Literal};

    fn lit(index: usize, value: bool) -> Literal {
        Literal::new(index, Boolean::from(value))
    }

    #[test]
    fn test_assign_and_backjump() {
        let mut decision_stack = DecisionStack::<usize>::with_variables(4);
        decision_stack.assign(lit(0, true), Reason::Propagation { explain_key: 7 });
        decision_stack.assign(lit(1, false), Reason::Decision);
        decision_stack.assign(lit(2, true), Reason::Propagation { explain_key: 8 });
        decision_stack.assign(lit(3, true), Reason::Decision);

        assert_eq!(decision_stack.decision_level(), 2);
        assert_eq!(decision_stack.order_range(0), 0..1);
        assert_eq!(decision_stack.order_range(1), 1..3);
        assert_eq!(decision_stack.order_range(2), 3..4);
        assert_eq!(
            decision_stack.get_reason(2),
            Some(Reason::Propagation { explain_key: 8 })
        );
        assert!(decision_stack.is_true(lit(1, false)));
        assert!(decision_stack.is_false(lit(1, true)));
        assert_eq!(decision_stack.get_assignment(1), lit(1, false));

        decision_stack.backjump(1);
        assert_eq!(decision_stack.decision_level(), 1);
        assert_eq!(decision_stack.number_of_assignments(), 3);
        assert!(!decision_stack.is_assigned(3));
        assert_eq!(decision_stack.phase(3), Boolean::TRUE);

        decision_stack.backjump(0);
        assert_eq!(decision_stack.number_of_assignments(), 1);
        assert_eq!(decision_stack.current_value(0), Some(Boolean::TRUE));
        assert_eq!(decision_stack.current_value(1), None);
        assert!(!decision_stack.is_assigned(1));
    }
}
