use crate::{ConstraintStore, Literal};

use super::{Context, Event, ExplainKey, TheoryTrait};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CountCheckTheory {
    number_of_unassigned: Vec<usize>,
    folded: Vec<bool>,
}

impl CountCheckTheory {
    pub fn new(store: &ConstraintStore) -> Self {
        Self {
            number_of_unassigned: store
                .iter()
                .map(|constraint| constraint.variables().len())
                .collect(),
            folded: vec![false; store.len()],
        }
    }
}

impl TheoryTrait for CountCheckTheory {
    fn initialize(&mut self, context: &Context, mut callback: impl FnMut(Event)) {
        for (constraint_id, constraint) in context.store.iter().enumerate() {
            if constraint.variables().is_empty() && constraint.rhs() {
                callback(Event::Conflict {
                    explain_key: ExplainKey::Constraint { constraint_id },
                });
            }
        }
    }

    fn assign(&mut self, context: &Context, mut callback: impl FnMut(Event)) {
        let Some(assigned_literal) = context.trail.last() else {
            unreachable!();
        };
        let value = bool::from(assigned_literal.value());
        for &constraint_id in context.store.constraints_of(assigned_literal.index()) {
            self.number_of_unassigned[constraint_id] -= 1;
            self.folded[constraint_id] ^= value;
            if self.number_of_unassigned[constraint_id] == 0
                && self.folded[constraint_id] != context.store.get(constraint_id).rhs()
            {
                callback(Event::Conflict {
                    explain_key: ExplainKey::Constraint { constraint_id },
                });
            }
        }
    }

    fn unassign(&mut self, context: &Context, literal: Literal) {
        let value = bool::from(literal.value());
        for &constraint_id in context.store.constraints_of(literal.index()) {
            self.number_of_unassigned[constraint_id] += 1;
            self.folded[constraint_id] ^= value;
        }
    }
}
