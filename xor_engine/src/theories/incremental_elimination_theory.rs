use log::{log, trace};

use crate::{ConstraintStore, Literal};

use super::{Context, Event, Matrix, PivotRule, TheoryTrait};

/// 割り当てのたびに行列を更新し，ピボット列が他の行に現れない形を保つ
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IncrementalEliminationTheory {
    matrix: Matrix,
    rule: PivotRule,
    deltas: Vec<Delta>,
    marks: Vec<usize>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
enum Delta {
    Fold {
        column: usize,
        value: bool,
        rows: Vec<usize>,
    },
    Pivot {
        row_id: usize,
        previous: Option<usize>,
    },
    RowAddition {
        source: usize,
        target: usize,
    },
}

impl IncrementalEliminationTheory {
    pub fn new(store: &ConstraintStore, rule: PivotRule) -> Self {
        let mut matrix = Matrix::new(store, |_| None, true);
        matrix.eliminate(rule);
        return Self {
            matrix,
            rule,
            deltas: Vec::default(),
            marks: Vec::default(),
        };
    }

    #[cfg(test)]
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    fn undo_delta(&mut self, delta: Delta) {
        match delta {
            Delta::Fold {
                column,
                value,
                rows,
            } => self.matrix.unfold(column, value, &rows),
            Delta::Pivot { row_id, previous } => {
                self.matrix.set_pivot(row_id, previous);
            }
            Delta::RowAddition { source, target } => self.matrix.add_row(source, target),
        }
    }
}

impl TheoryTrait for IncrementalEliminationTheory {
    fn initialize(&mut self, context: &Context, callback: impl FnMut(Event)) {
        log!(context.display_level(), "initial matrix\n{}", self.matrix);
        if context.eliminate {
            self.matrix.scan(context.store, callback);
        }
    }

    fn assign(&mut self, context: &Context, callback: impl FnMut(Event)) {
        let Some(assigned_literal) = context.trail.last() else {
            unreachable!();
        };
        let Some(column) = context.store.column_of(assigned_literal.index()) else {
            unreachable!("{} is irrelevant", assigned_literal);
        };
        let value = bool::from(assigned_literal.value());

        self.marks.push(self.deltas.len());
        let rows = self.matrix.fold(column, value);
        self.deltas.push(Delta::Fold {
            column,
            value,
            rows,
        });

        if let Some(row_id) = self.matrix.pivot_row(column) {
            let previous = self.matrix.set_pivot(row_id, None);
            self.deltas.push(Delta::Pivot { row_id, previous });

            if let Some(pivot) = self.matrix.select_pivot(row_id, self.rule) {
                trace!("row {} pivots on column {} instead of {}", row_id, pivot, column);
                for target in self.matrix.pivot_on(row_id, pivot) {
                    self.deltas.push(Delta::RowAddition {
                        source: row_id,
                        target,
                    });
                }
                let previous = self.matrix.set_pivot(row_id, Some(pivot));
                self.deltas.push(Delta::Pivot { row_id, previous });
            }
        }
        debug_assert!(self.matrix.is_reduced());
        log!(context.display_level(), "after {}\n{}", assigned_literal, self.matrix);

        if context.eliminate {
            self.matrix.scan(context.store, callback);
        }
    }

    fn unassign(&mut self, _context: &Context, _literal: Literal) {
        let Some(mark) = self.marks.pop() else {
            unreachable!("unassign without assign");
        };
        while self.deltas.len() > mark {
            let Some(delta) = self.deltas.pop() else {
                unreachable!();
            };
            self.undo_delta(delta);
        }
    }
}
