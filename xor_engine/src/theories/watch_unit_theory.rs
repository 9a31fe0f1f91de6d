use log::trace;

use crate::{Boolean, ConstraintStore, Literal};

use super::{Context, Event, ExplainKey, TheoryTrait};

/// 2 変数監視による単位伝播
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WatchUnitTheory {
    rows: Vec<WatchRow>,
    /// 変数 -> その変数を監視している行
    watchers: Vec<Vec<Watcher>>,
    undo_log: Vec<WatchMove>,
    marks: Vec<usize>,
}

impl WatchUnitTheory {
    pub fn new(store: &ConstraintStore) -> Self {
        let mut rows = Vec::with_capacity(store.len());
        let mut watchers = vec![Vec::default(); store.number_of_variables()];
        for (row_id, constraint) in store.iter().enumerate() {
            let variables = constraint.variables().to_vec();
            let number_of_watched = variables.len().min(2);
            for (position, &variable) in variables[..number_of_watched].iter().enumerate() {
                watchers[variable].push(Watcher { row_id, position });
            }
            rows.push(WatchRow {
                variables,
                number_of_watched,
                rhs: constraint.rhs(),
                folded: false,
            });
        }
        return Self {
            rows,
            watchers,
            undo_log: Vec::default(),
            marks: Vec::default(),
        };
    }
}

impl TheoryTrait for WatchUnitTheory {
    fn initialize(&mut self, _context: &Context, mut callback: impl FnMut(Event)) {
        for (row_id, row) in self.rows.iter().enumerate() {
            let explain_key = ExplainKey::Constraint {
                constraint_id: row_id,
            };
            match row.variables.len() {
                0 if row.rhs => callback(Event::Conflict { explain_key }),
                1 => callback(Event::Propagation {
                    literal: Literal::new(row.variables[0], Boolean::from(row.rhs)),
                    explain_key,
                }),
                _ => {}
            }
        }
    }

    fn assign(&mut self, context: &Context, mut callback: impl FnMut(Event)) {
        let Some(assigned_literal) = context.trail.last() else {
            unreachable!();
        };
        let variable = assigned_literal.index();
        let value = bool::from(assigned_literal.value());

        self.marks.push(self.undo_log.len());
        for &row_id in context.store.constraints_of(variable) {
            self.rows[row_id].folded ^= value;
        }

        'for_k: for k in (0..self.watchers[variable].len()).rev() {
            let watcher = self.watchers[variable][k];
            let row = &mut self.rows[watcher.row_id];
            debug_assert!(row.variables[watcher.position] == variable);

            for p in row.number_of_watched..row.variables.len() {
                let candidate = row.variables[p];
                if !context.trail.is_assigned(candidate) {
                    row.variables.swap(watcher.position, p);
                    self.watchers[variable].swap_remove(k);
                    self.watchers[candidate].push(watcher);
                    self.undo_log.push(WatchMove {
                        from: variable,
                        k,
                        to: candidate,
                        p,
                    });
                    continue 'for_k;
                }
            }

            let explain_key = ExplainKey::Constraint {
                constraint_id: watcher.row_id,
            };
            let other = if row.number_of_watched == 2 {
                Some(row.variables[1 - watcher.position])
            } else {
                None
            };
            match other {
                Some(other) if !context.trail.is_assigned(other) => {
                    trace!("row {} is unit on l_{}", watcher.row_id, other);
                    callback(Event::Propagation {
                        literal: Literal::new(other, Boolean::from(row.rhs ^ row.folded)),
                        explain_key,
                    });
                }
                _ => {
                    if row.folded != row.rhs {
                        callback(Event::Conflict { explain_key });
                    }
                }
            }
        }
    }

    fn unassign(&mut self, context: &Context, literal: Literal) {
        let Some(mark) = self.marks.pop() else {
            unreachable!("unassign without assign");
        };
        for watch_move in self.undo_log.drain(mark..).rev() {
            let Some(watcher) = self.watchers[watch_move.to].pop() else {
                unreachable!();
            };
            let watchers = &mut self.watchers[watch_move.from];
            watchers.push(watcher);
            let last = watchers.len() - 1;
            watchers.swap(watch_move.k, last);
            self.rows[watcher.row_id]
                .variables
                .swap(watcher.position, watch_move.p);
        }

        let value = bool::from(literal.value());
        for &row_id in context.store.constraints_of(literal.index()) {
            self.rows[row_id].folded ^= value;
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
struct WatchRow {
    /// 先頭 number_of_watched 個が監視されている
    variables: Vec<usize>,
    number_of_watched: usize,
    rhs: bool,
    folded: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Watcher {
    row_id: usize,
    position: usize,
}

/// watchers[from][k] を watchers[to] の末尾へ移し，行の位置 position と p を入れ替えた記録
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct WatchMove {
    from: usize,
    k: usize,
    to: usize,
    p: usize,
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::WatchUnitTheory;
    use crate::{
        Boolean, ConstraintStore, Literal, Parity, ParityConstraint,
        engine::trail::EngineTrail,
        theories::{Context, Event, ExplainKey, TheoryTrait},
    };

    fn lit(index: usize, value: bool) -> Literal {
        Literal::new(index, Boolean::from(value))
    }

    fn assign(
        theory: &mut WatchUnitTheory,
        store: &ConstraintStore,
        trail: &mut EngineTrail,
        literal: Literal,
    ) -> Vec<Event> {
        trail.push(literal, trail.len() + 1);
        let context = Context {
            store,
            trail,
            eliminate: false,
            display: false,
        };
        let mut events = Vec::default();
        theory.assign(&context, |event| events.push(event));
        return events;
    }

    fn unassign_last(
        theory: &mut WatchUnitTheory,
        store: &ConstraintStore,
        trail: &mut EngineTrail,
    ) {
        let Some(literal) = trail.pop_above(trail.decision_level() - 1) else {
            unreachable!();
        };
        let context = Context {
            store,
            trail,
            eliminate: false,
            display: false,
        };
        theory.unassign(&context, literal);
    }

    #[test]
    fn test_watch_moves_are_undone() {
        // l_0 + l_1 + l_2 + l_3 = odd, l_1 + !l_3 = odd
        let store = ConstraintStore::new(
            (0..4).map(|index| lit(index, true)),
            [
                ParityConstraint::new(
                    [lit(0, true), lit(1, true), lit(2, true), lit(3, true)],
                    Parity::Odd,
                ),
                ParityConstraint::new([lit(1, true), lit(3, false)], Parity::Odd),
            ],
        )
        .unwrap();
        let mut theory = WatchUnitTheory::new(&store);
        let mut trail = EngineTrail::new(4);
        let initial = theory.clone();

        assert_eq!(assign(&mut theory, &store, &mut trail, lit(0, true)), vec![]);
        let after_first = theory.clone();

        // 2 行目から l_3 = 0
        assert_eq!(
            assign(&mut theory, &store, &mut trail, lit(1, false)),
            vec![Event::Propagation {
                literal: lit(3, false),
                explain_key: ExplainKey::Constraint { constraint_id: 1 },
            }]
        );

        // 1 行目は l_2 + l_3 = even
        assert_eq!(
            assign(&mut theory, &store, &mut trail, lit(3, false)),
            vec![Event::Propagation {
                literal: lit(2, false),
                explain_key: ExplainKey::Constraint { constraint_id: 0 },
            }]
        );

        unassign_last(&mut theory, &store, &mut trail);
        unassign_last(&mut theory, &store, &mut trail);
        assert_eq!(theory, after_first);
        unassign_last(&mut theory, &store, &mut trail);
        assert_eq!(theory, initial);
    }

    #[test]
    fn test_initialize_reports_single_variable_rows() {
        let store = ConstraintStore::new(
            (0..3).map(|index| lit(index, true)),
            [
                ParityConstraint::new([lit(2, false)], Parity::Even),
                ParityConstraint::new([lit(0, true), lit(0, false)], Parity::Even),
            ],
        )
        .unwrap();
        let mut theory = WatchUnitTheory::new(&store);
        let trail = EngineTrail::new(3);
        let context = Context {
            store: &store,
            trail: &trail,
            eliminate: true,
            display: false,
        };
        let mut events = Vec::default();
        theory.initialize(&context, |event| events.push(event));
        // !l_2 = even なので l_2 = 1，l_0 + !l_0 = even は 1 = 0
        assert_eq!(
            events,
            vec![
                Event::Propagation {
                    literal: lit(2, true),
                    explain_key: ExplainKey::Constraint { constraint_id: 0 },
                },
                Event::Conflict {
                    explain_key: ExplainKey::Constraint { constraint_id: 1 },
                },
            ]
        );
    }
}
