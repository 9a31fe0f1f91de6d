use log::{debug, log};

use crate::Literal;

use super::{Context, Event, Matrix, PivotRule, TheoryTrait};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BatchMode {
    /// 単位伝播が不動点に達したときだけ掃き出す．由来は伝播か矛盾が見つかったときにだけ追跡し直す
    Fixpoint,
    /// 割り当てのたびに由来を追跡しながら掃き出す
    Reasoned,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BatchEliminationTheory {
    mode: BatchMode,
}

impl BatchEliminationTheory {
    pub fn new(mode: BatchMode) -> Self {
        Self { mode }
    }

    fn eliminate(context: &Context, track_provenance: bool) -> Matrix {
        let mut matrix = Matrix::new(
            context.store,
            |variable| context.trail.value(variable),
            track_provenance,
        );
        matrix.eliminate(PivotRule::FirstColumn);
        log!(
            context.display_level(),
            "eliminated at {} assignments\n{}",
            context.trail.len(),
            matrix
        );
        return matrix;
    }

    fn eliminate_and_scan(&self, context: &Context, callback: impl FnMut(Event)) {
        if self.mode == BatchMode::Fixpoint {
            if !Self::eliminate(context, false).has_event() {
                return;
            }
            debug!("re-eliminating with provenance");
        }
        Self::eliminate(context, true).scan(context.store, callback);
    }
}

impl TheoryTrait for BatchEliminationTheory {
    fn initialize(&mut self, context: &Context, callback: impl FnMut(Event)) {
        if self.mode == BatchMode::Reasoned && context.eliminate {
            self.eliminate_and_scan(context, callback);
        }
    }

    fn assign(&mut self, context: &Context, callback: impl FnMut(Event)) {
        if self.mode == BatchMode::Reasoned && context.eliminate {
            self.eliminate_and_scan(context, callback);
        }
    }

    fn unassign(&mut self, _context: &Context, _literal: Literal) {}

    fn at_fixpoint(&mut self, context: &Context, callback: impl FnMut(Event)) {
        if self.mode == BatchMode::Fixpoint && context.eliminate {
            self.eliminate_and_scan(context, callback);
        }
    }
}
