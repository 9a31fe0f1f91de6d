use either::Either;
use log::Level;
use utility::BitSet;

use crate::{ConstraintStore, Literal, Strategy, engine::trail::EngineTrail};

mod batch_elimination_theory;
mod count_check_theory;
mod incremental_elimination_theory;
mod matrix;
mod watch_unit_theory;

pub use batch_elimination_theory::{BatchEliminationTheory, BatchMode};
pub use count_check_theory::CountCheckTheory;
pub use incremental_elimination_theory::IncrementalEliminationTheory;
pub use matrix::{Matrix, PivotRule};
pub use watch_unit_theory::WatchUnitTheory;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ExplainKey {
    Constraint { constraint_id: usize },
    /// 行の由来 (足し合わせた制約条件の位置の集合)
    Combination { provenance: BitSet },
}

impl ExplainKey {
    pub fn constraint_ids(&self) -> impl Iterator<Item = usize> + '_ {
        return match self {
            Self::Constraint { constraint_id } => Either::Left(std::iter::once(*constraint_id)),
            Self::Combination { provenance } => Either::Right(provenance.iter_ones()),
        };
    }

    pub fn combine(&self, other: &ExplainKey, number_of_constraints: usize) -> ExplainKey {
        let mut provenance = BitSet::new(number_of_constraints);
        for constraint_id in self.constraint_ids().chain(other.constraint_ids()) {
            provenance.toggle(constraint_id);
        }
        return ExplainKey::Combination { provenance };
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Event {
    Propagation {
        literal: Literal,
        explain_key: ExplainKey,
    },
    Conflict {
        explain_key: ExplainKey,
    },
}

pub struct Context<'a> {
    pub store: &'a ConstraintStore,
    pub trail: &'a EngineTrail,
    pub eliminate: bool,
    pub display: bool,
}

impl Context<'_> {
    pub fn display_level(&self) -> Level {
        return if self.display {
            Level::Info
        } else {
            Level::Trace
        };
    }
}

pub trait TheoryTrait {
    fn initialize(&mut self, context: &Context, callback: impl FnMut(Event));

    /// trail の末尾の割り当てを反映する
    fn assign(&mut self, context: &Context, callback: impl FnMut(Event));

    /// assign の逆操作 (新しいものから順に呼ばれる)
    fn unassign(&mut self, context: &Context, literal: Literal);

    /// 1 回の propagate で何も見つからなかったときに呼ばれる
    fn at_fixpoint(&mut self, _context: &Context, _callback: impl FnMut(Event)) {}
}

#[derive(Clone, PartialEq, Debug)]
pub enum Theory {
    CountCheck(CountCheckTheory),
    Unit(WatchUnitTheory),
    Batch {
        unit: WatchUnitTheory,
        elimination: BatchEliminationTheory,
    },
    Incremental {
        unit: WatchUnitTheory,
        elimination: IncrementalEliminationTheory,
    },
}

impl Theory {
    pub fn new(strategy: Strategy, store: &ConstraintStore) -> Self {
        return match strategy {
            Strategy::CountCheck => Self::CountCheck(CountCheckTheory::new(store)),
            Strategy::UnitPropagation => Self::Unit(WatchUnitTheory::new(store)),
            Strategy::GjeFixpoint => Self::Batch {
                unit: WatchUnitTheory::new(store),
                elimination: BatchEliminationTheory::new(BatchMode::Fixpoint),
            },
            Strategy::GjeReasoned => Self::Batch {
                unit: WatchUnitTheory::new(store),
                elimination: BatchEliminationTheory::new(BatchMode::Reasoned),
            },
            Strategy::GjeIncremental => Self::Incremental {
                unit: WatchUnitTheory::new(store),
                elimination: IncrementalEliminationTheory::new(store, PivotRule::FirstColumn),
            },
            Strategy::GjeTableau => Self::Incremental {
                unit: WatchUnitTheory::new(store),
                elimination: IncrementalEliminationTheory::new(store, PivotRule::MinimumFill),
            },
        };
    }
}

impl TheoryTrait for Theory {
    fn initialize(&mut self, context: &Context, mut callback: impl FnMut(Event)) {
        match self {
            Self::CountCheck(theory) => theory.initialize(context, callback),
            Self::Unit(theory) => theory.initialize(context, callback),
            Self::Batch { unit, elimination } => {
                unit.initialize(context, &mut callback);
                elimination.initialize(context, &mut callback);
            }
            Self::Incremental { unit, elimination } => {
                unit.initialize(context, &mut callback);
                elimination.initialize(context, &mut callback);
            }
        }
    }

    fn assign(&mut self, context: &Context, mut callback: impl FnMut(Event)) {
        match self {
            Self::CountCheck(theory) => theory.assign(context, callback),
            Self::Unit(theory) => theory.assign(context, callback),
            Self::Batch { unit, elimination } => {
                unit.assign(context, &mut callback);
                elimination.assign(context, &mut callback);
            }
            Self::Incremental { unit, elimination } => {
                unit.assign(context, &mut callback);
                elimination.assign(context, &mut callback);
            }
        }
    }

    fn unassign(&mut self, context: &Context, literal: Literal) {
        match self {
            Self::CountCheck(theory) => theory.unassign(context, literal),
            Self::Unit(theory) => theory.unassign(context, literal),
            Self::Batch { unit, elimination } => {
                elimination.unassign(context, literal);
                unit.unassign(context, literal);
            }
            Self::Incremental { unit, elimination } => {
                elimination.unassign(context, literal);
                unit.unassign(context, literal);
            }
        }
    }

    fn at_fixpoint(&mut self, context: &Context, mut callback: impl FnMut(Event)) {
        match self {
            Self::CountCheck(theory) => theory.at_fixpoint(context, callback),
            Self::Unit(theory) => theory.at_fixpoint(context, callback),
            Self::Batch { unit, elimination } => {
                unit.at_fixpoint(context, &mut callback);
                elimination.at_fixpoint(context, &mut callback);
            }
            Self::Incremental { unit, elimination } => {
                unit.at_fixpoint(context, &mut callback);
                elimination.at_fixpoint(context, &mut callback);
            }
        }
    }
}
