mod explain;
pub(crate) mod trail;

use std::collections::{HashMap, hash_map::Entry};

use log::{debug, log};

use crate::{
    AssignmentTrait, ConstraintStore, EngineConfig, Literal, ParityConstraintTrait, Result,
    theories::{Context, Event, ExplainKey, Theory, TheoryTrait},
};
use explain::explain;
use trail::EngineTrail;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Propagation {
    pub literal: Literal,
    /// ホストで真となっているリテラル (変数の昇順)
    pub reason: Vec<Literal>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PropagationResult {
    Nothing,
    Forced(Vec<Propagation>),
    Conflict { reason: Vec<Literal> },
}

impl PropagationResult {
    pub fn is_nothing(&self) -> bool {
        return matches!(self, Self::Nothing);
    }

    pub fn is_conflict(&self) -> bool {
        return matches!(self, Self::Conflict { .. });
    }

    pub fn forced(&self) -> &[Propagation] {
        return match self {
            Self::Forced(propagations) => propagations,
            _ => &[],
        };
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CheckResult {
    Ok,
    Conflict { reason: Vec<Literal> },
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        return matches!(self, Self::Ok);
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    Ready,
    /// 決定レベル decision_level で矛盾を報告した．それより前まで undo されるまで伝播できない
    Conflicted { decision_level: usize },
}

impl State {
    pub fn is_ready(&self) -> bool {
        return matches!(self, Self::Ready);
    }

    pub fn is_conflicted(&self) -> bool {
        return matches!(self, Self::Conflicted { .. });
    }
}

#[derive(Clone, Copy)]
enum Phase {
    Initialize,
    Assign,
    Fixpoint,
}

/// XOR 制約条件の伝播エンジン
#[derive(Clone, PartialEq, Debug)]
pub struct XorEngine {
    config: EngineConfig,
    store: ConstraintStore,
    trail: EngineTrail,
    theory: Theory,
    state: State,
    /// propagate で通知された最大の決定レベル (undo でそのレベルまで下がる)
    highest_decision_level: usize,
}

impl XorEngine {
    pub fn init<ConstraintT>(
        universe: impl IntoIterator<Item = Literal>,
        constraints: impl IntoIterator<Item = ConstraintT>,
        config: EngineConfig,
    ) -> Result<Self>
    where
        ConstraintT: ParityConstraintTrait,
    {
        let store = ConstraintStore::new(universe, constraints)?;
        return Ok(Self::with_store(store, config));
    }

    pub fn with_store(store: ConstraintStore, config: EngineConfig) -> Self {
        debug!(
            "{} constraints over {} relevant variables, strategy {}, cutoff {}",
            store.len(),
            store.number_of_columns(),
            config.strategy,
            config.cutoff.value()
        );
        log!(
            if config.display {
                log::Level::Info
            } else {
                log::Level::Trace
            },
            "constraints\n{}",
            store
        );
        let theory = Theory::new(config.strategy, &store);
        return Self {
            config,
            trail: EngineTrail::new(store.number_of_variables()),
            store,
            theory,
            state: State::Ready,
            highest_decision_level: 0,
        };
    }

    #[inline(always)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline(always)]
    pub fn store(&self) -> &ConstraintStore {
        &self.store
    }

    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline(always)]
    pub fn number_of_assignments(&self) -> usize {
        self.trail.len()
    }

    /// 何も propagate していない状態で 1 度呼び，根で決まるリテラルや矛盾を求める
    pub fn initial_propagation(&mut self, assignment: &impl AssignmentTrait) -> PropagationResult {
        assert!(self.trail.is_empty() && self.state.is_ready());
        self.highest_decision_level = self
            .highest_decision_level
            .max(assignment.decision_level());

        let events = self.run_theory(Phase::Initialize);
        let mut result = self.resolve(assignment, events);
        if result.is_nothing() {
            let events = self.run_theory(Phase::Fixpoint);
            result = self.resolve(assignment, events);
        }
        if result.is_conflict() {
            self.state = State::Conflicted {
                decision_level: assignment.decision_level(),
            };
        }
        return result;
    }

    pub fn propagate(
        &mut self,
        assignment: &impl AssignmentTrait,
        literal: Literal,
    ) -> PropagationResult {
        assert!(self.state.is_ready(), "propagate on a conflicted engine");
        assert!(
            assignment.is_true(literal),
            "{} is not assigned by the host",
            literal
        );
        let decision_level = assignment.decision_level();
        assert!(
            decision_level >= self.trail.decision_level(),
            "undo to level {} is missing",
            decision_level
        );
        self.highest_decision_level = self.highest_decision_level.max(decision_level);

        if !self.store.is_relevant(literal.index()) {
            return PropagationResult::Nothing;
        }
        if self.trail.is_assigned(literal.index()) {
            debug_assert!(self.trail.value(literal.index()) == Some(literal.value()));
            return PropagationResult::Nothing;
        }

        debug!("propagate {} at level {}", literal, decision_level);
        self.trail.push(literal, decision_level);

        let events = self.run_theory(Phase::Assign);
        let mut result = self.resolve(assignment, events);
        if result.is_nothing() {
            let events = self.run_theory(Phase::Fixpoint);
            result = self.resolve(assignment, events);
        }
        if result.is_conflict() {
            self.state = State::Conflicted { decision_level };
        }
        return result;
    }

    /// 決定レベルが decision_level より大きい割り当てをすべて取り消す
    pub fn undo(&mut self, decision_level: usize) {
        assert!(
            decision_level <= self.highest_decision_level,
            "undo to level {} never reached (highest level {})",
            decision_level,
            self.highest_decision_level
        );
        while let Some(literal) = self.trail.pop_above(decision_level) {
            let context = Context {
                store: &self.store,
                trail: &self.trail,
                eliminate: false,
                display: self.config.display,
            };
            self.theory.unassign(&context, literal);
        }
        if let State::Conflicted {
            decision_level: conflict_level,
        } = self.state
        {
            if decision_level < conflict_level {
                self.state = State::Ready;
            }
        }
        self.highest_decision_level = decision_level;
        debug!(
            "undo to level {}, {} assignments remain",
            decision_level,
            self.trail.len()
        );
    }

    pub fn check(&self, assignment: &impl AssignmentTrait) -> CheckResult {
        for constraint in self.store.iter() {
            if constraint.is_satisfied_by(|index| assignment.current_value(index)) == Some(false) {
                debug!("check failed on {}", constraint);
                let reason = constraint
                    .variables()
                    .iter()
                    .filter_map(|&variable| {
                        assignment
                            .current_value(variable)
                            .map(|value| Literal::new(variable, value))
                    })
                    .collect();
                return CheckResult::Conflict { reason };
            }
        }
        return CheckResult::Ok;
    }

    fn run_theory(&mut self, phase: Phase) -> Vec<Event> {
        let context = Context {
            store: &self.store,
            trail: &self.trail,
            eliminate: self
                .config
                .cutoff
                .admits(self.trail.len(), self.store.number_of_columns()),
            display: self.config.display,
        };
        let mut events = Vec::default();
        let callback = |event: Event| events.push(event);
        match phase {
            Phase::Initialize => self.theory.initialize(&context, callback),
            Phase::Assign => self.theory.assign(&context, callback),
            Phase::Fixpoint => self.theory.at_fixpoint(&context, callback),
        }
        return events;
    }

    fn resolve(&self, assignment: &impl AssignmentTrait, events: Vec<Event>) -> PropagationResult {
        for event in events.iter() {
            if let Event::Conflict { explain_key } = event {
                let reason = explain(&self.store, &self.trail, explain_key, None);
                debug!("conflict {:?}", reason);
                return PropagationResult::Conflict { reason };
            }
        }

        let mut forced: Vec<(Literal, &ExplainKey)> = Vec::default();
        let mut position_of_variable: HashMap<usize, usize> = HashMap::default();
        for event in events.iter() {
            let Event::Propagation {
                literal,
                explain_key,
            } = event
            else {
                continue;
            };
            let literal = *literal;
            debug_assert!(!self.trail.is_assigned(literal.index()));

            if assignment.is_true(literal) {
                continue;
            }
            if assignment.is_false(literal) {
                let mut reason =
                    explain(&self.store, &self.trail, explain_key, Some(literal.index()));
                reason.push(!literal);
                reason.sort_unstable_by_key(|literal| literal.index());
                debug!("{} is forced but assigned {} ({:?})", literal, !literal, reason);
                return PropagationResult::Conflict { reason };
            }

            match position_of_variable.entry(literal.index()) {
                Entry::Occupied(entry) => {
                    let (previous, previous_explain_key) = forced[*entry.get()];
                    if previous != literal {
                        let explain_key = previous_explain_key.combine(explain_key, self.store.len());
                        let reason = explain(&self.store, &self.trail, &explain_key, None);
                        debug!("both {} and {} are forced ({:?})", previous, literal, reason);
                        return PropagationResult::Conflict { reason };
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(forced.len());
                    forced.push((literal, explain_key));
                }
            }
        }

        if forced.is_empty() {
            return PropagationResult::Nothing;
        }
        let propagations: Vec<Propagation> = forced
            .into_iter()
            .map(|(literal, explain_key)| Propagation {
                literal,
                reason: explain(&self.store, &self.trail, explain_key, Some(literal.index())),
            })
            .collect();
        debug!("forced {:?}", propagations);
        return PropagationResult::Forced(propagations);
    }
}
