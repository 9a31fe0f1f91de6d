use std::{collections::VecDeque, fs::File, io::BufReader, path::PathBuf};

use clap::Parser;
use log::{debug, info, trace};
use read_facts::{Fact, read_facts};
use xor_engine::{
    AssignmentTrait, Boolean, CheckResult, ConstraintStore, DecisionStack, EngineConfig, Literal,
    PropagationResult, Reason, Strategy, XorEngine,
};

mod read_facts;

#[derive(Parser)]
#[command(name = "solve_xor")]
#[command(about = "Solve a system of parity constraints given as __parity/3 facts")]
struct Args {
    /// Input file (stdin if omitted)
    input: Option<PathBuf>,

    /// Propagation strategy
    #[arg(short, long, default_value = "unit")]
    strategy: Strategy,

    /// Fraction of assigned variables required before elimination runs
    #[arg(short, long, default_value_t = 0.0)]
    cutoff: f64,

    /// Print constraints and matrices at info level
    #[arg(long)]
    display: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    simplelog::TermLogger::init(
        match args.verbose {
            0 if args.display => simplelog::LevelFilter::Info,
            0 => simplelog::LevelFilter::Warn,
            1 => simplelog::LevelFilter::Info,
            2 => simplelog::LevelFilter::Debug,
            _ => simplelog::LevelFilter::Trace,
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let facts = match &args.input {
        Some(path) => read_facts(&mut BufReader::new(File::open(path)?))?,
        None => read_facts(&mut BufReader::new(std::io::stdin()))?,
    };
    let config = EngineConfig::new(args.strategy, args.cutoff, args.display)?;

    let store = ConstraintStore::from_facts(
        facts.iter().map(|fact| fact.to_parity_fact().literal),
        facts.iter().map(Fact::to_parity_fact),
    )?;
    info!(
        "{} facts, {} constraints, {} variables",
        facts.len(),
        store.len(),
        store.number_of_variables()
    );

    let time = std::time::Instant::now();
    let number_of_variables = store.number_of_variables();
    let mut solver = Solver::new(XorEngine::with_store(store, config), number_of_variables);
    let model = solver.solve();
    info!(
        "{} decisions, {} conflicts in {:?}",
        solver.number_of_decisions,
        solver.number_of_conflicts,
        time.elapsed()
    );

    match model {
        Some(model) => {
            println!("SATISFIABLE");
            let values: Vec<String> = model
                .iter()
                .map(|literal| {
                    let variable = literal.index() as i64 + 1;
                    if literal.is_positive() {
                        variable.to_string()
                    } else {
                        (-variable).to_string()
                    }
                })
                .collect();
            println!("v {} 0", values.join(" "));
        }
        None => {
            println!("UNSATISFIABLE")
        }
    }
    return Ok(());
}

struct Solver {
    engine: XorEngine,
    decision_stack: DecisionStack<()>,
    flipped: Vec<bool>,
    number_of_decisions: usize,
    number_of_conflicts: usize,
}

impl Solver {
    fn new(engine: XorEngine, number_of_variables: usize) -> Self {
        Self {
            engine,
            decision_stack: DecisionStack::with_variables(number_of_variables),
            flipped: Vec::default(),
            number_of_decisions: 0,
            number_of_conflicts: 0,
        }
    }

    fn solve(&mut self) -> Option<Vec<Literal>> {
        let result = self.engine.initial_propagation(&self.decision_stack);
        let mut queue = VecDeque::default();
        let mut is_conflict = !self.handle(result, &mut queue);

        loop {
            if !is_conflict {
                is_conflict = !self.drain(&mut queue);
            }

            if is_conflict {
                self.number_of_conflicts += 1;
                queue.clear();
                let Some(literal) = self.flip() else {
                    return None;
                };
                queue.push_back(literal);
                is_conflict = false;
                continue;
            }

            let Some(index) = (0..self.decision_stack.number_of_variables())
                .find(|&index| !self.decision_stack.is_assigned(index))
            else {
                let check_result = self.engine.check(&self.decision_stack);
                assert!(check_result == CheckResult::Ok, "{:?}", check_result);
                return Some(
                    (0..self.decision_stack.number_of_variables())
                        .map(|index| Literal::new(index, self.decision_stack.phase(index)))
                        .collect(),
                );
            };

            let literal = Literal::new(index, Boolean::FALSE);
            self.number_of_decisions += 1;
            self.flipped.push(false);
            self.decision_stack.assign(literal, Reason::Decision);
            queue.push_back(literal);
        }
    }

    fn drain(&mut self, queue: &mut VecDeque<Literal>) -> bool {
        while let Some(literal) = queue.pop_front() {
            let result = self.engine.propagate(&self.decision_stack, literal);
            if !self.handle(result, queue) {
                return false;
            }
        }
        return true;
    }

    /// 矛盾すれば false
    fn handle(&mut self, result: PropagationResult, queue: &mut VecDeque<Literal>) -> bool {
        match result {
            PropagationResult::Nothing => {}
            PropagationResult::Forced(propagations) => {
                for propagation in propagations {
                    debug_assert!(
                        propagation
                            .reason
                            .iter()
                            .all(|&literal| self.decision_stack.is_true(literal))
                    );
                    trace!("{} <- {:?}", propagation.literal, propagation.reason);
                    self.decision_stack
                        .assign(propagation.literal, Reason::Propagation { explain_key: () });
                    queue.push_back(propagation.literal);
                }
            }
            PropagationResult::Conflict { reason } => {
                debug_assert!(
                    reason
                        .iter()
                        .all(|&literal| self.decision_stack.is_true(literal))
                );
                debug!(
                    "conflict at level {}: {:?}",
                    self.decision_stack.decision_level(),
                    reason
                );
                return false;
            }
        }
        return true;
    }

    /// 反転していない最後の決定を反転し，その割り当てを返す．なければ None
    fn flip(&mut self) -> Option<Literal> {
        loop {
            let decision_level = self.decision_stack.decision_level();
            if decision_level == 0 {
                return None;
            }
            let decision = self
                .decision_stack
                .get_assignment(self.decision_stack.order_range(decision_level).start);
            let flipped = self.flipped.pop().unwrap_or(true);

            self.decision_stack.backjump(decision_level - 1);
            self.engine.undo(decision_level - 1);

            if !flipped {
                debug!("flip {} at level {}", decision, decision_level);
                self.flipped.push(true);
                self.decision_stack.assign(!decision, Reason::Decision);
                return Some(!decision);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::BufReader;

    use xor_engine::{ConstraintStore, EngineConfig, ParityConstraintTrait, Strategy, XorEngine};

    use super::{Fact, Solver, read_facts};

    fn solve(input: &str, strategy: Strategy) -> (ConstraintStore, Option<Vec<bool>>) {
        let facts = read_facts(&mut BufReader::new(input.as_bytes())).unwrap();
        let store = ConstraintStore::from_facts(
            facts.iter().map(|fact| fact.to_parity_fact().literal),
            facts.iter().map(Fact::to_parity_fact),
        )
        .unwrap();
        let config = EngineConfig::new(strategy, 0.5, false).unwrap();
        let number_of_variables = store.number_of_variables();
        let engine = XorEngine::with_store(store.clone(), config);
        let mut solver = Solver::new(engine, number_of_variables);
        let model = solver.solve().map(|model| {
            model
                .iter()
                .map(|literal| literal.is_positive())
                .collect::<Vec<bool>>()
        });
        return (store, model);
    }

    #[test]
    fn test_solve() {
        // x1 + x2 = odd, x2 + x3 = odd, x1 + x3 + x4 = odd, !x4 + x5 = even
        let satisfiable = "\
__parity(0,odd,1).
__parity(0,odd,2).
__parity(1,odd,2).
__parity(1,odd,3).
__parity(2,odd,1).
__parity(2,odd,3).
__parity(2,odd,4).
__parity(3,even,-4).
__parity(3,even,5).
";
        // x1 + x2 + x3 = odd, x1 + x2 = even, x3 = even
        let unsatisfiable = "\
__parity(0,odd,1).
__parity(0,odd,2).
__parity(0,odd,3).
__parity(1,even,1).
__parity(1,even,2).
__parity(2,even,3).
";

        for strategy in Strategy::ALL {
            let (store, model) = solve(satisfiable, strategy);
            let Some(model) = model else {
                panic!("{}: no model", strategy);
            };
            for constraint in store.iter() {
                assert_eq!(
                    constraint.is_satisfied_by(|index| Some(model[index].into())),
                    Some(true),
                    "{}: {}",
                    strategy,
                    constraint
                );
            }

            let (_, model) = solve(unsatisfiable, strategy);
            assert_eq!(model, None, "{}", strategy);
        }
    }
}
