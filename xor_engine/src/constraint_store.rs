use std::collections::{BTreeMap, btree_map::Entry};

use utility::Set;

use crate::{
    Boolean, Error, Literal, MalformedKind, Parity, ParityConstraintTrait, ParityFact, Result,
};

/// 正規化済みの制約条件 (負リテラルは右辺を反転させ，2 回現れる変数は打ち消し合う)
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StoredConstraint {
    id: usize,
    literals: Vec<Literal>,
    parity: Parity,
    variables: Vec<usize>,
    rhs: bool,
}

impl StoredConstraint {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// 昇順
    pub fn variables(&self) -> &[usize] {
        &self.variables
    }

    pub fn rhs(&self) -> bool {
        self.rhs
    }
}

impl ParityConstraintTrait for StoredConstraint {
    fn iter_terms(&self) -> impl Iterator<Item = Literal> + Clone + '_ {
        self.literals.iter().cloned()
    }

    fn parity(&self) -> Parity {
        self.parity
    }
}

impl std::fmt::Display for StoredConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}: ", self.id)?;
        for (k, literal) in self.literals.iter().enumerate() {
            if k != 0 {
                write!(f, " + ")?;
            }
            write!(f, "{}", literal)?;
        }
        write!(f, " = {}", self.parity)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ConstraintStore {
    number_of_variables: usize,
    constraints: Vec<StoredConstraint>,
    occurrences: Vec<Vec<usize>>,
    column_of_variable: Vec<Option<usize>>,
    variable_of_column: Vec<usize>,
}

impl ConstraintStore {
    pub fn new<ConstraintT>(
        universe: impl IntoIterator<Item = Literal>,
        constraints: impl IntoIterator<Item = ConstraintT>,
    ) -> Result<Self>
    where
        ConstraintT: ParityConstraintTrait,
    {
        let universe = Self::collect_universe(universe);
        let mut stored_constraints = Vec::default();
        for (id, constraint) in constraints.into_iter().enumerate() {
            stored_constraints.push(Self::normalize(
                id,
                constraint.iter_terms().collect(),
                constraint.parity(),
                &universe,
            )?);
        }
        return Ok(Self::build(&universe, stored_constraints));
    }

    /// 事実を制約 ID ごとにまとめる．制約条件は ID の昇順に並ぶ
    pub fn from_facts(
        universe: impl IntoIterator<Item = Literal>,
        facts: impl IntoIterator<Item = ParityFact>,
    ) -> Result<Self> {
        let universe = Self::collect_universe(universe);
        let mut groups: BTreeMap<usize, (Parity, Vec<Literal>)> = BTreeMap::default();
        for fact in facts {
            match groups.entry(fact.constraint_id) {
                Entry::Vacant(entry) => {
                    entry.insert((fact.parity, vec![fact.literal]));
                }
                Entry::Occupied(mut entry) => {
                    if entry.get().0 != fact.parity {
                        return Err(Error::MalformedConstraint {
                            constraint_id: fact.constraint_id,
                            kind: MalformedKind::InconsistentParity,
                        });
                    }
                    entry.get_mut().1.push(fact.literal);
                }
            }
        }

        let mut stored_constraints = Vec::default();
        for (id, (parity, literals)) in groups {
            stored_constraints.push(Self::normalize(id, literals, parity, &universe)?);
        }
        return Ok(Self::build(&universe, stored_constraints));
    }

    fn collect_universe(universe: impl IntoIterator<Item = Literal>) -> Set {
        let mut set = Set::default();
        set.extend(universe.into_iter().map(|literal| literal.index()));
        return set;
    }

    fn normalize(
        id: usize,
        literals: Vec<Literal>,
        parity: Parity,
        universe: &Set,
    ) -> Result<StoredConstraint> {
        if literals.is_empty() {
            return Err(Error::MalformedConstraint {
                constraint_id: id,
                kind: MalformedKind::EmptyLiteralSet,
            });
        }

        let mut rhs = parity.bit();
        let mut variables = Set::default();
        for &literal in literals.iter() {
            if !universe.contains_key(literal.index()) {
                return Err(Error::MalformedConstraint {
                    constraint_id: id,
                    kind: MalformedKind::LiteralOutsideUniverse(literal),
                });
            }
            // !x = x + 1
            if literal.value() == Boolean::FALSE {
                rhs = !rhs;
            }
            variables.toggle(literal.index());
        }

        return Ok(StoredConstraint {
            id,
            literals,
            parity,
            variables: variables.to_sorted_vec(),
            rhs,
        });
    }

    fn build(universe: &Set, constraints: Vec<StoredConstraint>) -> Self {
        let number_of_variables = universe.iter().max().map_or(0, |index| index + 1);

        let mut occurrences = vec![Vec::default(); number_of_variables];
        for (position, constraint) in constraints.iter().enumerate() {
            for &variable in constraint.variables.iter() {
                occurrences[variable].push(position);
            }
        }

        let mut column_of_variable = vec![None; number_of_variables];
        let mut variable_of_column = Vec::default();
        for variable in 0..number_of_variables {
            if !occurrences[variable].is_empty() {
                column_of_variable[variable] = Some(variable_of_column.len());
                variable_of_column.push(variable);
            }
        }

        return Self {
            number_of_variables,
            constraints,
            occurrences,
            column_of_variable,
            variable_of_column,
        };
    }

    #[inline(always)]
    pub fn number_of_variables(&self) -> usize {
        self.number_of_variables
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, position: usize) -> &StoredConstraint {
        &self.constraints[position]
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredConstraint> + Clone + '_ {
        self.constraints.iter()
    }

    #[inline(always)]
    pub fn constraints_of(&self, variable: usize) -> &[usize] {
        return match self.occurrences.get(variable) {
            Some(positions) => positions,
            None => &[],
        };
    }

    /// いずれかの制約条件に (打ち消されずに) 現れる変数であれば true
    #[inline(always)]
    pub fn is_relevant(&self, variable: usize) -> bool {
        return self.column_of(variable).is_some();
    }

    #[inline(always)]
    pub fn column_of(&self, variable: usize) -> Option<usize> {
        return self.column_of_variable.get(variable).copied().flatten();
    }

    #[inline(always)]
    pub fn variable_of_column(&self, column: usize) -> usize {
        self.variable_of_column[column]
    }

    #[inline(always)]
    pub fn number_of_columns(&self) -> usize {
        self.variable_of_column.len()
    }
}

impl std::fmt::Display for ConstraintStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for constraint in self.constraints.iter() {
            writeln!(f, "{}", constraint)?;
        }
        return Ok(());
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::ConstraintStore;
    use crate::{
        Boolean, Error, Literal, MalformedKind, Parity, ParityConstraint, ParityFact,
    };

    fn lit(index: usize, value: bool) -> Literal {
        Literal::new(index, Boolean::from(value))
    }

    fn universe(n: usize) -> impl Iterator<Item = Literal> {
        (0..n).map(|index| lit(index, true))
    }

    #[test]
    fn test_normalization() {
        let store = ConstraintStore::new(
            universe(5),
            [
                // l_0 + !l_1 = odd  =>  x0 + x1 = 0
                ParityConstraint::new([lit(0, true), lit(1, false)], Parity::Odd),
                // l_2 + l_3 + l_2 = even  =>  x3 = 0
                ParityConstraint::new([lit(2, true), lit(3, true), lit(2, true)], Parity::Even),
                // l_4 + !l_4 = even  =>  0 = 1
                ParityConstraint::new([lit(4, true), lit(4, false)], Parity::Even),
            ],
        )
        .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.get(0).variables(), &[0, 1]);
        assert!(!store.get(0).rhs());
        assert_eq!(store.get(1).variables(), &[3]);
        assert!(!store.get(1).rhs());
        assert!(store.get(2).variables().is_empty());
        assert!(store.get(2).rhs());

        assert_eq!(store.constraints_of(0), &[0]);
        assert_eq!(store.constraints_of(2), &[] as &[usize]);
        assert_eq!(store.constraints_of(100), &[] as &[usize]);
        assert!(!store.is_relevant(2));
        assert!(!store.is_relevant(4));
        assert_eq!(store.number_of_columns(), 3);
        assert_eq!(store.column_of(3), Some(2));
        assert_eq!(store.variable_of_column(2), 3);
    }

    #[test]
    fn test_malformed_constraints() {
        assert_eq!(
            ConstraintStore::new(
                universe(2),
                [ParityConstraint::new(Vec::<Literal>::new(), Parity::Odd)],
            ),
            Err(Error::MalformedConstraint {
                constraint_id: 0,
                kind: MalformedKind::EmptyLiteralSet,
            })
        );
        assert_eq!(
            ConstraintStore::new(
                universe(2),
                [
                    ParityConstraint::new([lit(0, true)], Parity::Odd),
                    ParityConstraint::new([lit(0, true), lit(7, false)], Parity::Odd),
                ],
            ),
            Err(Error::MalformedConstraint {
                constraint_id: 1,
                kind: MalformedKind::LiteralOutsideUniverse(lit(7, false)),
            })
        );
    }

    #[test]
    fn test_from_facts() {
        let fact = |constraint_id, parity, literal| ParityFact {
            constraint_id,
            parity,
            literal,
        };
        let store = ConstraintStore::from_facts(
            universe(3),
            [
                fact(9, Parity::Even, lit(2, true)),
                fact(4, Parity::Odd, lit(0, true)),
                fact(9, Parity::Even, lit(1, false)),
            ],
        )
        .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).id(), 4);
        assert_eq!(store.get(1).id(), 9);
        assert_eq!(store.get(1).literals(), &[lit(2, true), lit(1, false)]);
        assert_eq!(format!("{}", store.get(1)), "#9: l_2 + !l_1 = even");

        assert_eq!(
            ConstraintStore::from_facts(
                universe(3),
                [
                    fact(1, Parity::Even, lit(0, true)),
                    fact(1, Parity::Odd, lit(1, true)),
                ],
            ),
            Err(Error::MalformedConstraint {
                constraint_id: 1,
                kind: MalformedKind::InconsistentParity,
            })
        );
    }
}
