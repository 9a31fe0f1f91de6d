use utility::Set;

use crate::{ConstraintStore, Literal, theories::ExplainKey};

use super::trail::EngineTrail;

/// 説明鍵の制約条件の和をとり，残った変数を現在の値で並べたものを理由とする
pub fn explain(
    store: &ConstraintStore,
    trail: &EngineTrail,
    explain_key: &ExplainKey,
    excluded: Option<usize>,
) -> Vec<Literal> {
    let mut variables = Set::default();
    for constraint_id in explain_key.constraint_ids() {
        for &variable in store.get(constraint_id).variables() {
            variables.toggle(variable);
        }
    }
    if let Some(excluded) = excluded {
        let removed = variables.remove(excluded);
        debug_assert!(removed, "{} does not occur in {:?}", excluded, explain_key);
    }

    return variables
        .to_sorted_vec()
        .into_iter()
        .map(|variable| match trail.value(variable) {
            Some(value) => Literal::new(variable, value),
            None => unreachable!("l_{} occurs in a reason but is unassigned", variable),
        })
        .collect();
}

#[cfg(test)]
mod test {
    use utility::BitSet;

    use super::explain;
    use crate::{
        Boolean, ConstraintStore, Literal, Parity, ParityConstraint, engine::trail::EngineTrail,
        theories::ExplainKey,
    };

    fn lit(index: usize, value: bool) -> Literal {
        Literal::new(index, Boolean::from(value))
    }

    #[test]
    fn test_combination_cancels_shared_variables() {
        // l_0 + l_1 + l_2 = even, l_1 + l_2 + l_3 = odd
        let store = ConstraintStore::new(
            (0..4).map(|index| lit(index, true)),
            [
                ParityConstraint::new([lit(0, true), lit(1, true), lit(2, true)], Parity::Even),
                ParityConstraint::new([lit(1, true), lit(2, true), lit(3, true)], Parity::Odd),
            ],
        )
        .unwrap();
        let mut trail = EngineTrail::new(4);
        trail.push(lit(0, true), 0);

        let explain_key = ExplainKey::Combination {
            provenance: BitSet::from_indices(2, [0, 1].into_iter()),
        };
        assert_eq!(explain(&store, &trail, &explain_key, Some(3)), vec![lit(0, true)]);

        trail.push(lit(1, false), 1);
        trail.push(lit(2, false), 1);
        let explain_key = ExplainKey::Constraint { constraint_id: 0 };
        assert_eq!(
            explain(&store, &trail, &explain_key, None),
            vec![lit(0, true), lit(1, false), lit(2, false)]
        );
    }
}
