use crate::{Boolean, Literal};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EngineTrail {
    values: Vec<Option<Boolean>>,
    entries: Vec<TrailEntry>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct TrailEntry {
    literal: Literal,
    decision_level: usize,
}

impl EngineTrail {
    pub fn new(number_of_variables: usize) -> Self {
        Self {
            values: vec![None; number_of_variables],
            entries: Vec::default(),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline(always)]
    pub fn last(&self) -> Option<Literal> {
        return self.entries.last().map(|entry| entry.literal);
    }

    #[inline(always)]
    pub fn value(&self, index: usize) -> Option<Boolean> {
        self.values[index]
    }

    #[inline(always)]
    pub fn is_assigned(&self, index: usize) -> bool {
        self.values[index].is_some()
    }

    pub fn decision_level(&self) -> usize {
        return self.entries.last().map_or(0, |entry| entry.decision_level);
    }

    pub fn push(&mut self, literal: Literal, decision_level: usize) {
        debug_assert!(self.values[literal.index()].is_none());
        debug_assert!(decision_level >= self.decision_level());
        self.values[literal.index()] = Some(literal.value());
        self.entries.push(TrailEntry {
            literal,
            decision_level,
        });
    }

    pub fn pop_above(&mut self, decision_level: usize) -> Option<Literal> {
        if self.entries.last()?.decision_level <= decision_level {
            return None;
        }
        let entry = self.entries.pop()?;
        self.values[entry.literal.index()] = None;
        return Some(entry.literal);
    }
}

#[cfg(test)]
mod test {
    use super::EngineTrail;
    use crate::{Boolean, Literal};

    #[test]
    fn test_pop_above() {
        let mut trail = EngineTrail::new(4);
        trail.push(Literal::new(2, Boolean::TRUE), 0);
        trail.push(Literal::new(0, Boolean::FALSE), 1);
        trail.push(Literal::new(3, Boolean::TRUE), 3);

        assert_eq!(trail.decision_level(), 3);
        assert_eq!(trail.pop_above(1), Some(Literal::new(3, Boolean::TRUE)));
        assert_eq!(trail.pop_above(1), None);
        assert_eq!(trail.len(), 2);
        assert_eq!(trail.value(3), None);
        assert_eq!(trail.value(0), Some(Boolean::FALSE));

        assert_eq!(trail.pop_above(0), Some(Literal::new(0, Boolean::FALSE)));
        assert_eq!(trail.pop_above(0), None);
        assert_eq!(trail.last(), Some(Literal::new(2, Boolean::TRUE)));
        assert_eq!(trail, {
            let mut expected = EngineTrail::new(4);
            expected.push(Literal::new(2, Boolean::TRUE), 0);
            expected
        });
    }
}
