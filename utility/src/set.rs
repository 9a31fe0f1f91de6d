#[derive(Default, Clone)]
pub struct Set {
    index_to_position: Vec<usize>,
    indices: Vec<usize>,
}

impl Set {
    const NULL_POSITION: usize = usize::MAX;

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline(always)]
    pub fn contains_key(&self, index: usize) -> bool {
        return index < self.index_to_position.len()
            && self.index_to_position[index] != Self::NULL_POSITION;
    }

    pub fn insert(&mut self, index: usize) -> bool {
        if index >= self.index_to_position.len() {
            self.index_to_position
                .resize(index + 1, Self::NULL_POSITION);
        }
        if self.index_to_position[index] != Self::NULL_POSITION {
            return false;
        }
        self.index_to_position[index] = self.indices.len();
        self.indices.push(index);
        return true;
    }

    pub fn remove(&mut self, index: usize) -> bool {
        if !self.contains_key(index) {
            return false;
        }
        let position = self.index_to_position[index];
        debug_assert!(self.indices[position] == index);
        self.indices.swap_remove(position);
        self.index_to_position[index] = Self::NULL_POSITION;
        if position != self.indices.len() {
            self.index_to_position[self.indices[position]] = position;
        }
        return true;
    }

    pub fn toggle(&mut self, index: usize) {
        if !self.remove(index) {
            self.insert(index);
        }
    }

    pub fn extend(&mut self, indices: impl Iterator<Item = usize>) {
        for index in indices {
            self.insert(index);
        }
    }

    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = usize> + Clone + '_ {
        self.indices.iter().cloned()
    }

    pub fn to_sorted_vec(&self) -> Vec<usize> {
        let mut indices = self.indices.clone();
        indices.sort_unstable();
        return indices;
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        return self.len() == other.len() && self.iter().all(|index| other.contains_key(index));
    }
}

impl Eq for Set {}

impl std::fmt::Debug for Set {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.to_sorted_vec()).finish()
    }
}
