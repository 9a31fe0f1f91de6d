use utility::BitSet;

use crate::{Boolean, ConstraintStore, Literal};

use super::{Event, ExplainKey};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PivotRule {
    /// 添字が最小の列
    FirstColumn,
    /// 他の行に現れる回数が最小の列 (同数なら添字が最小)
    MinimumFill,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Row {
    pub columns: BitSet,
    pub rhs: bool,
    /// 足し合わせた元の制約条件の位置
    pub provenance: BitSet,
    pub pivot: Option<usize>,
}

/// ピボットをもつ行のピボット列は他のどの行にも現れない．
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Matrix {
    rows: Vec<Row>,
    row_of_pivot: Vec<Option<usize>>,
    track_provenance: bool,
}

impl Matrix {
    pub fn new(
        store: &ConstraintStore,
        value: impl Fn(usize) -> Option<Boolean>,
        track_provenance: bool,
    ) -> Self {
        let mut rows = Vec::with_capacity(store.len());
        for (row_id, constraint) in store.iter().enumerate() {
            let mut columns = BitSet::new(store.number_of_columns());
            let mut rhs = constraint.rhs();
            for &variable in constraint.variables() {
                match value(variable) {
                    Some(value) => rhs ^= bool::from(value),
                    None => match store.column_of(variable) {
                        Some(column) => columns.insert(column),
                        None => unreachable!(),
                    },
                }
            }
            let provenance = if track_provenance {
                BitSet::from_indices(store.len(), std::iter::once(row_id))
            } else {
                BitSet::default()
            };
            rows.push(Row {
                columns,
                rhs,
                provenance,
                pivot: None,
            });
        }
        return Self {
            rows,
            row_of_pivot: vec![None; store.number_of_columns()],
            track_provenance,
        };
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    pub fn row(&self, row_id: usize) -> &Row {
        &self.rows[row_id]
    }

    #[inline(always)]
    pub fn pivot_row(&self, column: usize) -> Option<usize> {
        self.row_of_pivot[column]
    }

    /// 変更前のピボットを返す
    pub fn set_pivot(&mut self, row_id: usize, pivot: Option<usize>) -> Option<usize> {
        let previous = std::mem::replace(&mut self.rows[row_id].pivot, pivot);
        if let Some(column) = previous {
            debug_assert!(self.row_of_pivot[column] == Some(row_id));
            self.row_of_pivot[column] = None;
        }
        if let Some(column) = pivot {
            debug_assert!(self.row_of_pivot[column].is_none());
            self.row_of_pivot[column] = Some(row_id);
        }
        return previous;
    }

    pub fn add_row(&mut self, source: usize, target: usize) {
        assert!(source != target);
        let (source_row, target_row) = if source < target {
            let (head, tail) = self.rows.split_at_mut(target);
            (&head[source], &mut tail[0])
        } else {
            let (head, tail) = self.rows.split_at_mut(source);
            (&tail[0], &mut head[target])
        };
        target_row.columns.xor_assign(&source_row.columns);
        target_row.rhs ^= source_row.rhs;
        target_row.provenance.xor_assign(&source_row.provenance);
    }

    /// 列を値 value として各行から取り除き，取り除いた行を返す
    pub fn fold(&mut self, column: usize, value: bool) -> Vec<usize> {
        let mut folded_rows = Vec::default();
        for (row_id, row) in self.rows.iter_mut().enumerate() {
            if row.columns.contains(column) {
                row.columns.remove(column);
                row.rhs ^= value;
                folded_rows.push(row_id);
            }
        }
        return folded_rows;
    }

    pub fn unfold(&mut self, column: usize, value: bool, folded_rows: &[usize]) {
        for &row_id in folded_rows {
            let row = &mut self.rows[row_id];
            debug_assert!(!row.columns.contains(column));
            row.columns.insert(column);
            row.rhs ^= value;
        }
    }

    pub fn select_pivot(&self, row_id: usize, rule: PivotRule) -> Option<usize> {
        let columns = &self.rows[row_id].columns;
        return match rule {
            PivotRule::FirstColumn => columns.first_one(),
            PivotRule::MinimumFill => columns.iter_ones().min_by_key(|&column| {
                let fill = self
                    .rows
                    .iter()
                    .filter(|row| row.columns.contains(column))
                    .count();
                (fill, column)
            }),
        };
    }

    /// column を row_id 以外の行から消去し，足し込んだ行を返す (ピボットは設定しない)
    pub fn pivot_on(&mut self, row_id: usize, column: usize) -> Vec<usize> {
        debug_assert!(self.rows[row_id].columns.contains(column));
        let targets: Vec<usize> = (0..self.rows.len())
            .filter(|&target| target != row_id && self.rows[target].columns.contains(column))
            .collect();
        for &target in targets.iter() {
            self.add_row(row_id, target);
        }
        return targets;
    }

    pub fn eliminate(&mut self, rule: PivotRule) {
        for row_id in 0..self.rows.len() {
            if self.rows[row_id].pivot.is_some() {
                continue;
            }
            if let Some(column) = self.select_pivot(row_id, rule) {
                self.pivot_on(row_id, column);
                self.set_pivot(row_id, Some(column));
            }
        }
        debug_assert!(self.is_reduced());
    }

    pub fn scan(&self, store: &ConstraintStore, mut callback: impl FnMut(Event)) {
        assert!(self.track_provenance);
        for row in self.rows.iter() {
            let explain_key = || ExplainKey::Combination {
                provenance: row.provenance.clone(),
            };
            let mut columns = row.columns.iter_ones();
            match (columns.next(), columns.next()) {
                (None, _) if row.rhs => callback(Event::Conflict {
                    explain_key: explain_key(),
                }),
                (Some(column), None) => callback(Event::Propagation {
                    literal: Literal::new(store.variable_of_column(column), Boolean::from(row.rhs)),
                    explain_key: explain_key(),
                }),
                _ => {}
            }
        }
    }

    pub fn has_event(&self) -> bool {
        return self.rows.iter().any(|row| {
            let mut columns = row.columns.iter_ones();
            match (columns.next(), columns.next()) {
                (None, _) => row.rhs,
                (Some(_), None) => true,
                _ => false,
            }
        });
    }

    /// 空でない行はすべてピボットをもち，ピボット列はその行にだけ現れる
    pub fn is_reduced(&self) -> bool {
        for (row_id, row) in self.rows.iter().enumerate() {
            match row.pivot {
                None => {
                    if !row.columns.is_zero() {
                        return false;
                    }
                }
                Some(column) => {
                    if self.row_of_pivot[column] != Some(row_id) {
                        return false;
                    }
                    let occurrences = self
                        .rows
                        .iter()
                        .filter(|other| other.columns.contains(column))
                        .count();
                    if !row.columns.contains(column) || occurrences != 1 {
                        return false;
                    }
                }
            }
        }
        return true;
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows.iter() {
            write!(f, "{} | {}", row.columns, row.rhs as u8)?;
            if let Some(pivot) = row.pivot {
                write!(f, " pivot {}", pivot)?;
            }
            if self.track_provenance {
                write!(f, " <- {}", row.provenance)?;
            }
            writeln!(f)?;
        }
        return Ok(());
    }
}
