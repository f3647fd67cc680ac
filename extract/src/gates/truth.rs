//! Truth tables.

use arcstr::ArcStr;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The output of a combinational gate for every input assignment.
///
/// Rows are in binary counting order with input 0 as the least significant
/// bit: row `r` assigns input `k` the value of bit `k` of `r`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TruthTable {
    inputs: Vec<ArcStr>,
    table: Vec<bool>,
}

impl TruthTable {
    /// Evaluates `f` on every row.
    ///
    /// Fails with [`Error::TooManyInputs`] if there are more than `limit`
    /// inputs.
    ///
    /// ```
    /// # use extract::gates::TruthTable;
    /// let inputs = vec![arcstr::literal!("A"), arcstr::literal!("B")];
    /// let nand = TruthTable::tabulate(inputs, 10, |row| row != 0b11).unwrap();
    /// assert_eq!(nand.as_output_string(), "1110");
    /// ```
    pub fn tabulate(
        inputs: Vec<ArcStr>,
        limit: usize,
        f: impl FnMut(usize) -> bool,
    ) -> Result<Self> {
        if inputs.len() > limit {
            return Err(Error::TooManyInputs {
                inputs: inputs.len(),
                limit,
            });
        }
        let table = (0..1usize << inputs.len()).map(f).collect();
        Ok(Self { inputs, table })
    }

    /// Input names, least significant first.
    #[inline]
    pub fn inputs(&self) -> &[ArcStr] {
        &self.inputs
    }

    /// Outputs in row order.
    #[inline]
    pub fn table(&self) -> &[bool] {
        &self.table
    }

    /// The output for `row`, or `None` past the last row.
    #[inline]
    pub fn output(&self, row: usize) -> Option<bool> {
        self.table.get(row).copied()
    }

    /// The outputs as a string of `0` and `1` characters in row order.
    pub fn as_output_string(&self) -> String {
        self.table.iter().map(|&b| if b { '1' } else { '0' }).collect()
    }

    /// The complementary function over the same inputs.
    pub fn negate(&self) -> Self {
        Self {
            inputs: self.inputs.clone(),
            table: self.table.iter().map(|b| !b).collect(),
        }
    }

    /// Returns `true` if the table is narrow enough to display.
    #[inline]
    pub fn is_displayable(&self, max_inputs: usize) -> bool {
        self.inputs.len() <= max_inputs
    }

    /// Reorders the inputs: input `k` of the result is input `order[k]` of
    /// `self`. The function computed is unchanged.
    ///
    /// Returns `None` if `order` is not a permutation of the input indices.
    pub fn permute(&self, order: &[usize]) -> Option<Self> {
        let n = self.inputs.len();
        if order.len() != n || order.iter().copied().sorted().ne(0..n) {
            return None;
        }
        let table = (0..1usize << n)
            .map(|row| {
                let old = order
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| row >> k & 1 == 1)
                    .fold(0usize, |acc, (_, &o)| acc | 1 << o);
                self.table[old]
            })
            .collect();
        Some(Self {
            inputs: order.iter().map(|&o| self.inputs[o].clone()).collect(),
            table,
        })
    }

    /// Every reordering of the inputs, starting with the identity.
    pub fn permutations(&self) -> impl Iterator<Item = Self> + '_ {
        let n = self.inputs.len();
        (0..n)
            .permutations(n)
            .filter_map(move |order| self.permute(&order))
    }
}
