use std::collections::BTreeMap;

use weft_core::ValidatorId;

use crate::error::ConsensusError;

/// Stake of a validator
pub type Weight = u64;

/// An immutable weighted validator set.
///
/// Validators are kept sorted by id and zero-weight entries are dropped, so
/// two nodes building the set from the same entries in any order iterate it
/// identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validators {
    ids: Vec<ValidatorId>,
    weights: Vec<Weight>,
    total_weight: Weight,
}

impl Validators {
    pub fn new<I>(entries: I) -> Result<Self, ConsensusError>
    where
        I: IntoIterator<Item = (ValidatorId, Weight)>,
    {
        let mut sorted = BTreeMap::new();
        for (id, weight) in entries {
            if sorted.insert(id, weight).is_some() {
                return Err(ConsensusError::DuplicateValidator(id));
            }
        }

        let mut ids = Vec::with_capacity(sorted.len());
        let mut weights = Vec::with_capacity(sorted.len());
        let mut total_weight: Weight = 0;
        for (id, weight) in sorted.into_iter().filter(|(_, w)| *w > 0) {
            total_weight = total_weight
                .checked_add(weight)
                .ok_or(ConsensusError::WeightOverflow)?;
            ids.push(id);
            weights.push(weight);
        }

        Ok(Validators {
            ids,
            weights,
            total_weight,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in ascending order
    pub fn ids(&self) -> &[ValidatorId] {
        &self.ids
    }

    /// Weights aligned with [`Validators::ids`]
    pub fn weights(&self) -> &[Weight] {
        &self.weights
    }

    pub fn total_weight(&self) -> Weight {
        self.total_weight
    }

    pub fn weight(&self, id: ValidatorId) -> Option<Weight> {
        self.ids
            .binary_search(&id)
            .ok()
            .map(|index| self.weights[index])
    }

    pub fn contains(&self, id: ValidatorId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ValidatorId, Weight)> + '_ {
        self.ids.iter().copied().zip(self.weights.iter().copied())
    }
}
