use crate::{Amount, ResourceKey};
use hashbrown::HashMap;

/// Amounts of each resource currently owned. Resources that are absent are owned 0 times.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceState {
    amounts: HashMap<ResourceKey, Amount>,
}

impl ResourceState {
    pub fn new() -> Self {
        ResourceState::default()
    }

    pub fn get(&self, key: ResourceKey) -> Amount {
        self.amounts.get(&key).copied().unwrap_or(0)
    }

    /// Whether the state carries an explicit amount for `key`, even if that amount is 0.
    pub fn contains(&self, key: ResourceKey) -> bool {
        self.amounts.contains_key(&key)
    }

    /// Amounts are never negative; passing one is a caller bug (clamped to 0 in release builds).
    pub fn set(&mut self, key: ResourceKey, amount: Amount) {
        debug_assert!(amount >= 0, "negative amount {amount} for {key}");
        self.amounts.insert(key, Amount::max(amount, 0));
    }

    /// Adds `delta`, which may be negative to spend or lose a resource. Removing more than is
    /// owned leaves 0.
    pub fn add(&mut self, key: ResourceKey, delta: Amount) {
        let amount = self.amounts.entry(key).or_insert(0);
        *amount = Amount::max(amount.saturating_add(delta), 0);
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Entries in key order, so that output derived from a state is reproducible.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKey, Amount)> + '_ {
        let mut keys: Vec<&ResourceKey> = self.amounts.keys().collect();
        keys.sort();
        keys.into_iter().map(|k| (*k, self.amounts[k]))
    }
}

impl FromIterator<(ResourceKey, Amount)> for ResourceState {
    fn from_iter<I: IntoIterator<Item = (ResourceKey, Amount)>>(iter: I) -> Self {
        let mut state = ResourceState::new();
        state.extend(iter);
        state
    }
}

impl Extend<(ResourceKey, Amount)> for ResourceState {
    fn extend<I: IntoIterator<Item = (ResourceKey, Amount)>>(&mut self, iter: I) {
        for (key, amount) in iter {
            self.set(key, amount);
        }
    }
}
