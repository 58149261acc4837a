pub mod helpers;
pub mod requirement_set;

use crate::helpers::{signature, sorted_is_subset};
use randoreq_game::{
    Amount, ResourceDatabase, ResourceError, ResourceIndex, ResourceKey, ResourceState,
    ResourceType,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

pub use crate::requirement_set::{RequirementSet, RequirementSetDisplay};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequirementError {
    #[error("requirement on {resource} has negative amount {amount}")]
    InvalidAmount { resource: ResourceKey, amount: Amount },

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// A single comparison: the amount of `resource` owned is at least `amount`, or, if `negate`
/// is set, below `amount`.
///
/// An amount of 0 is accepted; without negation it always holds, and with negation it never does.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "IndividualRequirementData")]
pub struct IndividualRequirement {
    resource: ResourceKey,
    amount: Amount,
    negate: bool,
}

#[derive(Deserialize)]
struct IndividualRequirementData {
    resource: ResourceKey,
    amount: Amount,
    #[serde(default)]
    negate: bool,
}

impl TryFrom<IndividualRequirementData> for IndividualRequirement {
    type Error = RequirementError;

    fn try_from(data: IndividualRequirementData) -> Result<Self, Self::Error> {
        IndividualRequirement::new(data.resource, data.amount, data.negate)
    }
}

impl IndividualRequirement {
    pub fn new(
        resource: ResourceKey,
        amount: Amount,
        negate: bool,
    ) -> Result<IndividualRequirement, RequirementError> {
        // Amount 0 is allowed so that the always-true requirement can be expressed.
        if amount < 0 {
            return Err(RequirementError::InvalidAmount { resource, amount });
        }
        Ok(IndividualRequirement {
            resource,
            amount,
            negate,
        })
    }

    /// Builds a requirement on a resource that must exist in `database`.
    pub fn with_data(
        database: &ResourceDatabase,
        kind: ResourceType,
        index: ResourceIndex,
        amount: Amount,
        negate: bool,
    ) -> Result<IndividualRequirement, RequirementError> {
        let info = database.get_by_type_and_index(kind, index)?;
        IndividualRequirement::new(info.key(kind), amount, negate)
    }

    pub fn resource(&self) -> ResourceKey {
        self.resource
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn negate(&self) -> bool {
        self.negate
    }

    pub fn satisfied(&self, state: &ResourceState) -> bool {
        let has_amount = state.get(self.resource) >= self.amount;
        if self.negate { !has_amount } else { has_amount }
    }

    /// Decides the requirement ahead of time if possible, given resources that will not change.
    /// Returns `None` if the outcome depends on resources outside of `static_state`.
    pub fn resolve(
        &self,
        static_state: &ResourceState,
        database: &ResourceDatabase,
    ) -> Option<bool> {
        if Some(self.resource) == database.impossible_resource() {
            return Some(self.negate);
        }
        if Some(self.resource) == database.trivial_resource() {
            return Some(!self.negate);
        }
        if self.amount == 0 || static_state.contains(self.resource) {
            return Some(self.satisfied(static_state));
        }
        None
    }

    pub fn display<'a>(
        &'a self,
        database: &'a ResourceDatabase,
    ) -> IndividualRequirementDisplay<'a> {
        IndividualRequirementDisplay {
            req: self,
            database,
        }
    }
}

pub struct IndividualRequirementDisplay<'a> {
    req: &'a IndividualRequirement,
    database: &'a ResourceDatabase,
}

impl fmt::Display for IndividualRequirementDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.req.negate { "<" } else { ">=" };
        match self.database.get(self.req.resource) {
            Ok(info) => write!(f, "{} {} {}", info.long_name, op, self.req.amount),
            Err(_) => write!(f, "{} {} {}", self.req.resource, op, self.req.amount),
        }
    }
}

/// Requirements that must all hold at once. Kept sorted and deduplicated, so two lists built from
/// the same requirements in any order are equal and hash alike.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(
    from = "Vec<IndividualRequirement>",
    into = "Vec<IndividualRequirement>"
)]
pub struct RequirementList {
    items: Vec<IndividualRequirement>,
    // Union of `helpers::signature_bit` over `items`:
    signature: u64,
}

impl RequirementList {
    pub fn new(items: impl IntoIterator<Item = IndividualRequirement>) -> RequirementList {
        let mut items: Vec<IndividualRequirement> = items.into_iter().collect();
        items.sort_unstable();
        items.dedup();
        RequirementList::from_sorted(items)
    }

    fn from_sorted(items: Vec<IndividualRequirement>) -> RequirementList {
        let signature = signature(&items);
        RequirementList { items, signature }
    }

    pub fn items(&self) -> &[IndividualRequirement] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndividualRequirement> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, req: &IndividualRequirement) -> bool {
        self.items.binary_search(req).is_ok()
    }

    pub fn satisfied(&self, state: &ResourceState) -> bool {
        self.items.iter().all(|req| req.satisfied(state))
    }

    pub fn amount_unsatisfied(&self, state: &ResourceState) -> usize {
        self.items.iter().filter(|req| !req.satisfied(state)).count()
    }

    pub fn is_subset(&self, other: &RequirementList) -> bool {
        if self.signature & !other.signature != 0 {
            return false;
        }
        sorted_is_subset(&self.items, &other.items)
    }

    pub fn union(&self, other: &RequirementList) -> RequirementList {
        if other.is_subset(self) {
            return self.clone();
        }
        if self.is_subset(other) {
            return other.clone();
        }
        let (a, b) = (&self.items, &other.items);
        let mut items = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    items.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    items.push(b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    items.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        items.extend_from_slice(&a[i..]);
        items.extend_from_slice(&b[j..]);
        RequirementList {
            items,
            signature: self.signature | other.signature,
        }
    }

    /// Removes `target`, requiring everything in `replacement` instead. Unchanged if `target`
    /// is not present.
    pub fn replace(
        &self,
        target: &IndividualRequirement,
        replacement: &RequirementList,
    ) -> RequirementList {
        if !self.contains(target) {
            return self.clone();
        }
        let remaining: Vec<IndividualRequirement> =
            self.items.iter().filter(|req| *req != target).copied().collect();
        RequirementList::from_sorted(remaining).union(replacement)
    }

    /// Drops requirements that always hold given `static_state`, and returns `None` if any
    /// requirement can never hold.
    pub fn simplify(
        &self,
        static_state: &ResourceState,
        database: &ResourceDatabase,
    ) -> Option<RequirementList> {
        let mut items = Vec::with_capacity(self.items.len());
        for req in &self.items {
            match req.resolve(static_state, database) {
                Some(false) => return None,
                Some(true) => {}
                None => items.push(*req),
            }
        }
        if items.len() == self.items.len() {
            return Some(self.clone());
        }
        Some(RequirementList::from_sorted(items))
    }
}

impl From<Vec<IndividualRequirement>> for RequirementList {
    fn from(items: Vec<IndividualRequirement>) -> Self {
        RequirementList::new(items)
    }
}

impl From<RequirementList> for Vec<IndividualRequirement> {
    fn from(list: RequirementList) -> Self {
        list.items
    }
}

impl<'a> IntoIterator for &'a RequirementList {
    type Item = &'a IndividualRequirement;
    type IntoIter = std::slice::Iter<'a, IndividualRequirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
