use crate::{IndividualRequirement, RequirementList};
use log::trace;
use randoreq_game::{ResourceDatabase, ResourceState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A formula in disjunctive normal form: satisfied when any one of its alternatives is.
///
/// Every constructor drops alternatives that contain another alternative, since whenever the
/// larger one holds the smaller one does too. The remaining alternatives are kept in sorted
/// order, making equality and hashing independent of how the set was built.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<RequirementList>", into = "Vec<RequirementList>")]
pub struct RequirementSet {
    alternatives: Vec<RequirementList>,
}

impl RequirementSet {
    pub fn new(alternatives: impl IntoIterator<Item = RequirementList>) -> RequirementSet {
        let mut candidates: Vec<RequirementList> = alternatives.into_iter().collect();
        // Shortest first: a list can only contain lists that are no longer than itself.
        candidates.sort_unstable_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        candidates.dedup();

        let mut kept: Vec<RequirementList> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !kept.iter().any(|k| k.is_subset(&candidate)) {
                kept.push(candidate);
            }
        }
        kept.sort_unstable();
        RequirementSet { alternatives: kept }
    }

    pub fn trivial() -> RequirementSet {
        RequirementSet {
            alternatives: vec![RequirementList::default()],
        }
    }

    pub fn impossible() -> RequirementSet {
        RequirementSet {
            alternatives: vec![],
        }
    }

    pub fn is_trivial(&self) -> bool {
        self.alternatives.len() == 1 && self.alternatives[0].is_empty()
    }

    pub fn is_impossible(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub fn alternatives(&self) -> &[RequirementList] {
        &self.alternatives
    }

    pub fn satisfied(&self, state: &ResourceState) -> bool {
        self.alternatives.iter().any(|alt| alt.satisfied(state))
    }

    /// Fewest unsatisfied requirements among the alternatives, or `None` if there are no
    /// alternatives at all.
    pub fn minimum_satisfied_difference(&self, state: &ResourceState) -> Option<usize> {
        self.alternatives
            .iter()
            .map(|alt| alt.amount_unsatisfied(state))
            .min()
    }

    /// All distinct requirements mentioned by any alternative, in sorted order.
    pub fn individual_requirements(&self) -> Vec<IndividualRequirement> {
        let mut reqs: Vec<IndividualRequirement> = self
            .alternatives
            .iter()
            .flat_map(|alt| alt.iter().copied())
            .collect();
        reqs.sort_unstable();
        reqs.dedup();
        reqs
    }

    /// Both formulas must hold (logical AND), distributed back into normal form.
    pub fn merge(&self, other: &RequirementSet) -> RequirementSet {
        if other.is_trivial() || self.is_impossible() {
            return self.clone();
        }
        if self.is_trivial() || other.is_impossible() {
            return other.clone();
        }
        RequirementSet::new(
            self.alternatives
                .iter()
                .flat_map(|a| other.alternatives.iter().map(move |b| a.union(b))),
        )
    }

    /// Either formula may hold (logical OR).
    pub fn union(&self, other: &RequirementSet) -> RequirementSet {
        RequirementSet::new(
            self.alternatives
                .iter()
                .chain(other.alternatives.iter())
                .cloned(),
        )
    }

    /// Partially evaluates the formula against resources that stay fixed for the rest of the
    /// search. Requirements on resources present in `static_state` are decided from it; the
    /// database's trivial and impossible resources are always decided. Everything else is kept.
    pub fn simplify(
        &self,
        static_state: &ResourceState,
        database: &ResourceDatabase,
    ) -> RequirementSet {
        let result = RequirementSet::new(
            self.alternatives
                .iter()
                .filter_map(|alt| alt.simplify(static_state, database)),
        );
        trace!(
            "simplify: {} -> {} alternatives",
            self.alternatives.len(),
            result.alternatives.len()
        );
        result
    }

    /// Substitutes `replacement` for every occurrence of `target`. An alternative containing
    /// `target` is expanded into one alternative per alternative of `replacement`.
    pub fn replace(
        &self,
        target: &IndividualRequirement,
        replacement: &RequirementSet,
    ) -> RequirementSet {
        if !self.alternatives.iter().any(|alt| alt.contains(target)) {
            return self.clone();
        }
        let mut result: Vec<RequirementList> = vec![];
        for alt in &self.alternatives {
            if alt.contains(target) {
                result.extend(
                    replacement
                        .alternatives
                        .iter()
                        .map(|r| alt.replace(target, r)),
                );
            } else {
                result.push(alt.clone());
            }
        }
        RequirementSet::new(result)
    }

    pub fn display<'a>(&'a self, database: &'a ResourceDatabase) -> RequirementSetDisplay<'a> {
        RequirementSetDisplay {
            set: self,
            database,
        }
    }
}

impl From<Vec<RequirementList>> for RequirementSet {
    fn from(alternatives: Vec<RequirementList>) -> Self {
        RequirementSet::new(alternatives)
    }
}

impl From<RequirementSet> for Vec<RequirementList> {
    fn from(set: RequirementSet) -> Self {
        set.alternatives
    }
}

/// Prints one alternative per line, with resource names taken from the database.
pub struct RequirementSetDisplay<'a> {
    set: &'a RequirementSet,
    database: &'a ResourceDatabase,
}

impl fmt::Display for RequirementSetDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.set.is_impossible() {
            return write!(f, "Impossible");
        }
        if self.set.is_trivial() {
            return write!(f, "Trivial");
        }
        for (i, alt) in self.set.alternatives.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, req) in alt.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", req.display(self.database))?;
            }
        }
        Ok(())
    }
}
