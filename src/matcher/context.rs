//! Session bias data for the heavy path.

use crate::model::SpeciesId;
use std::collections::HashMap;

/// Immutable per-request snapshot of the species already active in the
/// session, optionally with their observation counts.
///
/// Refreshed by the session layer between requests; the matching engine only
/// reads it. Repeated species are more likely to be spoken again, so the
/// heavy path gives active species a score boost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchContext {
    active: HashMap<SpeciesId, u32>,
}

impl MatchContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_species<I, S>(species: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SpeciesId>,
    {
        Self {
            active: species.into_iter().map(|s| (s.into(), 1)).collect(),
        }
    }

    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<SpeciesId>,
    {
        Self {
            active: counts.into_iter().map(|(s, n)| (s.into(), n)).collect(),
        }
    }

    pub fn contains(&self, species_id: &str) -> bool {
        self.active.contains_key(species_id)
    }

    pub fn count(&self, species_id: &str) -> u32 {
        self.active.get(species_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context() {
        let ctx = MatchContext::empty();
        assert!(ctx.is_empty());
        assert!(!ctx.contains("453"));
        assert_eq!(ctx.count("453"), 0);
    }

    #[test]
    fn test_from_species_and_counts() {
        let ctx = MatchContext::from_species(["453", "12"]);
        assert_eq!(ctx.len(), 2);
        assert!(ctx.contains("453"));
        assert_eq!(ctx.count("453"), 1);

        let ctx = MatchContext::from_counts([("453", 7u32)]);
        assert_eq!(ctx.count("453"), 7);
    }
}
