use std::{collections::BTreeSet, fmt::Display};

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Skill(String);

impl Skill {
    pub fn new(skill: impl Into<String>) -> Self {
        Skill(skill.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Skills required together. Missions carry one, vehicles carry alternatives.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SkillSet(BTreeSet<Skill>);

impl SkillSet {
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SkillSet(skills.into_iter().map(Skill::new).collect())
    }

    pub fn insert(&mut self, skill: Skill) -> bool {
        self.0.insert(skill)
    }

    pub fn contains(&self, skill: &Skill) -> bool {
        self.0.contains(skill)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.0.iter()
    }

    /// Every skill of `self` is offered by `offered`
    pub fn is_satisfied_by(&self, offered: &SkillSet) -> bool {
        self.0.is_subset(&offered.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_satisfied_by() {
        let required = SkillSet::new(["frozen"]);
        let offered = SkillSet::new(["frozen", "heavy"]);

        assert!(required.is_satisfied_by(&offered));
        assert!(!offered.is_satisfied_by(&required));
        assert!(SkillSet::default().is_satisfied_by(&required));
    }

    #[test]
    fn test_order_independent_equality() {
        assert_eq!(SkillSet::new(["b", "a"]), SkillSet::new(["a", "b"]));
    }
}
