//! Override matching
//!
//! For one path, decides which override rules apply and records the answer
//! as a [`MembershipMask`]. Two paths with equal masks receive identical
//! merged options, which is what lets the grouping engine merge once per
//! mask instead of once per file.

use super::pattern::{PatternSet, normalize_path};
use crate::Result;
use crate::options::OverrideRule;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

const WORD_BITS: usize = u64::BITS as usize;

/// Bit vector with one bit per override rule
///
/// Sized to the rule list, so there is no ceiling on the number of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MembershipMask {
    words: Vec<u64>,
    len: usize,
}

impl MembershipMask {
    /// Create an all-zero mask for `len` rules
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Number of rules the mask covers
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the mask covers no rules at all
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mark rule `index` as applicable
    pub fn set(&mut self, index: usize) {
        assert!(index < self.len, "rule index {index} out of range {}", self.len);
        self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
    }

    /// Whether rule `index` applies
    pub fn is_set(&self, index: usize) -> bool {
        index < self.len && self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }

    /// Whether no rule applies
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    /// Indices of applicable rules, ascending
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|index| self.is_set(*index))
    }

    /// Number of applicable rules
    pub fn count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }
}

/// Renders rule 0 first, e.g. `1010`
impl fmt::Display for MembershipMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.len {
            f.write_str(if self.is_set(index) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl Serialize for MembershipMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of matching one path against an override list
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideMatch<'a> {
    pub mask: MembershipMask,
    /// Matching rules in their original order
    pub applicable: Vec<&'a OverrideRule>,
}

/// Override list with its `files` patterns compiled once
#[derive(Debug, Clone)]
pub struct OverrideMatcher<'a> {
    rules: &'a [OverrideRule],
    pattern_sets: Vec<PatternSet>,
    base: Option<PathBuf>,
}

impl<'a> OverrideMatcher<'a> {
    /// Compile every rule's pattern set
    pub fn new(rules: &'a [OverrideRule]) -> Result<Self> {
        let pattern_sets = rules
            .iter()
            .map(|rule| PatternSet::new(&rule.files))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rules,
            pattern_sets,
            base: None,
        })
    }

    /// Match paths relative to `base` (usually the working directory)
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// The override rules being matched
    pub fn rules(&self) -> &'a [OverrideRule] {
        self.rules
    }

    /// Compute the membership mask for `path`
    pub fn mask(&self, path: &Path) -> MembershipMask {
        let normalized = normalize_path(path, self.base.as_deref());
        let mut mask = MembershipMask::new(self.rules.len());
        for (index, set) in self.pattern_sets.iter().enumerate() {
            if set.is_match(&normalized) {
                mask.set(index);
            }
        }
        mask
    }

    /// Rules selected by `mask`, in list order
    pub fn applicable(&self, mask: &MembershipMask) -> Vec<&'a OverrideRule> {
        mask.ones().map(|index| &self.rules[index]).collect()
    }

    /// Compute the mask and applicable subset for `path`
    pub fn match_path(&self, path: &Path) -> OverrideMatch<'a> {
        let mask = self.mask(path);
        let applicable = self.applicable(&mask);
        OverrideMatch { mask, applicable }
    }
}

/// One-shot matching of `path` against `overrides`
pub fn find_applicable_overrides<'a>(
    path: impl AsRef<Path>,
    overrides: &'a [OverrideRule],
) -> Result<OverrideMatch<'a>> {
    Ok(OverrideMatcher::new(overrides)?.match_path(path.as_ref()))
}
