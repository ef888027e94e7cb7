//! Grouping engine
//!
//! Partitions a file list into groups whose members match exactly the same
//! override rules, so options are merged (and later built into a lint
//! configuration) once per group instead of once per file.

use super::matcher::{MembershipMask, OverrideMatcher};
use crate::Result;
use crate::options::{Options, OverrideRule};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Files sharing one membership mask, with the options merged for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub mask: MembershipMask,
    pub options: Options,
    pub paths: Vec<PathBuf>,
}

/// Merge the applicable override rules over `base`, in rule order
///
/// Scalars from later rules replace earlier ones, lists concatenate, and
/// rule/settings maps merge key-wise.
pub fn merge_applicable_overrides(base: &Options, applicable: &[&OverrideRule]) -> Options {
    let mut merged = base.clone();
    for rule in applicable {
        merged.merge_from(&rule.options);
    }
    merged
}

/// Group `paths` by the override rules that apply to them
///
/// Groups are emitted in the order their mask is first seen while scanning
/// `paths`; every path lands in exactly one group. Paths are matched
/// relative to `base.cwd` when it is set.
pub fn group_configs(
    paths: &[PathBuf],
    base: &Options,
    overrides: &[OverrideRule],
) -> Result<Vec<Group>> {
    let mut matcher = OverrideMatcher::new(overrides)?;
    if let Some(cwd) = &base.cwd {
        matcher = matcher.with_base(cwd);
    }

    let masks: Vec<MembershipMask> = paths.par_iter().map(|path| matcher.mask(path)).collect();

    let mut slots: HashMap<&MembershipMask, usize> = HashMap::new();
    let mut buckets: Vec<(&MembershipMask, Vec<PathBuf>)> = Vec::new();
    for (path, mask) in paths.iter().zip(&masks) {
        let slot = *slots.entry(mask).or_insert_with(|| {
            buckets.push((mask, Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push(path.clone());
    }

    let groups: Vec<Group> = buckets
        .into_par_iter()
        .map(|(mask, paths)| {
            let options = if mask.is_zero() {
                base.clone()
            } else {
                merge_applicable_overrides(base, &matcher.applicable(mask))
            };
            Group {
                mask: mask.clone(),
                options,
                paths,
            }
        })
        .collect();

    debug!(
        "Grouped {} paths into {} groups across {} overrides",
        paths.len(),
        groups.len(),
        overrides.len()
    );

    Ok(groups)
}
