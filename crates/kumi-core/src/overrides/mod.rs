//! Path-scoped overrides
//!
//! An override rule pairs a list of glob patterns with partial options.
//! [`matcher`] decides which rules apply to a path, [`group`] partitions a
//! file list so each distinct combination of rules is merged only once.

pub mod group;
pub mod matcher;
pub mod pattern;

pub use group::{Group, group_configs, merge_applicable_overrides};
pub use matcher::{MembershipMask, OverrideMatch, OverrideMatcher, find_applicable_overrides};
pub use pattern::{PatternSet, expand_braces, normalize_path};
