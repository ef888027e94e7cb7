//! Output formatting

use anyhow::Result;
use colored::*;
use kumi_core::Group;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Pretty-print any serializable value to stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Human-readable listing of override groups
pub struct GroupsFormatter {
    root: PathBuf,
    use_colors: bool,
}

impl GroupsFormatter {
    pub fn new(root: PathBuf, use_colors: bool) -> Self {
        Self { root, use_colors }
    }

    pub fn print(&self, groups: &[Group]) {
        print!("{}", self.render(groups));
    }

    fn render(&self, groups: &[Group]) -> String {
        if groups.is_empty() {
            return "No files to group\n".to_string();
        }

        let mut out = String::new();
        for (index, group) in groups.iter().enumerate() {
            let header = format!("Group {}", index + 1);
            let mask = if group.mask.is_empty() {
                "no overrides".to_string()
            } else {
                format!("overrides {}", group.mask)
            };
            if self.use_colors {
                out.push_str(&format!("{} ({})\n", header.bold(), mask.cyan()));
            } else {
                out.push_str(&format!("{header} ({mask})\n"));
            }
            for path in &group.paths {
                out.push_str(&format!("  {}\n", self.display_path(path)));
            }
        }

        let files: usize = groups.iter().map(|group| group.paths.len()).sum();
        out.push_str(&format!("\n{} files in {} groups\n", files, groups.len()));
        out
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kumi_core::{MembershipMask, Options};

    fn group(mask: &[usize], len: usize, paths: &[&str]) -> Group {
        let mut bits = MembershipMask::new(len);
        for index in mask {
            bits.set(*index);
        }
        Group {
            mask: bits,
            options: Options::default(),
            paths: paths.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn test_render_groups() {
        let formatter = GroupsFormatter::new("/p".into(), false);
        let rendered = formatter.render(&[
            group(&[], 2, &["/p/src/a.js"]),
            group(&[0], 2, &["/p/test/a.js", "/p/test/b.js"]),
        ]);

        assert_eq!(
            rendered,
            "Group 1 (overrides 00)\n  src/a.js\nGroup 2 (overrides 10)\n  test/a.js\n  test/b.js\n\n3 files in 2 groups\n"
        );
    }

    #[test]
    fn test_render_without_overrides() {
        let formatter = GroupsFormatter::new("/p".into(), false);
        let rendered = formatter.render(&[group(&[], 0, &["/p/a.js"])]);
        assert!(rendered.starts_with("Group 1 (no overrides)\n"));
    }

    #[test]
    fn test_render_empty() {
        let formatter = GroupsFormatter::new("/p".into(), false);
        assert_eq!(formatter.render(&[]), "No files to group\n");
    }
}
