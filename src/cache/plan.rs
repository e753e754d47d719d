//! Reconciliation planning
//!
//! Turns the declared, installed and cached sets of one bucket into an
//! ordered list of operations. Planning is pure: the inputs are passed in
//! explicitly and nothing touches the filesystem.
//!
//! # Ordering
//!
//! | Phase | Input | Operation |
//! |-------|-------|-----------|
//! | prune | cached, not declared | `Remove` |
//! | warn | declared, not installed | `Warn` |
//! | sync | installed and declared, version differs | `Add` / `Update` |
//!
//! Every removal for a name precedes any add for it: `Update` is executed
//! as remove-old then add-new.

use crate::cache::naming::ArchiveName;
use crate::cache::scan::ScanReport;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One step of a reconciliation plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    /// Pack an installed package that has no archive yet
    Add { name: String, version: String },
    /// Replace an archive whose version no longer matches the install
    Update {
        name: String,
        from: String,
        to: String,
    },
    /// Delete an archive
    Remove { name: String, version: String },
    /// Declared but not installed; nothing to pack
    Warn { name: String },
}

impl Operation {
    /// Package name this operation concerns
    pub fn name(&self) -> &str {
        match self {
            Self::Add { name, .. }
            | Self::Update { name, .. }
            | Self::Remove { name, .. }
            | Self::Warn { name } => name,
        }
    }

    /// Whether the operation changes the cache directory
    pub fn mutates(&self) -> bool {
        !matches!(self, Self::Warn { .. })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add { name, version } => write!(f, "add {}@{}", name, version),
            Self::Update { name, from, to } => write!(f, "update {} {} -> {}", name, from, to),
            Self::Remove { name, version } => write!(f, "remove {}@{}", name, version),
            Self::Warn { name } => write!(f, "{} is not installed", name),
        }
    }
}

/// Counts of each operation kind in a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub add: usize,
    pub update: usize,
    pub remove: usize,
    pub warn: usize,
}

/// Ordered operations bringing one bucket in sync with the installed set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationPlan {
    pub operations: Vec<Operation>,
}

impl ReconciliationPlan {
    /// True when executing the plan would not change the cache
    pub fn is_noop(&self) -> bool {
        !self.operations.iter().any(Operation::mutates)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for op in &self.operations {
            match op {
                Operation::Add { .. } => summary.add += 1,
                Operation::Update { .. } => summary.update += 1,
                Operation::Remove { .. } => summary.remove += 1,
                Operation::Warn { .. } => summary.warn += 1,
            }
        }
        summary
    }
}

/// Compute the reconciliation plan for one bucket.
///
/// `declared` maps names to version specs; only its keys matter. Versions in
/// `installed` and `cached` are compared as exact strings.
pub fn reconcile(
    declared: &BTreeMap<String, String>,
    installed: &BTreeMap<String, String>,
    cached: &BTreeMap<String, String>,
) -> ReconciliationPlan {
    let mut operations = Vec::new();

    for (name, version) in cached {
        if !declared.contains_key(name) {
            operations.push(Operation::Remove {
                name: name.clone(),
                version: version.clone(),
            });
        }
    }

    for name in declared.keys() {
        if !installed.contains_key(name) {
            operations.push(Operation::Warn { name: name.clone() });
        }
    }

    for (name, version) in installed {
        if !declared.contains_key(name) {
            continue;
        }
        match cached.get(name) {
            Some(current) if current == version => {}
            Some(current) => operations.push(Operation::Update {
                name: name.clone(),
                from: current.clone(),
                to: version.clone(),
            }),
            None => operations.push(Operation::Add {
                name: name.clone(),
                version: version.clone(),
            }),
        }
    }

    ReconciliationPlan { operations }
}

/// Archives of one bucket to extract into the installed-modules directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    pub archives: Vec<ArchiveName>,
}

impl InstallPlan {
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}

/// Build the extract-everything plan from a bucket scan
pub fn install_plan(scan: &ScanReport) -> InstallPlan {
    InstallPlan {
        archives: scan
            .archives
            .iter()
            .map(|(name, version)| ArchiveName::new(name, version))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn add(name: &str, version: &str) -> Operation {
        Operation::Add {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    fn remove(name: &str, version: &str) -> Operation {
        Operation::Remove {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    /// Apply a plan to a cached set the way the executor would
    fn apply(cached: &BTreeMap<String, String>, plan: &ReconciliationPlan) -> BTreeMap<String, String> {
        let mut result = cached.clone();
        for op in &plan.operations {
            match op {
                Operation::Add { name, version } => {
                    assert!(!result.contains_key(name), "add over existing {}", name);
                    result.insert(name.clone(), version.clone());
                }
                Operation::Update { name, from, to } => {
                    assert_eq!(result.remove(name).as_ref(), Some(from));
                    result.insert(name.clone(), to.clone());
                }
                Operation::Remove { name, version } => {
                    assert_eq!(result.remove(name).as_ref(), Some(version));
                }
                Operation::Warn { .. } => {}
            }
        }
        result
    }

    #[test]
    fn mixed_scenario() {
        let declared = map(&[("a", "1.0.0"), ("b", "2.0.0")]);
        let installed = map(&[("a", "1.0.0"), ("b", "2.1.0")]);
        let cached = map(&[("a", "1.0.0"), ("c", "9.9.9")]);

        let plan = reconcile(&declared, &installed, &cached);

        assert_eq!(
            plan.operations,
            vec![
                remove("c", "9.9.9"),
                Operation::Update {
                    name: "b".to_string(),
                    from: "2.0.0".to_string(),
                    to: "2.1.0".to_string(),
                },
            ]
        );
    }

    #[test]
    fn declared_but_not_installed_warns() {
        let declared = map(&[("ghost", "^1.0.0"), ("real", "^2.0.0")]);
        let installed = map(&[("real", "2.0.3")]);

        let plan = reconcile(&declared, &installed, &BTreeMap::new());

        assert_eq!(
            plan.operations,
            vec![
                Operation::Warn {
                    name: "ghost".to_string()
                },
                add("real", "2.0.3"),
            ]
        );
        assert!(!plan.is_noop());
    }

    #[test]
    fn installed_but_undeclared_is_ignored() {
        let declared = map(&[("a", "*")]);
        let installed = map(&[("a", "1.0.0"), ("transitive", "3.0.0")]);
        let cached = map(&[("a", "1.0.0")]);

        let plan = reconcile(&declared, &installed, &cached);
        assert!(plan.is_empty());
    }

    #[test]
    fn undeclared_archive_is_pruned() {
        let declared = map(&[("a", "*")]);
        let installed = map(&[("a", "1.0.0"), ("dropped", "1.0.0")]);
        let cached = map(&[("a", "1.0.0"), ("dropped", "1.0.0")]);

        let plan = reconcile(&declared, &installed, &cached);
        assert_eq!(plan.operations, vec![remove("dropped", "1.0.0")]);
    }

    #[test]
    fn version_equality_is_textual() {
        let declared = map(&[("a", "*")]);
        let installed = map(&[("a", "1.0.0")]);
        let cached = map(&[("a", "v1.0.0")]);

        let plan = reconcile(&declared, &installed, &cached);
        assert_eq!(plan.summary().update, 1);
    }

    #[test]
    fn second_run_is_noop() {
        let declared = map(&[("a", "*"), ("b", "*"), ("missing", "*")]);
        let installed = map(&[("a", "1.0.0"), ("b", "2.0.0"), ("extra", "0.1.0")]);
        let cached = map(&[("b", "1.0.0"), ("old", "0.0.1")]);

        let first = reconcile(&declared, &installed, &cached);
        let converged = apply(&cached, &first);
        let second = reconcile(&declared, &installed, &converged);

        assert!(!first.is_noop());
        assert!(second.is_noop());
        assert_eq!(second.summary().warn, 1);
    }

    #[test]
    fn cache_converges_to_declared_installed_intersection() {
        let cases = [
            (
                map(&[("a", "*"), ("b", "*")]),
                map(&[("a", "1"), ("c", "3")]),
                map(&[("b", "2"), ("c", "3"), ("a", "0")]),
            ),
            (map(&[]), map(&[("a", "1")]), map(&[("a", "1"), ("z", "9")])),
            (
                map(&[("x", "*"), ("y", "*")]),
                map(&[("x", "1"), ("y", "2")]),
                map(&[]),
            ),
        ];

        for (declared, installed, cached) in cases {
            let plan = reconcile(&declared, &installed, &cached);
            let result = apply(&cached, &plan);

            // Declared-but-missing packages keep whatever archive they have
            let mut expected: BTreeMap<String, String> = cached
                .iter()
                .filter(|(name, _)| declared.contains_key(*name) && !installed.contains_key(*name))
                .map(|(n, v)| (n.clone(), v.clone()))
                .collect();
            expected.extend(
                installed
                    .iter()
                    .filter(|(name, _)| declared.contains_key(*name))
                    .map(|(n, v)| (n.clone(), v.clone())),
            );
            assert_eq!(result, expected);
        }
    }

    #[test]
    fn removals_precede_adds_for_same_name() {
        let declared = map(&[("a", "*")]);
        let installed = map(&[("a", "2.0.0")]);
        let cached = map(&[("a", "1.0.0")]);

        let plan = reconcile(&declared, &installed, &cached);

        // Update is remove-then-add; there is never a bare Add next to a
        // stale archive of the same name.
        assert_eq!(plan.len(), 1);
        assert!(matches!(plan.operations[0], Operation::Update { .. }));
    }

    #[test]
    fn summary_counts_kinds() {
        let plan = ReconciliationPlan {
            operations: vec![
                add("a", "1"),
                add("b", "1"),
                remove("c", "1"),
                Operation::Warn {
                    name: "d".to_string(),
                },
            ],
        };
        assert_eq!(
            plan.summary(),
            PlanSummary {
                add: 2,
                update: 0,
                remove: 1,
                warn: 1
            }
        );
    }

    #[test]
    fn operation_display() {
        assert_eq!(add("chalk", "5.3.0").to_string(), "add chalk@5.3.0");
        assert_eq!(
            Operation::Update {
                name: "chalk".to_string(),
                from: "4.1.2".to_string(),
                to: "5.3.0".to_string()
            }
            .to_string(),
            "update chalk 4.1.2 -> 5.3.0"
        );
    }

    #[test]
    fn install_plan_lists_every_archive() {
        let scan = ScanReport {
            archives: map(&[("a", "1.0.0"), ("b", "2.0.0")]),
            ..ScanReport::default()
        };

        let plan = install_plan(&scan);

        assert_eq!(
            plan.archives,
            vec![ArchiveName::new("a", "1.0.0"), ArchiveName::new("b", "2.0.0")]
        );
    }

    #[test]
    fn install_plan_empty_bucket() {
        assert!(install_plan(&ScanReport::default()).is_empty());
    }
}
