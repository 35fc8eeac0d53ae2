//! Property-based tests for the reconciliation engine.
//!
//! Declared and discovered sets are generated from a small pool of names,
//! URLs and versions so that collisions (and therefore conflicts) are common.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeMap;

    use crate::descriptor::{DescriptorSet, RepositoryDescriptor};
    use crate::engine::{reconcile, ReconciliationAction};
    use crate::error::Result;
    use crate::inspector::LocalRepositoryState;
    use crate::policy::{Choice, Conflict, ConflictResolver, DeletePolicy, OverridePolicy, Policies};
    use proptest::prelude::*;

    /// Answers deterministically from the conflict itself and counts calls.
    #[derive(Default)]
    struct Deterministic {
        calls: usize,
    }

    impl ConflictResolver for Deterministic {
        fn resolve(&mut self, conflict: &Conflict<'_>) -> Result<Choice> {
            self.calls += 1;
            Ok(if conflict.name().len() % 2 == 0 {
                Choice::TakeDeclared
            } else {
                Choice::KeepLocal
            })
        }
    }

    fn name() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["a", "bb", "ccc", "drivers/d", "drivers/ee", "vendor/x/f"]).prop_map(String::from)
    }

    fn url() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["/srv/a", "/srv/b", "https://example.com/c.git"]).prop_map(String::from)
    }

    fn version() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["main", "develop", "v1.0"]).prop_map(String::from)
    }

    fn declared() -> impl Strategy<Value = DescriptorSet> {
        prop::collection::btree_map(name(), (url(), prop::option::of(version())), 0..6).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(name, (url, version))| {
                    let descriptor = RepositoryDescriptor::git(url, version.as_deref());
                    (name, descriptor)
                })
                .collect()
        })
    }

    fn discovered() -> impl Strategy<Value = BTreeMap<String, LocalRepositoryState>> {
        prop::collection::btree_map(name(), (url(), version()), 0..6).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(path, (url, version))| {
                    let state = LocalRepositoryState {
                        path: path.clone(),
                        vcs_type: "git".to_string(),
                        url,
                        version,
                    };
                    (path, state)
                })
                .collect()
        })
    }

    fn override_policy() -> impl Strategy<Value = OverridePolicy> {
        prop::sample::select(vec![OverridePolicy::Ask, OverridePolicy::KeepLocal, OverridePolicy::Override])
    }

    fn delete_policy() -> impl Strategy<Value = DeletePolicy> {
        prop::sample::select(vec![DeletePolicy::Ask, DeletePolicy::KeepAll, DeletePolicy::DeleteAll])
    }

    proptest! {
        /// Property: reconcile is pure, the same inputs give the same plan
        #[test]
        fn reconcile_is_idempotent(
            declared in declared(),
            discovered in discovered(),
            o in override_policy(),
            d in delete_policy(),
        ) {
            let policies = Policies::new(o, d);
            let first = reconcile(&declared, &discovered, policies, &mut Deterministic::default()).unwrap();
            let second = reconcile(&declared, &discovered, policies, &mut Deterministic::default()).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Property: SetRemote for a repository comes before its CheckoutVersion
        #[test]
        fn set_remote_precedes_checkout(
            declared in declared(),
            discovered in discovered(),
            o in override_policy(),
        ) {
            let actions = reconcile(
                &declared,
                &discovered,
                Policies::new(o, DeletePolicy::KeepAll),
                &mut Deterministic::default(),
            )
            .unwrap();

            for (i, action) in actions.iter().enumerate() {
                if let ReconciliationAction::CheckoutVersion { path, .. } = action {
                    let later_remote = actions[i..].iter().any(|a| {
                        matches!(a, ReconciliationAction::SetRemote { path: p, .. } if p == path)
                    });
                    prop_assert!(!later_remote, "SetRemote after CheckoutVersion for {}", path);
                }
            }
        }

        /// Property: undeclared checkouts get exactly what the delete policy says
        #[test]
        fn delete_policy_determines_orphans(
            declared in declared(),
            discovered in discovered(),
            d in delete_policy(),
        ) {
            let mut resolver = Deterministic::default();
            let actions = reconcile(
                &declared,
                &discovered,
                Policies::new(OverridePolicy::KeepLocal, d),
                &mut resolver,
            )
            .unwrap();

            let orphans: Vec<&String> = discovered.keys().filter(|n| !declared.contains(n)).collect();
            let deletes: Vec<&str> = actions
                .iter()
                .filter(|a| a.kind() == "delete")
                .map(|a| a.repository())
                .collect();

            match d {
                DeletePolicy::KeepAll => {
                    prop_assert!(deletes.is_empty());
                    prop_assert_eq!(resolver.calls, 0);
                }
                DeletePolicy::DeleteAll => {
                    prop_assert_eq!(deletes.len(), orphans.len());
                    prop_assert_eq!(resolver.calls, 0);
                }
                DeletePolicy::Ask => {
                    prop_assert_eq!(resolver.calls, orphans.len());
                    let expected: Vec<&str> = orphans
                        .iter()
                        .filter(|n| n.len() % 2 == 0)
                        .map(|n| n.as_str())
                        .collect();
                    prop_assert_eq!(deletes, expected);
                }
            }
        }

        /// Property: missing checkouts only ever produce a single Clone
        #[test]
        fn absent_repositories_are_only_cloned(declared in declared(), discovered in discovered()) {
            let actions = reconcile(
                &declared,
                &discovered,
                Policies::new(OverridePolicy::Override, DeletePolicy::KeepAll),
                &mut Deterministic::default(),
            )
            .unwrap();

            for (name, _) in declared.iter().filter(|(n, _)| !discovered.contains_key(*n)) {
                let for_name: Vec<&ReconciliationAction> =
                    actions.iter().filter(|a| a.repository() == name).collect();
                prop_assert_eq!(for_name.len(), 1);
                prop_assert_eq!(for_name[0].kind(), "clone");
            }
        }

        /// Property: override always prefers declared, keep_local always prefers local
        #[test]
        fn override_and_keep_local_never_ask(declared in declared(), discovered in discovered()) {
            let mut resolver = Deterministic::default();
            let kept = reconcile(
                &declared,
                &discovered,
                Policies::new(OverridePolicy::KeepLocal, DeletePolicy::KeepAll),
                &mut resolver,
            )
            .unwrap();
            prop_assert!(kept.iter().all(|a| a.kind() == "clone"));

            let overridden = reconcile(
                &declared,
                &discovered,
                Policies::new(OverridePolicy::Override, DeletePolicy::KeepAll),
                &mut resolver,
            )
            .unwrap();
            prop_assert_eq!(resolver.calls, 0);

            for (name, descriptor) in declared.iter() {
                let Some(local) = discovered.get(name) else { continue };
                let url_differs = descriptor.url.as_deref() != Some(local.url.as_str());
                let version_differs = descriptor
                    .requested_version()
                    .is_some_and(|v| v != local.version);
                let has = |kind: &str| overridden.iter().any(|a| a.repository() == name && a.kind() == kind);
                prop_assert_eq!(has("set_remote"), url_differs);
                prop_assert_eq!(has("checkout_version"), version_differs);
            }
        }
    }
}
