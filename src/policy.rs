//! # Conflict Policies
//!
//! A reconciliation pass has two independent policy axes:
//!
//! - **`OverridePolicy`** decides what happens when a repository exists both
//!   in the descriptor set and on disk, but its URL or version differs.
//! - **`DeletePolicy`** decides what happens to a checkout on disk that the
//!   descriptor set no longer mentions.
//!
//! When a policy is `ask`, the decision is delegated to a `ConflictResolver`
//! supplied by the caller. The resolver is the only place interaction can
//! happen; the engine itself never prompts.
//!
//! The per-axis resolution is done by the small pure functions
//! [`resolve_field`] and [`resolve_orphan`], which can be tested without any
//! VCS or terminal.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How to handle a URL or version that differs between declaration and checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverridePolicy {
    /// Consult the resolver for every conflicting field.
    #[default]
    Ask,
    /// Always keep what is on disk.
    KeepLocal,
    /// Always move the checkout to the declared value.
    Override,
}

impl OverridePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverridePolicy::Ask => "ask",
            OverridePolicy::KeepLocal => "keep_local",
            OverridePolicy::Override => "override",
        }
    }
}

impl FromStr for OverridePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ask" => Ok(OverridePolicy::Ask),
            "keep_local" => Ok(OverridePolicy::KeepLocal),
            "override" => Ok(OverridePolicy::Override),
            other => Err(Error::configuration(
                "override policy",
                format!("unknown value '{}', expected one of: ask, keep_local, override", other),
            )),
        }
    }
}

impl fmt::Display for OverridePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to handle checkouts that are not in the descriptor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Consult the resolver for every orphaned checkout.
    #[default]
    Ask,
    /// Never delete.
    KeepAll,
    /// Delete every orphaned checkout.
    DeleteAll,
}

impl DeletePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletePolicy::Ask => "ask",
            DeletePolicy::KeepAll => "keep_all",
            DeletePolicy::DeleteAll => "delete_all",
        }
    }
}

impl FromStr for DeletePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ask" => Ok(DeletePolicy::Ask),
            "keep_all" => Ok(DeletePolicy::KeepAll),
            "delete_all" => Ok(DeletePolicy::DeleteAll),
            other => Err(Error::configuration(
                "delete policy",
                format!("unknown value '{}', expected one of: ask, keep_all, delete_all", other),
            )),
        }
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both policy axes of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Policies {
    pub override_policy: OverridePolicy,
    pub delete_policy: DeletePolicy,
}

impl Policies {
    pub fn new(override_policy: OverridePolicy, delete_policy: DeletePolicy) -> Self {
        Self {
            override_policy,
            delete_policy,
        }
    }
}

/// The outcome of a single conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Leave the checkout as it is.
    KeepLocal,
    /// Make the checkout match the declaration. For an orphan this means
    /// deleting it.
    TakeDeclared,
}

impl Choice {
    /// Picks the value that corresponds to this choice.
    pub fn pick<'a>(&self, local: &'a str, declared: &'a str) -> &'a str {
        match self {
            Choice::KeepLocal => local,
            Choice::TakeDeclared => declared,
        }
    }
}

/// A single point of disagreement between declaration and checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict<'a> {
    Version {
        name: &'a str,
        local: &'a str,
        declared: &'a str,
    },
    Url {
        name: &'a str,
        local: &'a str,
        declared: &'a str,
    },
    /// A checkout that is not declared at all.
    Orphan { name: &'a str },
}

impl<'a> Conflict<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Conflict::Version { name, .. } | Conflict::Url { name, .. } | Conflict::Orphan { name } => *name,
        }
    }

    /// The answer a prompt preselects for this conflict.
    ///
    /// Versions default to the local value while URLs default to the declared
    /// one. Orphans are kept.
    pub fn default_choice(&self) -> Choice {
        match self {
            Conflict::Version { .. } => Choice::KeepLocal,
            Conflict::Url { .. } => Choice::TakeDeclared,
            Conflict::Orphan { .. } => Choice::KeepLocal,
        }
    }
}

/// Decides conflicts whose policy is `ask`.
pub trait ConflictResolver {
    fn resolve(&mut self, conflict: &Conflict<'_>) -> Result<Choice>;
}

/// Answers every conflict with its default choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultChoices;

impl ConflictResolver for DefaultChoices {
    fn resolve(&mut self, conflict: &Conflict<'_>) -> Result<Choice> {
        Ok(conflict.default_choice())
    }
}

/// Adapts a closure into a `ConflictResolver`.
pub struct FnResolver<F>(pub F);

impl<F> ConflictResolver for FnResolver<F>
where
    F: FnMut(&Conflict<'_>) -> Result<Choice>,
{
    fn resolve(&mut self, conflict: &Conflict<'_>) -> Result<Choice> {
        (self.0)(conflict)
    }
}

/// Resolves a URL or version conflict under `policy`.
///
/// The resolver is consulted exactly once when the policy is `ask`, and never
/// otherwise.
pub fn resolve_field(
    policy: OverridePolicy,
    conflict: &Conflict<'_>,
    resolver: &mut dyn ConflictResolver,
) -> Result<Choice> {
    match policy {
        OverridePolicy::KeepLocal => Ok(Choice::KeepLocal),
        OverridePolicy::Override => Ok(Choice::TakeDeclared),
        OverridePolicy::Ask => resolver.resolve(conflict),
    }
}

/// Resolves an undeclared checkout under `policy`.
pub fn resolve_orphan(
    policy: DeletePolicy,
    conflict: &Conflict<'_>,
    resolver: &mut dyn ConflictResolver,
) -> Result<Choice> {
    match policy {
        DeletePolicy::KeepAll => Ok(Choice::KeepLocal),
        DeletePolicy::DeleteAll => Ok(Choice::TakeDeclared),
        DeletePolicy::Ask => resolver.resolve(conflict),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        answer: Choice,
        calls: usize,
    }

    impl Counting {
        fn answering(answer: Choice) -> Self {
            Self { answer, calls: 0 }
        }
    }

    impl ConflictResolver for Counting {
        fn resolve(&mut self, _conflict: &Conflict<'_>) -> Result<Choice> {
            self.calls += 1;
            Ok(self.answer)
        }
    }

    const VERSION: Conflict<'static> = Conflict::Version {
        name: "bar",
        local: "main",
        declared: "develop",
    };

    #[test]
    fn test_parse_override_policy() {
        assert_eq!("ask".parse::<OverridePolicy>().unwrap(), OverridePolicy::Ask);
        assert_eq!("keep_local".parse::<OverridePolicy>().unwrap(), OverridePolicy::KeepLocal);
        assert_eq!("override".parse::<OverridePolicy>().unwrap(), OverridePolicy::Override);
    }

    #[test]
    fn test_parse_unknown_policy_is_configuration_error() {
        let err = "sometimes".parse::<OverridePolicy>().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("sometimes"));

        let err = "keep_local".parse::<DeletePolicy>().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_policy_display_round_trips() {
        for policy in [DeletePolicy::Ask, DeletePolicy::KeepAll, DeletePolicy::DeleteAll] {
            assert_eq!(policy.to_string().parse::<DeletePolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        let policy: OverridePolicy = serde_yaml::from_str("keep_local").unwrap();
        assert_eq!(policy, OverridePolicy::KeepLocal);
    }

    #[test]
    fn test_resolve_field_override_prefers_declared() {
        let mut resolver = Counting::answering(Choice::KeepLocal);
        let choice = resolve_field(OverridePolicy::Override, &VERSION, &mut resolver).unwrap();
        assert_eq!(choice, Choice::TakeDeclared);
        assert_eq!(resolver.calls, 0);
    }

    #[test]
    fn test_resolve_field_keep_local_prefers_local() {
        let mut resolver = Counting::answering(Choice::TakeDeclared);
        let choice = resolve_field(OverridePolicy::KeepLocal, &VERSION, &mut resolver).unwrap();
        assert_eq!(choice, Choice::KeepLocal);
        assert_eq!(resolver.calls, 0);
    }

    #[test]
    fn test_resolve_field_ask_consults_resolver_once() {
        let mut resolver = Counting::answering(Choice::TakeDeclared);
        let choice = resolve_field(OverridePolicy::Ask, &VERSION, &mut resolver).unwrap();
        assert_eq!(choice, Choice::TakeDeclared);
        assert_eq!(resolver.calls, 1);
    }

    #[test]
    fn test_resolve_orphan() {
        let orphan = Conflict::Orphan { name: "foo" };
        let mut resolver = DefaultChoices;
        assert_eq!(
            resolve_orphan(DeletePolicy::DeleteAll, &orphan, &mut resolver).unwrap(),
            Choice::TakeDeclared
        );
        assert_eq!(
            resolve_orphan(DeletePolicy::KeepAll, &orphan, &mut resolver).unwrap(),
            Choice::KeepLocal
        );
        assert_eq!(
            resolve_orphan(DeletePolicy::Ask, &orphan, &mut resolver).unwrap(),
            Choice::KeepLocal
        );
    }

    #[test]
    fn test_default_choices_are_asymmetric() {
        let url = Conflict::Url {
            name: "bar",
            local: "https://a",
            declared: "https://b",
        };
        assert_eq!(VERSION.default_choice(), Choice::KeepLocal);
        assert_eq!(url.default_choice(), Choice::TakeDeclared);
    }

    #[test]
    fn test_choice_pick() {
        assert_eq!(Choice::KeepLocal.pick("main", "develop"), "main");
        assert_eq!(Choice::TakeDeclared.pick("main", "develop"), "develop");
    }

    #[test]
    fn test_resolver_errors_propagate() {
        let mut resolver = FnResolver(|conflict: &Conflict<'_>| -> Result<Choice> {
            Err(Error::configuration(conflict.name(), "no terminal"))
        });
        assert!(resolve_field(OverridePolicy::Ask, &VERSION, &mut resolver).is_err());
    }
}
