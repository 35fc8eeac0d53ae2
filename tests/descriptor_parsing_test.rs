//! Descriptor parsing tests using datatest-stable for test data discovery
//!
//! Every `.repos` and `.rosinstall` file in the testdata directory must parse,
//! and planning it against an empty workspace must produce exactly one clone
//! or skip per repository.

use std::collections::BTreeMap;
use std::path::Path;

use robot_folders::descriptor::{self, DescriptorSet};
use robot_folders::engine::{reconcile, ReconciliationAction};
use robot_folders::policy::{DefaultChoices, Policies};

fn test_descriptor_parsing(path: &Path) -> datatest_stable::Result<()> {
    let set: DescriptorSet = descriptor::from_file(path)
        .map_err(|e| format!("Failed to parse descriptor {}: {}", path.display(), e))?;

    assert!(
        !set.is_empty(),
        "Descriptor {} should contain at least one repository",
        path.display()
    );

    let actions = reconcile(&set, &BTreeMap::new(), Policies::default(), &mut DefaultChoices)
        .map_err(|e| format!("Failed to plan {}: {}", path.display(), e))?;
    assert_eq!(actions.len(), set.len(), "one action per repository in {}", path.display());

    for action in &actions {
        assert!(
            matches!(
                action,
                ReconciliationAction::Clone { .. } | ReconciliationAction::Skip { .. }
            ),
            "unexpected action {:?} for an empty workspace in {}",
            action,
            path.display()
        );
        assert!(set.contains(action.repository()));
    }

    // writing and re-reading keeps every entry
    let reparsed = descriptor::parse(&set.to_yaml()?)?;
    assert_eq!(reparsed, set, "round trip changed {}", path.display());

    Ok(())
}

datatest_stable::harness!(
    test_descriptor_parsing,
    "tests/testdata",
    r".*\.(repos|rosinstall)$"
);
