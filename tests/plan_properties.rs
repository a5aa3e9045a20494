//! Property-based tests for stack payload planning
//!
//! These tests check the merge rules of `build_payload` over randomized
//! stacks and overrides.

use proptest::prelude::*;

use stackbulk::bulk::UpdateOutcome;
use stackbulk::plan::{build_payload, Overlay};
use stackbulk::report::aggregate;
use stackbulk::spacelift::types::{Stack, WorkerPool};

/// Generate a stack with arbitrary field values
fn arb_stack() -> impl Strategy<Value = Stack> {
    (
        "[a-z][a-z0-9-]{0,20}",
        any::<bool>(),
        "[a-z/]{1,12}",
        "[a-z]{1,10}",
        prop_oneof!["GITHUB", "GITLAB", "GITHUB_ENTERPRISE", "BITBUCKET_CLOUD"],
        prop::option::of("[a-z]{1,10}"),
        prop::collection::vec("[a-z]{1,6}:[a-z0-9]{1,6}", 0..5),
        prop::option::of("[0-9A-Z]{8}"),
    )
        .prop_map(
            |(id, administrative, branch, namespace, provider, project_root, labels, pool)| Stack {
                name: id.clone(),
                id,
                administrative,
                branch,
                namespace: namespace.clone(),
                provider: provider.to_string(),
                repository: format!("{namespace}-infra"),
                repository_url: None,
                project_root,
                space: "root".to_string(),
                labels,
                worker_pool: pool.map(|id| WorkerPool {
                    id,
                    space: "root".to_string(),
                }),
                ..Default::default()
            },
        )
}

/// An override that is either unset or empty
fn arb_unset() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), Just(Some(String::new()))]
}

proptest! {
    #[test]
    fn unset_overrides_keep_stack_values(
        stack in arb_stack(),
        branch in arb_unset(),
        name in arb_unset(),
        space in arb_unset(),
        project_root in arb_unset(),
    ) {
        let overlay = Overlay { branch, name, space, project_root, ..Default::default() };
        let payload = build_payload(&stack, &overlay);

        prop_assert_eq!(&payload.name, &stack.name);
        prop_assert_eq!(&payload.branch, &stack.branch);
        prop_assert_eq!(&payload.namespace, &stack.namespace);
        prop_assert_eq!(&payload.provider, &stack.provider);
        prop_assert_eq!(&payload.repository, &stack.repository);
        prop_assert_eq!(&payload.project_root, &stack.project_root);
        prop_assert_eq!(&payload.space, &stack.space);
        prop_assert_eq!(&payload.labels, &stack.labels);
        prop_assert_eq!(
            payload.worker_pool.as_deref(),
            stack.worker_pool.as_ref().map(|p| p.id.as_str())
        );
    }

    #[test]
    fn labels_are_appended_in_order(
        stack in arb_stack(),
        extra in prop::collection::vec("[a-z]{1,6}:[a-z0-9]{1,4}", 1..5),
        padding in " {0,2}",
    ) {
        let raw = extra
            .iter()
            .map(|l| format!("{padding}{l}{padding}"))
            .collect::<Vec<_>>()
            .join(",");
        let overlay = Overlay { labels: Some(raw), ..Default::default() };

        let payload = build_payload(&stack, &overlay);

        let mut expected = stack.labels.clone();
        expected.extend(extra.iter().cloned());
        prop_assert_eq!(payload.labels, expected);
    }

    #[test]
    fn planning_is_deterministic(stack in arb_stack(), branch in prop::option::of("[a-z]{1,8}")) {
        let overlay = Overlay { branch, labels: Some("a, b".to_string()), ..Default::default() };
        prop_assert_eq!(build_payload(&stack, &overlay), build_payload(&stack, &overlay));
    }

    #[test]
    fn summary_counts_add_up(flags in prop::collection::vec(any::<bool>(), 0..50)) {
        let outcomes: Vec<UpdateOutcome> = flags
            .iter()
            .enumerate()
            .map(|(i, ok)| {
                let id = format!("stack-{i}");
                if *ok { UpdateOutcome::succeeded(&id) } else { UpdateOutcome::failed(&id, "boom") }
            })
            .collect();
        let len = outcomes.len();

        let summary = aggregate(outcomes, chrono::Utc::now(), std::time::Duration::ZERO);

        prop_assert_eq!(summary.success_count + summary.failure_count, summary.total);
        prop_assert_eq!(summary.total, len);
        prop_assert_eq!(summary.failures.len(), summary.failure_count);
        prop_assert!(!summary.to_string().contains("NaN"));
    }
}
