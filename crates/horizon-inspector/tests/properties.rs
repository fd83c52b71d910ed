//! Property-based invariant tests for the drawer tree.
//!
//! Random trees are driven through random fold, filter and tick sequences.
//! After every step:
//!
//! 1. `visible_members` is an ordered subsequence of `members`
//! 2. A drawer's listed flag matches membership in its parent's visible list
//! 3. Settled folded parents show nothing while no filter is installed
//! 4. Leaves pass a search exactly when their label contains the needle
//! 5. Re-running an installed filter fires no visibility events

use std::sync::Arc;

use horizon_inspector::{
    DrawerId, DrawerKind, DrawerTree, FoldState, MemberHandle, TypeTable, VisibilityEvent,
};
use parking_lot::Mutex;
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Group {
    label: String,
    leaves: Vec<String>,
    inner: Vec<String>,
}

#[derive(Debug, Clone)]
enum Op {
    Unfold(usize),
    Fold(usize),
    Search(String),
    ClearFilter,
    Tick(u64),
}

fn label() -> impl Strategy<Value = String> {
    "[abc]{1,3}"
}

fn group_strategy() -> impl Strategy<Value = Group> {
    (
        label(),
        prop::collection::vec(label(), 0..4),
        prop::collection::vec(label(), 0..3),
    )
        .prop_map(|(label, leaves, inner)| Group {
            label,
            leaves,
            inner,
        })
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..16).prop_map(Op::Unfold),
        (0usize..16).prop_map(Op::Fold),
        "[abc]{1,2}".prop_map(Op::Search),
        Just(Op::ClearFilter),
        (0u64..200).prop_map(Op::Tick),
    ]
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn build(groups: &[Group]) -> (DrawerTree, Arc<Mutex<Vec<VisibilityEvent>>>) {
    let mut types = TypeTable::new();
    for (index, group) in groups.iter().enumerate() {
        let outer = format!("Outer{index}");
        let inner = format!("Inner{index}");
        let mut members: Vec<MemberHandle> = group
            .leaves
            .iter()
            .map(|label| MemberHandle::new(label.as_str(), DrawerKind::Text))
            .collect();
        members.push(MemberHandle::new("inner", DrawerKind::Composite).with_type(inner.as_str()));
        types.insert(outer.as_str(), members);
        types.insert(
            inner.as_str(),
            group
                .inner
                .iter()
                .map(|label| MemberHandle::new(label.as_str(), DrawerKind::Text))
                .collect(),
        );
    }

    let mut tree = DrawerTree::new(types);
    for (index, group) in groups.iter().enumerate() {
        let handle = MemberHandle::new(group.label.as_str(), DrawerKind::Composite)
            .with_type(format!("Outer{index}").as_str());
        tree.create_root(&handle).unwrap();
    }

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    tree.visibility_changed()
        .connect(move |event: &VisibilityEvent| sink.lock().push(*event));
    (tree, events)
}

fn parents(tree: &DrawerTree) -> Vec<DrawerId> {
    let mut found = Vec::new();
    let mut stack: Vec<DrawerId> = tree.roots().to_vec();
    while let Some(id) = stack.pop() {
        if tree.node(id).unwrap().kind().is_parent() {
            found.push(id);
            stack.extend_from_slice(tree.members(id).unwrap());
        }
    }
    found.sort();
    found
}

fn is_subsequence(sub: &[DrawerId], full: &[DrawerId]) -> bool {
    let mut rest = full.iter();
    sub.iter().all(|id| rest.any(|candidate| candidate == id))
}

fn check_invariants(tree: &DrawerTree, needle: Option<&str>) -> Result<(), TestCaseError> {
    prop_assert!(is_subsequence(tree.visible_roots(), tree.roots()));
    for &root in tree.roots() {
        let listed = tree.node(root).unwrap().is_listed();
        prop_assert_eq!(listed, tree.visible_roots().contains(&root));
    }

    for parent in parents(tree) {
        let members = tree.members(parent).unwrap();
        let visible = tree.visible_members(parent).unwrap();
        prop_assert!(is_subsequence(visible, members));

        for &member in members {
            let node = tree.node(member).unwrap();
            prop_assert_eq!(node.is_listed(), visible.contains(&member));
            if let Some(needle) = needle
                && !node.kind().is_parent()
            {
                prop_assert_eq!(node.should_show(), node.label().contains(needle));
            }
        }

        if needle.is_none() && tree.fold_state(parent).unwrap() == FoldState::Folded {
            prop_assert!(visible.is_empty());
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Invariants hold across arbitrary operation sequences
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn invariants_hold_after_every_step(
        groups in prop::collection::vec(group_strategy(), 1..4),
        ops in prop::collection::vec(op_strategy(), 0..24),
    ) {
        let (mut tree, events) = build(&groups);
        let mut needle: Option<String> = None;
        check_invariants(&tree, None)?;

        for op in ops {
            match op {
                Op::Unfold(index) | Op::Fold(index) => {
                    let all = parents(&tree);
                    let target = all[index % all.len()];
                    tree.set_unfolded(target, matches!(op, Op::Unfold(_))).unwrap();
                }
                Op::Search(text) => {
                    tree.set_search(&text).unwrap();
                    needle = Some(text);
                }
                Op::ClearFilter => {
                    tree.clear_filter().unwrap();
                    needle = None;
                }
                Op::Tick(ms) => {
                    tree.tick(std::time::Duration::from_millis(ms)).unwrap();
                }
            }
            check_invariants(&tree, needle.as_deref())?;
        }

        if needle.is_some() {
            events.lock().clear();
            let roots = tree.roots().to_vec();
            for root in roots {
                tree.refilter_subtree(root).unwrap();
            }
            let fired = events.lock().clone();
            prop_assert!(fired.is_empty(), "second pass fired {:?}", fired);
        }
    }

    #[test]
    fn every_visibility_change_is_reported_once(
        groups in prop::collection::vec(group_strategy(), 1..4),
        text in "[abc]{1,2}",
    ) {
        let (mut tree, events) = build(&groups);
        for parent in parents(&tree) {
            tree.set_unfolded(parent, true).unwrap();
        }
        events.lock().clear();

        tree.set_search(&text).unwrap();
        tree.clear_filter().unwrap();

        // Each drawer alternates between shown and hidden and ends where it
        // started.
        let events = events.lock();
        let mut last = std::collections::HashMap::<DrawerId, bool>::new();
        let mut balance = std::collections::HashMap::<DrawerId, i32>::new();
        for event in events.iter() {
            let id = event.handle.id();
            if let Some(&previous) = last.get(&id) {
                prop_assert_ne!(previous, event.visible, "{:?}", events);
            }
            last.insert(id, event.visible);
            *balance.entry(id).or_default() += if event.visible { 1 } else { -1 };
        }
        prop_assert!(balance.values().all(|&count| count == 0), "{:?}", events);
    }
}
