//! The filter propagator.
//!
//! A filter pass evaluates a [`DrawerPredicate`] against every drawer and
//! stores the result in `should_show`: a drawer shows when it matches on its
//! own, or when any of its members shows. Parents that were never opened are
//! built first (see [`FilterConfig::force_build_folded`]) so matches inside
//! folded content surface.
//!
//! While a filter is installed, visible lists contain exactly the members
//! that passed, regardless of fold state. Clearing the filter restores
//! fold-based visibility without evaluating anything.
//!
//! [`FilterConfig::force_build_folded`]: crate::config::FilterConfig::force_build_folded

use std::fmt;
use std::rc::Rc;

use horizon_inspector_core::logging::targets;
use horizon_inspector_core::{DrawerId, InspectorResult, PerfSpan};

use crate::node::DrawerNode;
use crate::tree::DrawerTree;

/// Decides whether a single drawer matches, ignoring its members.
pub trait DrawerPredicate {
    /// Whether `node` matches on its own label, value or type.
    fn matches(&self, node: &DrawerNode) -> bool;
}

impl<F> DrawerPredicate for F
where
    F: Fn(&DrawerNode) -> bool,
{
    fn matches(&self, node: &DrawerNode) -> bool {
        self(node)
    }
}

/// One whitespace-separated term of a search string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    /// Plain text, matched against the label.
    Label(String),
    /// `t:text`, matched against the drawer kind and type name.
    Type(String),
    /// `v:text`, matched against the value's display text.
    Value(String),
}

impl SearchTerm {
    fn needle(&self) -> &str {
        match self {
            Self::Label(needle) | Self::Type(needle) | Self::Value(needle) => needle,
        }
    }

    fn same_field(&self, other: &SearchTerm) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// A parsed search string. Every term must match.
///
/// ```
/// use horizon_inspector::SearchFilter;
///
/// let broad = SearchFilter::parse("pos", false);
/// let narrow = SearchFilter::parse("position t:float", false);
/// assert!(narrow.narrows(&broad));
/// assert!(!broad.narrows(&narrow));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    text: String,
    terms: Vec<SearchTerm>,
    case_sensitive: bool,
}

impl SearchFilter {
    /// Parse a search string.
    pub fn parse(text: &str, case_sensitive: bool) -> Self {
        let fold = |term: &str| {
            if case_sensitive {
                term.to_string()
            } else {
                term.to_lowercase()
            }
        };
        let terms = text
            .split_whitespace()
            .filter_map(|word| {
                let term = if let Some(rest) = word.strip_prefix("t:") {
                    SearchTerm::Type(fold(rest))
                } else if let Some(rest) = word.strip_prefix("v:") {
                    SearchTerm::Value(fold(rest))
                } else {
                    SearchTerm::Label(fold(word))
                };
                (!term.needle().is_empty()).then_some(term)
            })
            .collect();
        Self {
            text: text.trim().to_string(),
            terms,
            case_sensitive,
        }
    }

    /// The search string as typed, trimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parsed terms.
    pub fn terms(&self) -> &[SearchTerm] {
        &self.terms
    }

    /// Whether the filter has no terms and therefore matches everything.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether every drawer matching `self` also matches `previous`.
    ///
    /// Holds when each term of `previous` is contained in some term of
    /// `self` on the same field. A subtree that failed `previous` then fails
    /// `self` too and need not be evaluated again.
    pub fn narrows(&self, previous: &SearchFilter) -> bool {
        self.case_sensitive == previous.case_sensitive
            && previous.terms.iter().all(|old| {
                self.terms
                    .iter()
                    .any(|new| new.same_field(old) && new.needle().contains(old.needle()))
            })
    }

    fn contains(&self, haystack: &str, needle: &str) -> bool {
        if self.case_sensitive {
            haystack.contains(needle)
        } else {
            haystack.to_lowercase().contains(needle)
        }
    }
}

impl DrawerPredicate for SearchFilter {
    fn matches(&self, node: &DrawerNode) -> bool {
        self.terms.iter().all(|term| match term {
            SearchTerm::Label(needle) => self.contains(node.label(), needle),
            SearchTerm::Type(needle) => {
                self.contains(node.kind().name(), needle)
                    || node
                        .type_handle()
                        .is_some_and(|owner| self.contains(owner.name(), needle))
            }
            SearchTerm::Value(needle) => node.value().display_contains(needle, self.case_sensitive),
        })
    }
}

/// The installed filter of a tree.
#[derive(Clone)]
pub(crate) struct ActiveFilter {
    pub(crate) predicate: Rc<dyn DrawerPredicate>,
    pub(crate) search: Option<SearchFilter>,
}

impl fmt::Debug for ActiveFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveFilter")
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

impl DrawerTree {
    /// Whether visible lists currently follow filter results.
    pub fn is_filtering(&self) -> bool {
        self.filter.is_some() || self.filter_pass
    }

    /// The installed search string, if the filter came from
    /// [`set_search`](Self::set_search).
    pub fn search_text(&self) -> Option<&str> {
        self.filter
            .as_ref()
            .and_then(|filter| filter.search.as_ref())
            .map(SearchFilter::text)
    }

    /// Install `predicate` and filter the whole tree.
    pub fn set_filter<P>(&mut self, predicate: P) -> InspectorResult<()>
    where
        P: DrawerPredicate + 'static,
    {
        self.filter = Some(ActiveFilter {
            predicate: Rc::new(predicate),
            search: None,
        });
        self.run_filter_pass(false)
    }

    /// Filter the tree by a search string.
    ///
    /// An empty string clears the filter. Setting the current string again
    /// does nothing. When the new string narrows the current one, subtrees
    /// that already failed are skipped.
    pub fn set_search(&mut self, text: &str) -> InspectorResult<()> {
        let search = SearchFilter::parse(text, self.config.filter.case_sensitive);
        if search.is_empty() {
            return self.clear_filter();
        }
        let previous = self.filter.as_ref().and_then(|filter| filter.search.as_ref());
        if previous.is_some_and(|previous| previous.terms == search.terms) {
            return Ok(());
        }
        let skip_failed = previous.is_some_and(|previous| search.narrows(previous));
        tracing::debug!(target: targets::FILTER, text = search.text(), incremental = skip_failed, "search changed");
        self.filter = Some(ActiveFilter {
            predicate: Rc::new(search.clone()),
            search: Some(search),
        });
        self.run_filter_pass(skip_failed)
    }

    /// Remove the filter and restore fold-based visibility.
    ///
    /// No predicate is evaluated; the tree is walked once to reset filter
    /// results and rebuild visible lists.
    pub fn clear_filter(&mut self) -> InspectorResult<()> {
        if self.filter.take().is_none() {
            return Ok(());
        }
        let _span = PerfSpan::new("clear_filter");
        for index in 0..self.roots.len() {
            let root = self.roots[index];
            self.restore_unfiltered(root, true)?;
        }
        self.rebuild_visible_roots(true);
        tracing::debug!(target: targets::FILTER, "filter cleared");
        Ok(())
    }

    /// Rebuild the visible lists below `id` from fold state, optionally
    /// resetting filter results on the way.
    fn restore_unfiltered(&mut self, id: DrawerId, reset_results: bool) -> InspectorResult<()> {
        let node = self.active_mut(id)?;
        if reset_results {
            node.should_show = true;
        }
        let Some(state) = node.as_parent() else {
            return Ok(());
        };
        let count = state.members.len();
        for index in 0..count {
            let member = self.parent_state(id)?.members[index];
            self.restore_unfiltered(member, reset_results)?;
        }
        self.rebuild_visible_members(id, true)
    }

    /// Evaluate `predicate` over the subtree of `id`.
    ///
    /// Sets `should_show` on every drawer visited, builds folded parents
    /// when configured to, and rebuilds the visible lists inside the subtree
    /// from the results. Returns whether `id` or any descendant passed.
    ///
    /// The lists of `id`'s ancestors are not touched; use
    /// [`refilter_subtree`](Self::refilter_subtree) to keep them in step
    /// with the installed filter. With no filter installed, only the
    /// results are kept and the lists go back to following fold state.
    pub fn apply_filter<P>(&mut self, id: DrawerId, predicate: &P) -> InspectorResult<bool>
    where
        P: DrawerPredicate + ?Sized,
    {
        let outer = std::mem::replace(&mut self.filter_pass, true);
        let result = self.filter_node(id, &|node: &DrawerNode| predicate.matches(node), false, true);
        self.filter_pass = outer;
        let passed = result?;
        if !self.is_filtering() {
            self.restore_unfiltered(id, false)?;
        }
        Ok(passed)
    }

    /// Re-run the installed filter on the subtree of `id` and update the
    /// filter results of its ancestors.
    ///
    /// Returns whether `id` passes; `true` when no filter is installed.
    pub fn refilter_subtree(&mut self, id: DrawerId) -> InspectorResult<bool> {
        self.refilter_with(id, true)
    }

    pub(crate) fn refilter_with(&mut self, id: DrawerId, send_events: bool) -> InspectorResult<bool> {
        let Some(filter) = self.filter.as_ref() else {
            return Ok(true);
        };
        let predicate = Rc::clone(&filter.predicate);
        let outer = std::mem::replace(&mut self.filter_pass, true);
        let result = self.refilter_inner(id, &*predicate, send_events);
        self.filter_pass = outer;
        if !outer {
            self.rebuild_visible_roots(send_events);
        }
        result
    }

    fn refilter_inner(
        &mut self,
        id: DrawerId,
        predicate: &dyn DrawerPredicate,
        send_events: bool,
    ) -> InspectorResult<bool> {
        let passed = self.filter_node(id, predicate, false, send_events)?;
        let mut current = self.active(id)?.parent;
        while let Some(parent) = current {
            let node = self.active(parent)?;
            let own = !node.kind.is_auxiliary() && predicate.matches(node);
            let any_member = node.as_parent().is_some_and(|state| {
                state
                    .members
                    .iter()
                    .any(|&member| self.nodes.get(member).is_some_and(|member| member.should_show))
            });
            current = node.parent;
            self.active_mut(parent)?.should_show = own || any_member;
            self.rebuild_visible_members(parent, send_events)?;
        }
        Ok(passed)
    }

    fn run_filter_pass(&mut self, skip_failed: bool) -> InspectorResult<()> {
        let Some(filter) = self.filter.as_ref() else {
            return Ok(());
        };
        let predicate = Rc::clone(&filter.predicate);
        let _span = PerfSpan::new("filter_pass");
        let outer = std::mem::replace(&mut self.filter_pass, true);
        let mut result = Ok(());
        let mut passed = 0usize;
        for index in 0..self.roots.len() {
            let root = self.roots[index];
            match self.filter_node(root, &*predicate, skip_failed, true) {
                Ok(true) => passed += 1,
                Ok(false) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
        self.filter_pass = outer;
        self.rebuild_visible_roots(true);
        tracing::debug!(target: targets::FILTER, roots = self.roots.len(), passed, "filter pass finished");
        result
    }

    /// Evaluate one drawer and, for parents, its members.
    fn filter_node(
        &mut self,
        id: DrawerId,
        predicate: &dyn DrawerPredicate,
        skip_failed: bool,
        send_events: bool,
    ) -> InspectorResult<bool> {
        let node = self.active(id)?;
        if skip_failed && !node.should_show {
            return Ok(false);
        }
        let own = !node.kind.is_auxiliary() && predicate.matches(node);
        let built = node.as_parent().map(|state| state.built);
        let mut any_member = false;

        if let Some(built) = built {
            if !built && self.config.filter.force_build_folded && !self.repeats_ancestor_type(id) {
                self.ensure_members_built(id)?;
            }
            let count = self.parent_state(id)?.members.len();
            for index in 0..count {
                let member = self.parent_state(id)?.members[index];
                if self.filter_node(member, predicate, skip_failed, send_events)? {
                    any_member = true;
                }
            }
            self.rebuild_visible_members(id, send_events)?;
        }

        let passed = own || any_member;
        self.active_mut(id)?.should_show = passed;
        Ok(passed)
    }
}
