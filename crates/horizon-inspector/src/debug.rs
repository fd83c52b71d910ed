//! Text rendering of a drawer tree for logs and test failures.
//!
//! ```
//! use horizon_inspector::{DrawerKind, DrawerTree, MemberHandle, TypeTable};
//! use horizon_inspector::debug::{DrawerTreeDebug, TreeFormatOptions};
//!
//! let mut tree = DrawerTree::new(TypeTable::new());
//! tree.create_root(&MemberHandle::new("Enabled", DrawerKind::Bool).with_value(true))?;
//!
//! let text = DrawerTreeDebug::with_options(&tree, TreeFormatOptions::minimal()).to_string();
//! assert_eq!(text, "Enabled\n");
//! # Ok::<(), horizon_inspector::DrawerError>(())
//! ```

use std::fmt;

use horizon_inspector_core::DrawerId;

use crate::fold::FoldState;
use crate::tree::DrawerTree;

/// Style options for drawer tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Indentation with a dash per level.
    Compact,
}

/// Configuration for drawer tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show drawer ids.
    pub show_ids: bool,
    /// Whether to show drawer kinds.
    pub show_kinds: bool,
    /// Whether to show cached values of leaf drawers.
    pub show_values: bool,
    /// Whether to show the fold state of foldable parents.
    pub show_fold: bool,
    /// Walk every constructed member instead of only the visible ones.
    /// Members that are not listed are marked `hidden`.
    pub show_hidden: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_kinds: true,
            show_values: true,
            show_fold: true,
            show_hidden: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            show_hidden: true,
            ..Default::default()
        }
    }

    /// Labels only, visible drawers only.
    pub fn minimal() -> Self {
        Self {
            style: TreeStyle::Compact,
            show_kinds: false,
            show_values: false,
            show_fold: false,
            ..Default::default()
        }
    }
}

/// Renders the drawers of a [`DrawerTree`] as an indented outline.
#[derive(Debug, Clone)]
pub struct DrawerTreeDebug<'a> {
    tree: &'a DrawerTree,
    root: Option<DrawerId>,
    options: TreeFormatOptions,
}

impl<'a> DrawerTreeDebug<'a> {
    /// Render every root with default options.
    pub fn new(tree: &'a DrawerTree) -> Self {
        Self::with_options(tree, TreeFormatOptions::default())
    }

    /// Render every root with custom options.
    pub fn with_options(tree: &'a DrawerTree, options: TreeFormatOptions) -> Self {
        Self {
            tree,
            root: None,
            options,
        }
    }

    /// Render only the subtree below `root`.
    pub fn subtree(mut self, root: DrawerId) -> Self {
        self.root = Some(root);
        self
    }

    fn children(&self, id: Option<DrawerId>) -> &'a [DrawerId] {
        let tree = self.tree;
        match id {
            None if self.options.show_hidden => tree.roots(),
            None => tree.visible_roots(),
            Some(id) => {
                let state = tree.node(id).and_then(|node| node.as_parent());
                match state {
                    Some(state) if self.options.show_hidden => &state.members,
                    Some(state) => &state.visible_members,
                    None => &[],
                }
            }
        }
    }

    fn write_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: DrawerId,
        depth: usize,
        rails: &mut Vec<bool>,
        is_last: bool,
    ) -> fmt::Result {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }
        let Some(node) = self.tree.node(id) else {
            return Ok(());
        };

        self.write_prefix(f, rails, is_last, depth)?;
        if node.label().is_empty() {
            f.write_str("(unlabeled)")?;
        } else {
            f.write_str(node.label())?;
        }
        if self.options.show_ids {
            write!(f, " [{id:?}]")?;
        }
        if self.options.show_kinds {
            write!(f, " ({})", node.kind())?;
        }
        if self.options.show_values && !node.kind().is_parent() && !node.value().is_none() {
            write!(f, " = {}", node.value())?;
        }
        if self.options.show_fold
            && let Some(state) = node.as_parent()
            && node.kind().is_foldable()
        {
            let fold = match state.fold.state() {
                FoldState::Folded => "folded",
                FoldState::Animating => "animating",
                FoldState::Unfolded => "unfolded",
            };
            write!(f, " {fold}")?;
        }
        if self.tree.is_filtering() && !node.should_show() {
            f.write_str(" filtered")?;
        }
        if !node.is_listed() {
            f.write_str(" hidden")?;
        }
        f.write_str("\n")?;

        let children = self.children(Some(id));
        if depth > 0 {
            rails.push(!is_last);
        }
        for (index, &child) in children.iter().enumerate() {
            self.write_node(f, child, depth + 1, rails, index + 1 == children.len())?;
        }
        if depth > 0 {
            rails.pop();
        }
        Ok(())
    }

    fn write_prefix(
        &self,
        f: &mut fmt::Formatter<'_>,
        rails: &[bool],
        is_last: bool,
        depth: usize,
    ) -> fmt::Result {
        if depth == 0 {
            return Ok(());
        }
        let pad = self.options.indent_size;
        let (rail, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => {
                return write!(f, "{:width$}- ", "", width = (depth - 1) * pad);
            }
        };
        for &open in rails {
            let glyph = if open { rail } else { " " };
            write!(f, "{glyph}{:width$}", "", width = pad + 1)?;
        }
        f.write_str(if is_last { corner } else { tee })
    }
}

impl fmt::Display for DrawerTreeDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rails = Vec::new();
        if let Some(root) = self.root {
            return self.write_node(f, root, 0, &mut rails, true);
        }
        let roots = self.children(None);
        if roots.is_empty() {
            return f.write_str("(empty)\n");
        }
        for (index, &root) in roots.iter().enumerate() {
            self.write_node(f, root, 0, &mut rails, index + 1 == roots.len())?;
        }
        Ok(())
    }
}
