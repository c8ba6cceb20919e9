//! Tracked-section classifier.
//!
//! Walks a host UI tree and decides whether the platform's short-form video
//! section is on screen. The walk uses an explicit stack, so deep trees
//! can't overflow the call stack.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::platform::Platform;

/// One node of a host accessibility tree.
///
/// Implement it for a cheap handle (a reference or an id), since the walk
/// moves nodes onto its stack by value.
pub trait UiNode: Sized {
    fn text(&self) -> Option<Cow<'_, str>>;

    fn content_description(&self) -> Option<Cow<'_, str>>;

    fn view_id(&self) -> Option<Cow<'_, str>>;

    fn is_selected(&self) -> bool;

    fn children(&self) -> Vec<Self>;
}

/// Pre-order depth-first search. Stops at the first match.
pub fn any_node<N: UiNode>(root: N, mut predicate: impl FnMut(&N) -> bool) -> bool {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if predicate(&node) {
            return true;
        }
        let mut children = node.children();
        children.reverse();
        stack.extend(children);
    }
    false
}

/// A missing root (window not ready, permission revoked) means "not active".
pub fn classify<N: UiNode>(platform: Platform, root: Option<N>) -> bool {
    let Some(root) = root else {
        return false;
    };
    match platform {
        Platform::Instagram => any_node(root, is_reels_node),
        Platform::YouTube => any_node(root, is_shorts_node),
    }
}

fn lower(value: Option<Cow<'_, str>>) -> String {
    value.map(|v| v.to_lowercase()).unwrap_or_default()
}

fn is_reels_node<N: UiNode>(node: &N) -> bool {
    let text = lower(node.text());
    text.contains("reels") || text.contains("explore")
}

fn is_shorts_node<N: UiNode>(node: &N) -> bool {
    let text = lower(node.text());
    let text = text.trim();
    let desc = lower(node.content_description());
    let view_id = lower(node.view_id());

    // Tab labels only count while the Shorts tab is the selected one.
    let is_shorts_tab = text == "shorts"
        || (desc.contains("shorts") && desc.contains("tab"))
        || (view_id.contains("pivot_bar") && text == "shorts");
    if is_shorts_tab && (node.is_selected() || desc.contains("selected")) {
        return true;
    }

    if desc.contains("shorts") && desc.contains("player") {
        return true;
    }

    ["reel_player", "shorts_player", "shorts_video", "shorts_reel"]
        .iter()
        .any(|id| view_id.contains(id))
}

/// Owned UI tree, e.g. captured from a device dump or fed through the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSnapshot {
    pub text: Option<String>,
    pub content_description: Option<String>,
    pub view_id: Option<String>,
    pub selected: bool,
    pub children: Vec<UiSnapshot>,
}

impl UiSnapshot {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn with_children(children: Vec<UiSnapshot>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }
}

impl<'a> UiNode for &'a UiSnapshot {
    fn text(&self) -> Option<Cow<'_, str>> {
        self.text.as_deref().map(Cow::Borrowed)
    }

    fn content_description(&self) -> Option<Cow<'_, str>> {
        self.content_description.as_deref().map(Cow::Borrowed)
    }

    fn view_id(&self) -> Option<Cow<'_, str>> {
        self.view_id.as_deref().map(Cow::Borrowed)
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn children(&self) -> Vec<Self> {
        let node: &'a UiSnapshot = *self;
        node.children.iter().collect()
    }
}

/// Re-checks whether a platform's section is still on screen.
pub trait SectionProbe {
    fn section_active(&self, platform: Platform) -> bool;
}

impl<F> SectionProbe for F
where
    F: Fn(Platform) -> bool,
{
    fn section_active(&self, platform: Platform) -> bool {
        self(platform)
    }
}
