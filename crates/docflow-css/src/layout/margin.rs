//! Vertical margin collapsing between block-level boxes.
//!
//! [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
//!
//! "In CSS, the adjoining margins of two or more boxes (which might or might
//! not be siblings) can combine to form a single margin. Margins that combine
//! this way are said to collapse, and the resulting combined margin is called
//! a collapsed margin."
//!
//! The target document model has no margins, only paragraph spacing before
//! and after each block. So the engine works on the gaps between a
//! container's children: each gap ("slot") gathers the margins that adjoin
//! there, through-boxes join neighbouring slots, and each joined group is
//! written once as spacing on the box that follows it.
//!
//! ```text
//!   slot 0    child 0    slot 1    child 1    slot 2
//!  leading  [top..bot]  between  [top..bot]  trailing
//! ```

use serde::Serialize;

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "When two or more margins collapse, the resulting margin width is the
/// maximum of the collapsing margins' widths. In the case of negative
/// margins, the maximum of the absolute values of the negative adjoining
/// margins is deducted from the maximum of the positive adjoining margins.
/// If there are no positive margins, the maximum of the absolute values
/// of the adjoining margins is deducted from zero."
#[must_use]
pub fn collapse_two_margins(a: f32, b: f32) -> f32 {
    if a >= 0.0 && b >= 0.0 {
        a.max(b)
    } else if a < 0.0 && b < 0.0 {
        a.min(b)
    } else {
        a + b
    }
}

/// Collapse any number of adjoining margins at once.
///
/// Folding [`collapse_two_margins`] pairwise is not associative once
/// positive and negative margins mix, so a group is reduced as its largest
/// positive margin plus its most negative one.
#[must_use]
pub fn collapse_margins(margins: impl IntoIterator<Item = f32>) -> f32 {
    let (positive, negative) = margins
        .into_iter()
        .fold((0.0_f32, 0.0_f32), |(pos, neg), m| (pos.max(m), neg.min(m)));
    positive + negative
}

/// The collapse-relevant facts about one block-level child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BlockMargins {
    /// Outer top margin, already collapsed with anything escaping from
    /// the child's own first descendants.
    pub top: f32,
    /// Outer bottom margin, likewise.
    pub bottom: f32,
    /// "A box's own margins collapse if the 'min-height' property is
    /// computed as zero, the 'height' property is computed as zero or
    /// 'auto', it does not establish a new block formatting context, and
    /// it contains no in-flow content."
    pub through: bool,
}

impl BlockMargins {
    /// A box whose margins do not adjoin each other.
    #[must_use]
    pub const fn new(top: f32, bottom: f32) -> Self {
        Self {
            top,
            bottom,
            through: false,
        }
    }

    /// An empty box whose top and bottom margins adjoin.
    #[must_use]
    pub const fn through(top: f32, bottom: f32) -> Self {
        Self {
            top,
            bottom,
            through: true,
        }
    }
}

/// Whether margins inside a container can adjoin the container's own.
///
/// "The top margin of an in-flow block element collapses with its first
/// in-flow block-level child's top margin if the element has no top border,
/// no top padding, and the child has no clearance."
///
/// "The bottom margin of an in-flow block box with a 'height' of 'auto' and a
/// 'min-height' of zero collapses with its last in-flow block-level child's
/// bottom margin if the box has no bottom padding and no bottom border."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContainerEdges {
    /// The first child's top margin may escape through the container's top.
    pub top_open: bool,
    /// The last child's bottom margin may escape through the container's bottom.
    pub bottom_open: bool,
}

impl ContainerEdges {
    /// Neither edge lets margins through: roots, table cells, captions and
    /// containers with an explicit gap.
    pub const CLOSED: Self = Self {
        top_open: false,
        bottom_open: false,
    };

    /// Both edges open.
    pub const OPEN: Self = Self {
        top_open: true,
        bottom_open: true,
    };
}

/// Applied vertical spacing of one box, in px.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Spacing {
    /// Space above the box.
    pub before: f32,
    /// Space below the box. Non-zero only on the last child of a container
    /// whose bottom edge is closed.
    pub after: f32,
}

/// Result of collapsing one container's children.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollapsedChildren {
    /// Applied spacing per child, in child order.
    pub spacing: Vec<Spacing>,
    /// The collapsed margin leaving through the container's open top edge.
    /// The caller collapses it with the container's own top margin.
    pub escaped_top: Option<f32>,
    /// The collapsed margin leaving through the container's open bottom edge.
    pub escaped_bottom: Option<f32>,
}

/// Collapse the vertical margins of a container's block-level children.
///
/// With an `explicit_gap` the container lays its children out with a fixed
/// gap: every boundary between siblings is exactly the gap, children's
/// margins do not collapse with one another, and nothing escapes.
#[must_use]
pub fn collapse_children(
    children: &[BlockMargins],
    edges: ContainerEdges,
    explicit_gap: Option<f32>,
) -> CollapsedChildren {
    let count = children.len();
    if count == 0 {
        return CollapsedChildren::default();
    }
    if let Some(gap) = explicit_gap {
        return with_gap(children, gap.max(0.0));
    }

    // STEP 1: Gather the margins that adjoin at every slot.
    // Slot i lies above child i; slot `count` lies below the last child.
    let mut slots: Vec<Vec<f32>> = vec![Vec::new(); count + 1];
    for (i, child) in children.iter().enumerate() {
        slots[i].push(child.top);
        slots[i + 1].push(child.bottom);
    }

    // STEP 2: A through child joins the slot above it with the slot below.
    // Each maximal run of joined slots is one collapsed group.
    let mut spacing = vec![Spacing::default(); count];
    let mut escaped_top = None;
    let mut escaped_bottom = None;
    let mut start = 0;
    while start <= count {
        let mut end = start;
        while end < count && children[end].through {
            end += 1;
        }
        let value = collapse_margins(slots[start..=end].iter().flatten().copied());
        let touches_top = start == 0 && edges.top_open;
        let touches_bottom = end == count && edges.bottom_open;

        #[cfg(feature = "layout-trace")]
        log::trace!(
            target: "docflow::margin",
            "slots {start}..={end} -> {value} (top {touches_top}, bottom {touches_bottom})"
        );

        // STEP 3: Place the group. Open container edges take it outward;
        // otherwise it becomes spacing on the box after the group.
        if touches_top || touches_bottom {
            if touches_top {
                escaped_top = Some(value);
            }
            if touches_bottom {
                escaped_bottom = Some(value);
            }
        } else if end < count {
            spacing[end].before = value;
        } else {
            spacing[count - 1].after = value;
        }
        start = end + 1;
    }

    CollapsedChildren {
        spacing,
        escaped_top,
        escaped_bottom,
    }
}

/// [§ 8.1 'row-gap'](https://www.w3.org/TR/css-align-3/#column-row-gap)
///
/// The gap replaces collapsing at every sibling boundary. The first child's
/// top margin and the last child's bottom margin stay inside the container.
fn with_gap(children: &[BlockMargins], gap: f32) -> CollapsedChildren {
    let last = children.len() - 1;
    let spacing = children
        .iter()
        .enumerate()
        .map(|(i, child)| Spacing {
            before: if i == 0 { child.top } else { gap },
            after: if i == last { child.bottom } else { 0.0 },
        })
        .collect();
    CollapsedChildren {
        spacing,
        escaped_top: None,
        escaped_bottom: None,
    }
}

/// Applied spacing at each of the `n - 1` boundaries between siblings whose
/// container does not let margins escape.
///
/// For adjacent siblings A and B the spacing is `max(A.bottom, B.top)`, not
/// the sum, unless `explicit_gap` is set, in which case it is the gap.
/// Boundaries swallowed by a through-box report zero; their margins are
/// applied at the next boundary.
#[must_use]
pub fn collapse_siblings(children: &[BlockMargins], explicit_gap: Option<f32>) -> Vec<f32> {
    collapse_children(children, ContainerEdges::CLOSED, explicit_gap)
        .spacing
        .iter()
        .skip(1)
        .map(|s| s.before)
        .collect()
}
