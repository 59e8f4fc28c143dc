//! Layout engine boundary and the in-memory grid engine.
//!
//! A [`LayoutEngine`] owns node placement once bound to a container. The
//! adapter pushes nodes in, pulls the node list out, and drains the events the
//! engine queued while mutating.

use std::collections::{BTreeMap, BTreeSet};

use super::node::{GridNode, NodeElement, PlacementHint};
use super::SurfaceError;

/// Last row a node may be placed on explicitly, and the tallest node.
///
/// Nodes pushed down by a collision may end up below this row.
pub const MAX_ROWS: u32 = 10_000;

/// Options fixed when the engine is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOptions {
    /// Number of columns.
    pub columns: u32,
    /// Row height in pixels.
    pub cell_height: u32,
    /// Gap between cells in pixels.
    pub margin: u32,
    /// Leave gaps where they are instead of compacting nodes upward.
    pub float: bool,
    /// Nodes may be removed by dragging them off the grid.
    pub removable: bool,
    /// Elements dragged in from outside the grid are accepted.
    pub accept_widgets: bool,
    /// Animate placement changes (presentation hint only).
    pub animate: bool,
    /// Disable every user gesture.
    pub static_grid: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            columns: 12,
            cell_height: 70,
            margin: 10,
            float: true,
            removable: true,
            accept_widgets: true,
            animate: true,
            static_grid: false,
        }
    }
}

/// Host the engine binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    id: String,
}

impl Container {
    /// Container identified by `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The container id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// What an [`EngineEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEventKind {
    /// Nodes were added.
    Added,
    /// Nodes moved or resized.
    Changed,
    /// Nodes were removed.
    Removed,
}

/// A batch of nodes affected by one engine mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    /// Kind of change.
    pub kind: EngineEventKind,
    /// Affected nodes as they are after the change (or were, for removals).
    pub nodes: Vec<GridNode>,
}

/// A layout engine that owns node placement.
///
/// Node handles (`key`) are engine-internal. Widget identity lives in the
/// element's attributes.
pub trait LayoutEngine {
    /// Bind a new engine to `container`.
    fn bind(container: &Container, options: GridOptions) -> Result<Self, SurfaceError>
    where
        Self: Sized;

    /// The options the engine was bound with.
    fn options(&self) -> &GridOptions;

    /// Place a new node and return its handle.
    fn add_node(&mut self, element: NodeElement, hint: PlacementHint) -> u64;

    /// Replace a node's element and placement. Returns `false` if absent.
    fn update_node(&mut self, key: u64, element: NodeElement, hint: PlacementHint) -> bool;

    /// Move a node. Returns `false` if absent.
    fn move_node(&mut self, key: u64, x: u32, y: u32) -> bool;

    /// Resize a node. Returns `false` if absent.
    fn resize_node(&mut self, key: u64, w: u32, h: u32) -> bool;

    /// Remove a node. Returns `false` if absent.
    fn remove_node(&mut self, key: u64) -> bool;

    /// Remove every node.
    fn remove_all(&mut self);

    /// Current nodes in insertion order.
    fn nodes(&self) -> &[GridNode];

    /// Drain the events queued since the last call.
    fn take_events(&mut self) -> Vec<EngineEvent>;

    /// Release the engine. Later calls see an empty grid.
    fn destroy(&mut self);
}

/// In-memory grid engine.
///
/// Widths are clamped to `1..=columns` and heights to `1..=MAX_ROWS`; `x`
/// and `y` are clamped so the node fits inside `columns` x [`MAX_ROWS`]. A node without a position goes to the first
/// free rectangle in row-major order. A node placed explicitly pushes every
/// node it overlaps straight down, recursively, and is itself never moved.
/// With `float` off, nodes are compacted upward after every change.
#[derive(Debug)]
pub struct GridEngine {
    container: String,
    options: GridOptions,
    nodes: Vec<GridNode>,
    next_key: u64,
    events: Vec<EngineEvent>,
}

impl GridEngine {
    /// The container id this engine is bound to.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Number of rows in use.
    pub fn rows(&self) -> u32 {
        self.nodes.iter().map(GridNode::bottom).max().unwrap_or(0)
    }

    fn index_of(&self, key: u64) -> Option<usize> {
        self.nodes.iter().position(|n| n.key == key)
    }

    /// Clamp a size to the grid.
    fn clamp_size(&self, w: u32, h: u32) -> (u32, u32) {
        (w.clamp(1, self.options.columns), h.clamp(1, MAX_ROWS))
    }

    /// Clamp an explicit position so a clamped `w`x`h` node fits.
    fn clamp_position(&self, x: u32, y: u32, w: u32, h: u32) -> (u32, u32) {
        (x.min(self.options.columns - w), y.min(MAX_ROWS - h))
    }

    fn collides(&self, x: u32, y: u32, w: u32, h: u32, skip: Option<u64>) -> bool {
        self.nodes
            .iter()
            .filter(|n| Some(n.key) != skip)
            .any(|n| n.overlaps(x, y, w, h))
    }

    /// First free `w`x`h` rectangle scanning row by row, column by column.
    ///
    /// Only row 0 and the rows just below existing nodes can start the first
    /// free rectangle, so those are the only rows scanned.
    fn find_free(&self, w: u32, h: u32) -> (u32, u32) {
        let max_x = self.options.columns - w;
        let rows: BTreeSet<u32> = std::iter::once(0)
            .chain(self.nodes.iter().map(GridNode::bottom))
            .collect();
        for y in rows {
            for x in 0..=max_x {
                if !self.collides(x, y, w, h, None) {
                    return (x, y);
                }
            }
        }
        (0, self.rows())
    }

    /// Push every node overlapping `anchor` downward until nothing overlaps.
    ///
    /// Nodes are settled top to bottom so their vertical order is kept.
    /// Returns the keys of the nodes that moved.
    fn push_down(&mut self, anchor: u64) -> Vec<u64> {
        let Some(anchor_index) = self.index_of(anchor) else {
            return Vec::new();
        };
        let a = &self.nodes[anchor_index];
        let mut settled = vec![(a.x, a.y, a.w, a.h)];

        let mut order: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| i != anchor_index)
            .collect();
        order.sort_by_key(|&i| (self.nodes[i].y, self.nodes[i].x));

        let mut moved = Vec::new();
        for i in order {
            let original = self.nodes[i].y;
            loop {
                let node = &self.nodes[i];
                let blocking = settled
                    .iter()
                    .filter(|(x, y, w, h)| node.overlaps(*x, *y, *w, *h))
                    .map(|(_, y, _, h)| y.saturating_add(*h))
                    .max();
                match blocking {
                    Some(bottom) => self.nodes[i].y = bottom,
                    None => break,
                }
            }
            let node = &self.nodes[i];
            settled.push((node.x, node.y, node.w, node.h));
            if node.y != original {
                moved.push(node.key);
            }
        }
        moved
    }

    /// Move nodes up into free space, top to bottom. Returns the moved keys.
    fn compact(&mut self) -> Vec<u64> {
        let mut order: Vec<(u32, u32, u64)> =
            self.nodes.iter().map(|n| (n.y, n.x, n.key)).collect();
        order.sort_unstable();

        let mut moved = Vec::new();
        for (_, _, key) in order {
            let Some(i) = self.index_of(key) else {
                continue;
            };
            let (x, w, h) = (self.nodes[i].x, self.nodes[i].w, self.nodes[i].h);
            let mut y = self.nodes[i].y;
            while y > 0 && !self.collides(x, y - 1, w, h, Some(key)) {
                y -= 1;
            }
            if y != self.nodes[i].y {
                self.nodes[i].y = y;
                moved.push(key);
            }
        }
        moved
    }

    /// Resolve collisions around `anchor`, compact if needed, and queue a
    /// `Changed` event for every node that moved (plus `anchor_changed`).
    fn settle(&mut self, anchor: u64, anchor_changed: bool) {
        let mut changed: Vec<u64> = Vec::new();
        if anchor_changed {
            changed.push(anchor);
        }
        changed.extend(self.push_down(anchor));
        if !self.options.float {
            for key in self.compact() {
                if !changed.contains(&key) {
                    changed.push(key);
                }
            }
        }
        self.queue_changed(&changed);
    }

    fn queue_changed(&mut self, keys: &[u64]) {
        let nodes: Vec<GridNode> = self
            .nodes
            .iter()
            .filter(|n| keys.contains(&n.key))
            .cloned()
            .collect();
        if !nodes.is_empty() {
            self.events.push(EngineEvent {
                kind: EngineEventKind::Changed,
                nodes,
            });
        }
    }

    /// Apply a placement hint to the node at `index`. Returns whether the
    /// rectangle changed.
    fn place(&mut self, index: usize, hint: PlacementHint) -> bool {
        let (w, h) = self.clamp_size(hint.w, hint.h);
        let key = self.nodes[index].key;
        let (x, y) = match (hint.x, hint.y) {
            (Some(x), Some(y)) => self.clamp_position(x, y, w, h),
            _ => {
                let node = &self.nodes[index];
                if node.w == w && node.h == h && !self.collides(node.x, node.y, w, h, Some(key)) {
                    (node.x, node.y)
                } else {
                    // Take the node out of the scan so it does not block itself.
                    let taken = self.nodes.remove(index);
                    let spot = self.find_free(w, h);
                    self.nodes.insert(index, taken);
                    spot
                }
            }
        };
        let node = &mut self.nodes[index];
        let changed = (node.x, node.y, node.w, node.h) != (x, y, w, h);
        node.x = x;
        node.y = y;
        node.w = w;
        node.h = h;
        changed
    }
}

impl LayoutEngine for GridEngine {
    fn bind(container: &Container, options: GridOptions) -> Result<Self, SurfaceError> {
        if container.id().trim().is_empty() {
            return Err(SurfaceError::Binding {
                container: container.id().to_string(),
                message: "container id is empty".to_string(),
            });
        }
        let options = GridOptions {
            columns: options.columns.max(1),
            ..options
        };
        tracing::debug!(container = container.id(), columns = options.columns, "grid bound");
        Ok(Self {
            container: container.id().to_string(),
            options,
            nodes: Vec::new(),
            next_key: 1,
            events: Vec::new(),
        })
    }

    fn options(&self) -> &GridOptions {
        &self.options
    }

    fn add_node(&mut self, element: NodeElement, hint: PlacementHint) -> u64 {
        let (w, h) = self.clamp_size(hint.w, hint.h);
        let (x, y, explicit) = match (hint.x, hint.y) {
            (Some(x), Some(y)) => {
                let (x, y) = self.clamp_position(x, y, w, h);
                (x, y, true)
            }
            _ => {
                let (x, y) = self.find_free(w, h);
                (x, y, false)
            }
        };
        let key = self.next_key;
        self.next_key += 1;
        self.nodes.push(GridNode {
            key,
            x,
            y,
            w,
            h,
            element,
        });

        if explicit {
            // Report the new node as added before its neighbours move.
            let moved = self.push_down(key);
            let added = self.nodes[self.nodes.len() - 1].clone();
            self.events.push(EngineEvent {
                kind: EngineEventKind::Added,
                nodes: vec![added],
            });
            let mut changed = moved;
            if !self.options.float {
                for k in self.compact() {
                    if !changed.contains(&k) {
                        changed.push(k);
                    }
                }
            }
            self.queue_changed(&changed);
        } else {
            let added = self.nodes[self.nodes.len() - 1].clone();
            self.events.push(EngineEvent {
                kind: EngineEventKind::Added,
                nodes: vec![added],
            });
            if !self.options.float {
                let moved = self.compact();
                self.queue_changed(&moved);
            }
        }
        key
    }

    fn update_node(&mut self, key: u64, element: NodeElement, hint: PlacementHint) -> bool {
        let Some(index) = self.index_of(key) else {
            return false;
        };
        let element_changed = self.nodes[index].element != element;
        self.nodes[index].element = element;
        let placed = self.place(index, hint);
        self.settle(key, element_changed || placed);
        true
    }

    fn move_node(&mut self, key: u64, x: u32, y: u32) -> bool {
        let Some(index) = self.index_of(key) else {
            return false;
        };
        let (w, h) = (self.nodes[index].w, self.nodes[index].h);
        let changed = self.place(index, PlacementHint::at(x, y, w, h));
        self.settle(key, changed);
        true
    }

    fn resize_node(&mut self, key: u64, w: u32, h: u32) -> bool {
        let Some(index) = self.index_of(key) else {
            return false;
        };
        let (x, y) = (self.nodes[index].x, self.nodes[index].y);
        let changed = self.place(index, PlacementHint::at(x, y, w, h));
        self.settle(key, changed);
        true
    }

    fn remove_node(&mut self, key: u64) -> bool {
        let Some(index) = self.index_of(key) else {
            return false;
        };
        let removed = self.nodes.remove(index);
        self.events.push(EngineEvent {
            kind: EngineEventKind::Removed,
            nodes: vec![removed],
        });
        if !self.options.float {
            let moved = self.compact();
            self.queue_changed(&moved);
        }
        true
    }

    fn remove_all(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        let removed = std::mem::take(&mut self.nodes);
        self.events.push(EngineEvent {
            kind: EngineEventKind::Removed,
            nodes: removed,
        });
    }

    fn nodes(&self) -> &[GridNode] {
        &self.nodes
    }

    fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn destroy(&mut self) {
        tracing::debug!(container = %self.container, nodes = self.nodes.len(), "grid destroyed");
        self.nodes.clear();
        self.events.clear();
    }
}

/// Longest run of free rows drawn cell by cell in [`occupancy`].
const MAX_BLANK_ROWS: u32 = 2;

/// Occupancy map of the grid, one row per line, for diagnostics.
///
/// Each cell shows the first character of the node's id, `?` for an untagged
/// node and `.` for a free cell. Runs of more than two free rows collapse to
/// a single `~ <n> empty rows` line.
pub fn occupancy(engine: &impl LayoutEngine) -> String {
    let columns = engine.options().columns;
    let mut cells: BTreeMap<(u32, u32), char> = BTreeMap::new();
    for node in engine.nodes() {
        let mark = node.id().and_then(|id| id.chars().next()).unwrap_or('?');
        for y in node.y..node.bottom() {
            for x in node.x..node.right().min(columns) {
                cells.entry((y, x)).or_insert(mark);
            }
        }
    }
    let occupied: BTreeSet<u32> = cells.keys().map(|&(y, _)| y).collect();
    let draw_row = |y: u32| -> String {
        (0..columns)
            .map(|x| cells.get(&(y, x)).copied().unwrap_or('.'))
            .collect()
    };

    let mut lines = Vec::new();
    let mut next = 0;
    for y in occupied {
        let gap = y - next;
        if gap > MAX_BLANK_ROWS {
            lines.push(format!("~ {gap} empty rows"));
        } else {
            lines.extend((next..y).map(draw_row));
        }
        lines.push(draw_row(y));
        next = y + 1;
    }
    lines.join("\n")
}
