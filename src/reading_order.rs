//! Row clustering and reading-order resolution for detected glyph boxes.
//!
//! Clustering is greedy and single-pass: boxes are visited in detector order
//! and each one joins the *first* open row whose anchor center lies within
//! the row gap threshold. The anchor is the vertical center of the row's first
//! member and never moves. Because of this, a box that sits between two rows
//! lands in whichever row was opened first, and the result depends on
//! detector iteration order when gaps are ambiguous.

use smallvec::SmallVec;

use crate::geometry::BoundingBox;

const INLINE_ROW_MEMBERS: usize = 16;

/// One box as seen by the clusterer.
#[derive(Clone, Copy, Debug, PartialEq)]
struct RowMember {
    cx: f32,
    cy: f32,
    source_index: usize,
}

/// Open row cluster accumulated during the greedy pass.
#[derive(Clone, Debug)]
struct RowCluster {
    anchor_cy: f32,
    members: SmallVec<[RowMember; INLINE_ROW_MEMBERS]>,
}

impl RowCluster {
    fn open(first: RowMember) -> Self {
        let mut members = SmallVec::new();
        members.push(first);
        Self {
            anchor_cy: first.cy,
            members,
        }
    }

    fn accepts(&self, cy: f32, row_gap: f32) -> bool {
        (cy - self.anchor_cy).abs() <= row_gap
    }

    fn mean_cy(&self) -> f32 {
        let sum: f32 = self.members.iter().map(|m| m.cy).sum();
        sum / self.members.len() as f32
    }
}

/// A finalized text row in reading order.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    /// Mean vertical center of the row's members.
    pub mean_cy: f32,
    /// Member `source_index` values sorted left to right.
    pub members: Vec<usize>,
}

/// Linear left-to-right, top-to-bottom ordering of box source indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadingOrder {
    rows: Vec<Row>,
    order: Vec<usize>,
}

impl ReadingOrder {
    /// Ordered `source_index` values.
    pub fn indices(&self) -> &[usize] {
        &self.order
    }

    /// Rows in rank order (top row first).
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Reading rank of a `source_index`, if it was ordered.
    pub fn rank_of(&self, source_index: usize) -> Option<usize> {
        self.order.iter().position(|&idx| idx == source_index)
    }
}

/// Cluster boxes into rows and return their reading order.
///
/// An empty box list yields an empty order; callers treat that as
/// "no glyphs found".
pub fn resolve(boxes: &[BoundingBox], row_gap_threshold: f32) -> ReadingOrder {
    if boxes.is_empty() {
        return ReadingOrder::default();
    }

    let mut clusters: Vec<RowCluster> = Vec::new();
    for bbox in boxes {
        let (cx, cy) = bbox.center();
        let member = RowMember {
            cx,
            cy,
            source_index: bbox.source_index,
        };
        match clusters
            .iter_mut()
            .find(|row| row.accepts(cy, row_gap_threshold))
        {
            Some(row) => row.members.push(member),
            None => clusters.push(RowCluster::open(member)),
        }
    }

    // Stable sorts keep creation order for exact ties.
    let mut ranked: Vec<(f32, RowCluster)> = clusters
        .into_iter()
        .map(|row| (row.mean_cy(), row))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut rows = Vec::with_capacity(ranked.len());
    let mut order = Vec::with_capacity(boxes.len());
    for (mean_cy, mut cluster) in ranked {
        cluster.members.sort_by(|a, b| a.cx.total_cmp(&b.cx));
        let members: Vec<usize> = cluster.members.iter().map(|m| m.source_index).collect();
        order.extend_from_slice(&members);
        rows.push(Row { mean_cy, members });
    }

    log::debug!(
        "reading order resolved: boxes={} rows={} row_gap={}",
        boxes.len(),
        rows.len(),
        row_gap_threshold
    );

    ReadingOrder { rows, order }
}
