//! Render IR and layout engines for `scrawl` glyph banks.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod jitter;
mod render_ir;
mod render_layout;

pub use jitter::{JitterSource, NoJitter, SeededJitter, ThreadJitter};
pub use render_ir::{
    DrawCommand, GlyphCommand, LayoutDiagnostics, PlaceholderCommand, RenderPage,
};
pub use render_layout::{
    layout_flow, layout_paginated, measure_item, CancelToken, FlowConfig, FlowEngine, FlowLayout,
    GlyphMetrics, ItemKind, LayoutConfig, LayoutEngine, LayoutItem, LayoutSummary, NeverCancel,
    PageLayout, FLOW_MIN_SPACE_PX, NOMINAL_CELL_PX, PLACEHOLDER_PX,
};
pub use scrawl::PageSize;
