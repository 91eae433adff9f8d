//! # Gridmark Core
//!
//! Tokenizer, layout engine and renderer for a small line-oriented markup
//! language drawn onto a fixed-width character grid.
//!
//! ## Pipeline
//!
//! ```text
//! source ──tokenize──▶ LogicalEntry ──layout(width)──▶ PhysicalLine ──paint──▶ CellGrid
//!                                                                     └──────▶ registry
//! ```
//!
//! Each stage owns its output. [`Document`] keeps all three, rebuilding a
//! stage only when something upstream of it changed.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridmark_config::RenderConfig;
//! use gridmark_core::{CellGrid, Document, Viewport};
//!
//! let mut doc = Document::from_source("##Welcome\nGo <link \"home\",\"Home\">", &RenderConfig::default())?;
//! doc.layout(20)?;
//!
//! let mut grid = CellGrid::new(20, 2);
//! let out = doc.paint(Viewport::full(&grid), &mut grid)?;
//! assert_eq!(grid.to_lines()[0].trim(), "Welcome");
//! assert_eq!(out.registry[0].element.meta.target.as_deref(), Some("home"));
//! # Ok::<(), gridmark_core::MarkupError>(())
//! ```

pub mod color;
pub mod document;
pub mod error;
pub mod grid;
pub mod layout;
pub mod preprocess;
pub mod render;
pub mod script;
pub mod tag;
pub mod tokenizer;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod proptest_strategies;

pub use color::{Color, Palette};
pub use document::{Document, ElementPatch};
pub use error::{MarkupError, MarkupResult};
pub use grid::{Cell, CellGrid};
pub use layout::LayoutEngine;
pub use render::{paint_lines, PaintOutput, Viewport};
pub use script::{ScriptBlock, ScriptExtractor};
pub use tokenizer::{PageState, Tokenizer};
pub use types::{
    Alignment, ElementMeta, Fragment, FragmentKind, InlineElement, LineState, LogicalEntry,
    PhysicalLine, RegisteredElement, RegistryEntry,
};
