//! Pipeline data model
//!
//! Tokens ([`LogicalEntry`], [`InlineElement`]) are width independent.
//! Layout turns them into [`PhysicalLine`]s made of [`Fragment`]s, which the
//! renderer paints and advertises as [`RegistryEntry`] values.

use crate::color::{Color, Palette};

/// Horizontal alignment of a logical line, set by leading `#` markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Formatting carried forward across tags within one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineState {
    pub fg: Color,
    pub bg: Color,
    pub id: Option<String>,
}

impl LineState {
    pub fn new(palette: &Palette) -> Self {
        Self {
            fg: palette.foreground,
            bg: palette.background,
            id: None,
        }
    }
}

/// Metadata handed through to the widget layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementMeta {
    pub id: Option<String>,
    /// Unadorned label (checkbox labels without the glyph prefix)
    pub label: Option<String>,
    /// Link destination
    pub target: Option<String>,
    pub on_click: Option<String>,
    pub on_enter: Option<String>,
    /// Colour a button shows while held
    pub press_color: Option<Color>,
    /// Cursor glyph for textboxes
    pub blink: Option<char>,
    pub checked: bool,
}

/// One element of a formatted logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineElement {
    Text {
        content: String,
        fg: Color,
        bg: Color,
        id: Option<String>,
    },
    Link {
        label: String,
        target: String,
        fg: Color,
        bg: Color,
        id: Option<String>,
    },
    Button {
        label: String,
        fg: Color,
        bg: Color,
        meta: ElementMeta,
    },
    Checkbox {
        label: String,
        fg: Color,
        bg: Color,
        meta: ElementMeta,
    },
    Textbox {
        width: usize,
        fg: Color,
        bg: Color,
        meta: ElementMeta,
    },
    /// Starts a new physical line without ending the logical one
    SoftBreak,
}

impl InlineElement {
    /// Element id, if the element carries one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Text { id, .. } | Self::Link { id, .. } => id.as_deref(),
            Self::Button { meta, .. } | Self::Checkbox { meta, .. } | Self::Textbox { meta, .. } => {
                meta.id.as_deref()
            }
            Self::SoftBreak => None,
        }
    }
}

/// One tokenized source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalEntry {
    Blank {
        fill: Option<Color>,
    },
    HorizontalRule {
        pattern: String,
        fg: Color,
        bg: Color,
        fill: Option<Color>,
    },
    Line {
        alignment: Alignment,
        elements: Vec<InlineElement>,
        fill: Option<Color>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Word,
    Space,
    Link,
    Button,
    Checkbox,
    Textbox,
}

impl FragmentKind {
    /// Kinds the widget layer turns into controls.
    pub fn is_interactive(self) -> bool {
        !matches!(self, Self::Word | Self::Space)
    }
}

/// Smallest paint unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
    /// Display columns of `text`
    pub width: usize,
    pub fg: Color,
    pub bg: Color,
    pub meta: ElementMeta,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhysicalLine {
    Blank {
        fill: Option<Color>,
    },
    HorizontalRule {
        text: String,
        fg: Color,
        bg: Color,
        fill: Option<Color>,
    },
    Text {
        fragments: Vec<Fragment>,
        /// 1-based starting column
        base_x: usize,
        align: Alignment,
        fill: Option<Color>,
    },
}

impl PhysicalLine {
    pub fn fill(&self) -> Option<Color> {
        match self {
            Self::Blank { fill } | Self::HorizontalRule { fill, .. } | Self::Text { fill, .. } => {
                *fill
            }
        }
    }

    /// Columns occupied by content.
    pub fn content_width(&self) -> usize {
        match self {
            Self::Blank { .. } => 0,
            Self::HorizontalRule { text, .. } => crate::layout::text_width(text),
            Self::Text { fragments, .. } => fragments.iter().map(|f| f.width).sum(),
        }
    }

    /// Plain text of the row without alignment padding.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Blank { .. } => String::new(),
            Self::HorizontalRule { text, .. } => text.clone(),
            Self::Text { fragments, .. } => fragments.iter().map(|f| f.text.as_str()).collect(),
        }
    }
}

/// Geometry of one interactive element as painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredElement {
    pub kind: FragmentKind,
    /// 1-based screen column
    pub x: usize,
    /// 1-based screen row
    pub y: usize,
    /// Columns visible after clipping
    pub width: usize,
    /// Painted text after clipping
    pub text: String,
    pub meta: ElementMeta,
}

/// Registry record produced by a paint pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Index of the physical line in the document
    pub row: usize,
    pub element: RegisteredElement,
}
