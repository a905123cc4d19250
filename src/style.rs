//! Color and stroke rules handed to the renderer with every frame. Precedence: root-path
//! membership over center, center over root, root over plain nodes.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::mindmap::RelationType;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

const PATH: Rgba = Rgba::new(245, 158, 11, 1.0);
const CENTER: Rgba = Rgba::new(255, 215, 0, 1.0);
const ROOT: Rgba = Rgba::new(255, 107, 107, 1.0);
const PLAIN: Rgba = Rgba::new(66, 153, 225, 1.0);
const HOVER_BORDER: Rgba = Rgba::new(255, 68, 68, 1.0);
const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeStyleInput {
    pub highlighted: bool,
    pub hovered: bool,
    pub is_path_node: bool,
    pub is_center_node: bool,
    pub is_root: bool,
    pub has_children: bool,
    pub has_hidden_children: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Border {
    pub color: Rgba,
    pub width: f32,
}

pub fn node_fill(input: NodeStyleInput) -> Rgba {
    let collapsed = input.has_children && input.has_hidden_children;

    if !input.highlighted {
        let (base, strong, faint) = if input.is_center_node {
            (CENTER, 0.9, 0.6)
        } else if input.is_root {
            (ROOT, 0.9, 0.6)
        } else {
            (PLAIN, 0.8, 0.4)
        };
        return base.with_alpha(if collapsed { strong } else { faint });
    }

    let base = if input.is_path_node {
        PATH
    } else if input.is_center_node {
        CENTER
    } else if input.is_root {
        ROOT
    } else {
        PLAIN
    };
    base.with_alpha(if input.has_children { 1.0 } else { 0.9 })
}

pub fn node_border(input: NodeStyleInput) -> Option<Border> {
    let collapsed = input.has_children && input.has_hidden_children;
    if !input.highlighted && !collapsed {
        return None;
    }

    let color = if input.hovered {
        HOVER_BORDER
    } else if input.has_hidden_children {
        PLAIN
    } else {
        WHITE
    };
    let width = if input.has_hidden_children { 2.0 } else { 3.0 };
    Some(Border { color, width })
}

pub fn link_color(kind: &RelationType, highlighted: bool, is_path_link: bool) -> Rgba {
    if !highlighted {
        return WHITE;
    }
    if is_path_link {
        return PATH.with_alpha(0.9);
    }
    match kind {
        RelationType::RelatedTo => Rgba::new(52, 211, 153, 0.9),
        RelationType::HasSubtopic => Rgba::new(99, 102, 241, 0.9),
        RelationType::CompareTo => Rgba::new(236, 72, 153, 0.9),
        RelationType::Other(_) => WHITE.with_alpha(0.8),
    }
}

pub fn link_width(highlighted: bool) -> f32 {
    if highlighted { 3.0 } else { 1.0 }
}
