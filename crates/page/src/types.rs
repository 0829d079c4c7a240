use serde::{Deserialize, Serialize};

/// Axis-aligned box in image pixels. Origin is top-left, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        BoundingBox {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// The smallest recognized unit: a word, or often a single character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub text: String,
    pub bbox: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Element {
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Element {
            text: text.into(),
            bbox,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn char_count(&self) -> usize {
        self.text.trim().chars().count()
    }

    pub fn is_single_char(&self) -> bool {
        self.char_count() == 1
    }
}

/// A line as reported by the recognizer. Element order is not trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub elements: Vec<Element>,
}

impl Line {
    pub fn new(elements: Vec<Element>) -> Self {
        Line { elements }
    }

    /// Union of the element boxes, `None` for a line without elements.
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.elements
            .iter()
            .map(|e| e.bbox)
            .reduce(|acc, b| acc.union(&b))
    }

    /// Element texts joined with single spaces, in recognizer order.
    pub fn text(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Advisory grouping of lines; ignored when ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub lines: Vec<Line>,
}

/// Everything one recognition call returned for a captured image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.blocks
            .iter()
            .flat_map(|b| &b.lines)
            .all(|l| l.text().is_empty())
    }
}
