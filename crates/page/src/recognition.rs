//! Adapters from recognition-engine output to [`Page`].
//!
//! Two engine flavors are accepted. A structured engine already reports
//! blocks, lines and elements and deserializes straight into [`Page`]. A cloud
//! document-OCR engine reports a flat list of word annotations with bounding
//! polygons; each word becomes a one-element [`Line`] and reading order is
//! recovered later by the spatial orderer.

use serde::{Deserialize, Serialize};

use crate::types::{Block, BoundingBox, Element, Line, Page};
use crate::PageError;

/// A polygon corner. Engines omit zero coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

impl BoundingPoly {
    /// Axis-aligned box around the polygon.
    pub fn to_bbox(&self) -> Option<BoundingBox> {
        let first = self.vertices.first()?;
        let start = BoundingBox::new(first.x, first.y, first.x, first.y);
        Some(self.vertices.iter().fold(start, |acc, v| {
            acc.union(&BoundingBox::new(v.x, v.y, v.x, v.y))
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAnnotation {
    #[serde(alias = "description")]
    pub text: String,
    pub bounding_poly: BoundingPoly,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Flat word-level output of a cloud document-OCR engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudAnnotations {
    pub words: Vec<WordAnnotation>,
}

impl CloudAnnotations {
    /// Convert into a single-block [`Page`] of one-word lines.
    ///
    /// Words without any polygon vertex cannot be placed and are rejected.
    pub fn into_page(self) -> Result<Page, PageError> {
        let mut lines = Vec::with_capacity(self.words.len());
        for word in self.words {
            if word.text.trim().is_empty() {
                continue;
            }
            let bbox = word.bounding_poly.to_bbox().ok_or_else(|| {
                PageError::InvalidAnnotation(format!("word {:?} has no vertices", word.text))
            })?;
            let element = Element {
                text: word.text,
                bbox,
                confidence: word.confidence,
            };
            lines.push(Line::new(vec![element]));
        }
        Ok(Page {
            blocks: vec![Block { lines }],
        })
    }
}

/// Any supported recognizer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recognition {
    Structured(Page),
    Cloud(CloudAnnotations),
}

impl Recognition {
    pub fn into_page(self) -> Result<Page, PageError> {
        match self {
            Recognition::Structured(page) => Ok(page),
            Recognition::Cloud(annotations) => annotations.into_page(),
        }
    }
}
