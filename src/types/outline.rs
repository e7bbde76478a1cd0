//! Structural outlines handed to the narrating model

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineSection {
    pub heading: String,
    pub bullets: Vec<String>,
}

impl OutlineSection {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            bullets: Vec::new(),
        }
    }

    pub fn bullet(mut self, text: impl Into<String>) -> Self {
        self.bullets.push(text.into());
        self
    }
}

/// Ordered headings plus bullet data. Contains no prose; the model writes that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryOutline {
    pub title: String,
    pub audience: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    pub sections: Vec<OutlineSection>,
}

impl SummaryOutline {
    pub fn headings(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.heading.as_str()).collect()
    }
}
