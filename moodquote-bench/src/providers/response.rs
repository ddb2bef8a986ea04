//! Locating the generated text inside a provider response body
//!
//! Response bodies differ between providers and API revisions. Each known
//! layout is a [`ResponseShape`]; they are tried in order and the first one
//! that yields text wins. A body matching none of them is passed on verbatim
//! so the structured-output extractor still gets a chance at it.

use serde_json::Value;

/// A known response body layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `candidates[0].content.parts[*].text` (Gemini generateContent)
    GeminiCandidates,
    /// `choices[0].message.content` (chat completions)
    ChatChoices,
    /// `content[*].text` where `type == "text"` (messages API)
    ContentBlocks,
}

impl ResponseShape {
    pub const ORDER: [ResponseShape; 3] = [
        ResponseShape::GeminiCandidates,
        ResponseShape::ChatChoices,
        ResponseShape::ContentBlocks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResponseShape::GeminiCandidates => "gemini_candidates",
            ResponseShape::ChatChoices => "chat_choices",
            ResponseShape::ContentBlocks => "content_blocks",
        }
    }

    pub fn extract(&self, body: &Value) -> Option<String> {
        match self {
            ResponseShape::GeminiCandidates => {
                let parts = body
                    .get("candidates")?
                    .get(0)?
                    .get("content")?
                    .get("parts")?
                    .as_array()?;
                join_texts(parts.iter().filter_map(|p| p.get("text")?.as_str()))
            }
            ResponseShape::ChatChoices => body
                .get("choices")?
                .get(0)?
                .get("message")?
                .get("content")?
                .as_str()
                .map(String::from),
            ResponseShape::ContentBlocks => {
                let blocks = body.get("content")?.as_array()?;
                join_texts(blocks.iter().filter_map(|b| {
                    if b.get("type")?.as_str()? == "text" {
                        b.get("text")?.as_str()
                    } else {
                        None
                    }
                }))
            }
        }
    }
}

fn join_texts<'a>(texts: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut out: Option<String> = None;
    for text in texts {
        out.get_or_insert_with(String::new).push_str(text);
    }
    out
}

/// Text pulled out of a response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseText {
    Matched { shape: ResponseShape, text: String },
    /// No known layout matched; the serialized body
    Raw(String),
}

impl ResponseText {
    pub fn from_body(body: &Value) -> Self {
        ResponseShape::ORDER
            .iter()
            .find_map(|shape| {
                shape.extract(body).map(|text| ResponseText::Matched {
                    shape: *shape,
                    text,
                })
            })
            .unwrap_or_else(|| ResponseText::Raw(body.to_string()))
    }

    pub fn text(&self) -> &str {
        match self {
            ResponseText::Matched { text, .. } => text,
            ResponseText::Raw(raw) => raw,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ResponseText::Matched { text, .. } => text,
            ResponseText::Raw(raw) => raw,
        }
    }

    pub fn shape(&self) -> Option<ResponseShape> {
        match self {
            ResponseText::Matched { shape, .. } => Some(*shape),
            ResponseText::Raw(_) => None,
        }
    }
}
