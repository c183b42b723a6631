//! Stage output schemas.
//!
//! Every provider response goes through exactly one place: `StageFields::parse`
//! decides whether the text is a JSON object at all (fatal if not), and the
//! typed accessors decide what counts as absent or invalid for each field
//! (never fatal; the field gets its default and a warning is logged).

use std::fmt;

use serde_json::{Map, Value};
use tracing::warn;

use crate::llm_client::strip_json_fences;

pub const DEFAULT_SCORE: u32 = 50;
pub const MIN_SCORE: u32 = 1;
pub const MAX_SCORE: u32 = 100;
pub const QUEST_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extractor,
    Oracle,
    Judge,
    Mentor,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Extractor => "extractor",
            Stage::Oracle => "oracle",
            Stage::Judge => "judge",
            Stage::Mentor => "mentor",
        }
    }

    /// Extraction and grading stages sample greedily; the Mentor gets a little room.
    pub fn temperature(&self) -> f32 {
        match self {
            Stage::Mentor => 0.2,
            _ => 0.0,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One stage's parsed output together with the provider text it came from.
#[derive(Debug, Clone)]
pub struct AgentStageResult<T> {
    pub stage: Stage,
    pub fields: T,
    pub raw_provider_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorFields {
    pub structured_profile: String,
    pub vigor_score: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OracleFields {
    pub research_insights: String,
    pub immunity_score: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JudgeFields {
    pub domain_depth: u32,
    pub knowledge_width: u32,
    pub domain_variance: u32,
    pub experience_context: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MentorFields {
    pub cyber_roadmap: Vec<String>,
    pub level_up_quests: Vec<String>,
}

/// The top-level JSON object of one provider response.
pub struct StageFields {
    stage: Stage,
    object: Map<String, Value>,
}

impl StageFields {
    /// Fails only when `raw` is not a JSON object; the reason is returned for diagnostics.
    pub fn parse(stage: Stage, raw: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(strip_json_fences(raw)).map_err(|e| e.to_string())?;
        match value {
            Value::Object(object) => Ok(Self { stage, object }),
            other => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        }
    }

    /// An integer score in [1, 100]. Numeric strings are accepted; fractional
    /// values are rounded. Anything else yields `DEFAULT_SCORE`.
    pub fn score(&self, field: &str) -> u32 {
        let parsed = match self.object.get(field) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let score = parsed
            .filter(|v| v.is_finite())
            .map(f64::round)
            .filter(|v| (f64::from(MIN_SCORE)..=f64::from(MAX_SCORE)).contains(v));
        match score {
            Some(v) => v as u32,
            None => {
                self.defaulted(field);
                DEFAULT_SCORE
            }
        }
    }

    /// A string field; anything that is not a string yields "".
    pub fn text(&self, field: &str) -> String {
        match self.object.get(field) {
            Some(Value::String(s)) => s.clone(),
            _ => {
                self.defaulted(field);
                String::new()
            }
        }
    }

    /// An array of strings. Non-string items are dropped; a non-array yields [].
    pub fn text_list(&self, field: &str) -> Vec<String> {
        match self.object.get(field) {
            Some(Value::Array(items)) => {
                let list: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect();
                if list.len() != items.len() {
                    warn!(
                        stage = self.stage.name(),
                        field, "dropped {} non-text items", items.len() - list.len()
                    );
                }
                list
            }
            _ => {
                self.defaulted(field);
                Vec::new()
            }
        }
    }

    fn defaulted(&self, field: &str) {
        warn!(
            stage = self.stage.name(),
            field, "field missing or invalid, using default"
        );
    }
}

impl ExtractorFields {
    pub fn from_fields(f: &StageFields) -> Self {
        Self {
            structured_profile: f.text("structured_profile"),
            vigor_score: f.score("vigor_score"),
        }
    }
}

impl OracleFields {
    pub fn from_fields(f: &StageFields) -> Self {
        Self {
            research_insights: f.text("research_insights"),
            immunity_score: f.score("immunity_score"),
        }
    }
}

impl JudgeFields {
    pub fn from_fields(f: &StageFields) -> Self {
        Self {
            domain_depth: f.score("domain_depth"),
            knowledge_width: f.score("knowledge_width"),
            domain_variance: f.score("domain_variance"),
            experience_context: f.score("experience_context"),
        }
    }
}

impl MentorFields {
    pub fn from_fields(f: &StageFields) -> Self {
        let mut level_up_quests = f.text_list("level_up_quests");
        if level_up_quests.len() > QUEST_COUNT {
            warn!(
                "mentor returned {} quests, keeping the first {QUEST_COUNT}",
                level_up_quests.len()
            );
            level_up_quests.truncate(QUEST_COUNT);
        }
        Self {
            cyber_roadmap: f.text_list("cyber_roadmap"),
            level_up_quests,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
