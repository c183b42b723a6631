use serde::{Deserialize, Serialize};

/// The six bounded sub-scores feeding the final risk score.
/// Every field is in [1, 100]; stage parsing substitutes 50 for anything missing or invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBundle {
    pub vigor: u32,
    pub immunity: u32,
    pub depth: u32,
    pub width: u32,
    pub variance: u32,
    #[serde(rename = "experience")]
    pub experience_context: u32,
}

impl ScoreBundle {
    pub fn total(&self) -> u32 {
        self.vigor
            + self.immunity
            + self.depth
            + self.width
            + self.variance
            + self.experience_context
    }
}

/// The cached, client-facing result of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    /// Automation risk in [0, 10] at 0.5 granularity. 10 = critically exposed.
    pub final_score: f64,
    pub base_scores: ScoreBundle,
    pub insights: String,
    pub roadmap: Vec<String>,
    /// At most three items; the Mentor is asked for exactly three.
    pub quests: Vec<String>,
}
