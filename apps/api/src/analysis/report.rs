//! Report assembly — pure merge of chain output into the cached `FinalReport`.

use crate::analysis::chain::Mentored;
use crate::models::report::FinalReport;

pub fn assemble(chain: &Mentored) -> FinalReport {
    FinalReport {
        final_score: chain.judged.final_score,
        base_scores: chain.judged.scores,
        insights: chain.research_insights().to_string(),
        roadmap: chain.mentor.fields.cyber_roadmap.clone(),
        quests: chain.mentor.fields.level_up_quests.clone(),
    }
}
