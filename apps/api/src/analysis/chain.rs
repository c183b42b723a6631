//! Agent chain — Extractor → Oracle → Judge → Mentor.
//!
//! Each stage is a function from the previous stage's typed result to its own,
//! taking the predecessor by value. Stage n+1 therefore cannot be called until
//! stage n has parsed and defaulted its output. Later stages read earlier fields
//! (the Judge needs the Extractor's profile) through the value they were handed.
//!
//! Cancellation is checked before every provider call and raced against the
//! call itself; a cancelled chain returns `PipelineError::Cancelled`.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::analysis::prompts::{
    EXTRACTOR_PROMPT, EXTRACTOR_SYSTEM, JUDGE_PROMPT, JUDGE_SYSTEM, MENTOR_PROMPT, MENTOR_SYSTEM,
    ORACLE_PROMPT, ORACLE_SYSTEM,
};
use crate::analysis::scoring::aggregate_bundle;
use crate::analysis::stages::{
    AgentStageResult, ExtractorFields, JudgeFields, MentorFields, OracleFields, Stage, StageFields,
};
use crate::analysis::PipelineError;
use crate::llm_client::ModelClient;
use crate::models::profile::SanitizedText;
use crate::models::report::ScoreBundle;

/// After stage 1.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub extractor: AgentStageResult<ExtractorFields>,
}

/// After stage 2.
#[derive(Debug, Clone)]
pub struct Researched {
    pub extracted: Extracted,
    pub oracle: AgentStageResult<OracleFields>,
}

/// After stage 3. All six sub-scores are known here.
#[derive(Debug, Clone)]
pub struct Judged {
    pub researched: Researched,
    pub judge: AgentStageResult<JudgeFields>,
    pub scores: ScoreBundle,
    pub final_score: f64,
}

/// After stage 4: the complete chain output.
#[derive(Debug, Clone)]
pub struct Mentored {
    pub judged: Judged,
    pub mentor: AgentStageResult<MentorFields>,
}

impl Mentored {
    /// Provider text of every stage, in chain order.
    pub fn raw_outputs(&self) -> [(Stage, &str); 4] {
        let researched = &self.judged.researched;
        let extractor = &researched.extracted.extractor;
        [
            (extractor.stage, extractor.raw_provider_text.as_str()),
            (researched.oracle.stage, researched.oracle.raw_provider_text.as_str()),
            (self.judged.judge.stage, self.judged.judge.raw_provider_text.as_str()),
            (self.mentor.stage, self.mentor.raw_provider_text.as_str()),
        ]
    }

    pub fn structured_profile(&self) -> &str {
        &self.judged.researched.extracted.extractor.fields.structured_profile
    }

    pub fn research_insights(&self) -> &str {
        &self.judged.researched.oracle.fields.research_insights
    }
}

/// Runs all four stages in order. No partial result is ever returned.
pub async fn run_chain(
    client: &dyn ModelClient,
    content: &SanitizedText,
    cancel: &CancellationToken,
) -> Result<Mentored, PipelineError> {
    let extracted = extract(client, content, cancel).await?;
    let researched = research(client, extracted, cancel).await?;
    let judged = judge(client, researched, cancel).await?;
    let mentored = mentor(client, judged, cancel).await?;
    for (stage, raw) in mentored.raw_outputs() {
        debug!(stage = stage.name(), raw_chars = raw.len(), "stage output accepted");
    }
    info!(
        final_score = mentored.judged.final_score,
        "analysis chain completed"
    );
    Ok(mentored)
}

pub async fn extract(
    client: &dyn ModelClient,
    content: &SanitizedText,
    cancel: &CancellationToken,
) -> Result<Extracted, PipelineError> {
    let prompt = fill(EXTRACTOR_PROMPT, &[("profile_text", content.as_str())]);
    let extractor = run_stage(
        client,
        Stage::Extractor,
        EXTRACTOR_SYSTEM,
        &prompt,
        cancel,
        ExtractorFields::from_fields,
    )
    .await?;
    Ok(Extracted { extractor })
}

pub async fn research(
    client: &dyn ModelClient,
    extracted: Extracted,
    cancel: &CancellationToken,
) -> Result<Researched, PipelineError> {
    let prompt = fill(
        ORACLE_PROMPT,
        &[(
            "structured_profile",
            extracted.extractor.fields.structured_profile.as_str(),
        )],
    );
    let oracle = run_stage(
        client,
        Stage::Oracle,
        ORACLE_SYSTEM,
        &prompt,
        cancel,
        OracleFields::from_fields,
    )
    .await?;
    Ok(Researched { extracted, oracle })
}

pub async fn judge(
    client: &dyn ModelClient,
    researched: Researched,
    cancel: &CancellationToken,
) -> Result<Judged, PipelineError> {
    let prompt = fill(
        JUDGE_PROMPT,
        &[
            (
                "structured_profile",
                researched.extracted.extractor.fields.structured_profile.as_str(),
            ),
            ("research_insights", researched.oracle.fields.research_insights.as_str()),
        ],
    );
    let judge = run_stage(
        client,
        Stage::Judge,
        JUDGE_SYSTEM,
        &prompt,
        cancel,
        JudgeFields::from_fields,
    )
    .await?;

    let scores = ScoreBundle {
        vigor: researched.extracted.extractor.fields.vigor_score,
        immunity: researched.oracle.fields.immunity_score,
        depth: judge.fields.domain_depth,
        width: judge.fields.knowledge_width,
        variance: judge.fields.domain_variance,
        experience_context: judge.fields.experience_context,
    };
    let final_score = aggregate_bundle(&scores);
    debug!(total = scores.total(), final_score, "sub-scores aggregated");

    Ok(Judged {
        researched,
        judge,
        scores,
        final_score,
    })
}

pub async fn mentor(
    client: &dyn ModelClient,
    judged: Judged,
    cancel: &CancellationToken,
) -> Result<Mentored, PipelineError> {
    let final_score = judged.final_score.to_string();
    let immunity = judged.scores.immunity.to_string();
    let prompt = fill(
        MENTOR_PROMPT,
        &[
            ("final_score", final_score.as_str()),
            ("immunity_score", immunity.as_str()),
            (
                "structured_profile",
                judged.researched.extracted.extractor.fields.structured_profile.as_str(),
            ),
        ],
    );
    let mentor = run_stage(
        client,
        Stage::Mentor,
        MENTOR_SYSTEM,
        &prompt,
        cancel,
        MentorFields::from_fields,
    )
    .await?;
    Ok(Mentored { judged, mentor })
}

/// One provider call plus schema parsing for `stage`.
async fn run_stage<T>(
    client: &dyn ModelClient,
    stage: Stage,
    system_prompt: &str,
    user_prompt: &str,
    cancel: &CancellationToken,
    build: impl FnOnce(&StageFields) -> T,
) -> Result<AgentStageResult<T>, PipelineError> {
    if cancel.is_cancelled() {
        info!(stage = stage.name(), "cancelled before stage start");
        return Err(PipelineError::Cancelled);
    }

    debug!(stage = stage.name(), prompt_chars = user_prompt.len(), "invoking stage");
    let raw = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!(stage = stage.name(), "cancelled during provider call");
            return Err(PipelineError::Cancelled);
        }
        result = client.generate(system_prompt, user_prompt, stage.temperature()) => {
            result.map_err(|source| PipelineError::Provider { stage, source })?
        }
    };

    let fields = StageFields::parse(stage, &raw)
        .map_err(|reason| PipelineError::StageParse { stage, reason })?;

    Ok(AgentStageResult {
        stage,
        fields: build(&fields),
        raw_provider_text: raw,
    })
}

/// Substitutes `{name}` placeholders in a single pass, so inserted text is
/// never itself scanned for placeholders.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let open = &rest[start..];
        let matched = vars.iter().find(|(name, _)| {
            open[1..].starts_with(name) && open[1 + name.len()..].starts_with('}')
        });
        match matched {
            Some((name, value)) => {
                out.push_str(value);
                rest = &open[name.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &open[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::fake::ScriptedClient;
    use crate::llm_client::LlmError;

    fn content(text: &str) -> SanitizedText {
        SanitizedText::new_unchecked(text.to_string())
    }

    #[test]
    fn test_fill_is_single_pass() {
        let out = fill(
            "Profile: {structured_profile}\nAI Research: {research_insights}",
            &[
                ("structured_profile", "uses {research_insights} literally"),
                ("research_insights", "R"),
            ],
        );
        assert_eq!(out, "Profile: uses {research_insights} literally\nAI Research: R");
    }

    #[test]
    fn test_fill_leaves_unknown_braces() {
        assert_eq!(fill("{\"a\": {x}} {", &[("x", "1")]), "{\"a\": 1} {");
    }

    #[tokio::test]
    async fn test_stages_run_in_order_and_feed_forward() {
        let client = ScriptedClient::with_stage_scores("gemini-2.5-flash", [80, 70, 90, 60, 55, 65]);
        let cancel = CancellationToken::new();

        let out = run_chain(&client, &content("Senior backend engineer"), &cancel)
            .await
            .unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].system_prompt, EXTRACTOR_SYSTEM);
        assert_eq!(calls[0].user_prompt, "Analyze this profile carefully: Senior backend engineer");
        assert_eq!(calls[1].system_prompt, ORACLE_SYSTEM);
        assert_eq!(calls[1].user_prompt, "User Profile: Backend engineer profile");
        assert_eq!(calls[2].system_prompt, JUDGE_SYSTEM);
        assert_eq!(
            calls[2].user_prompt,
            "Profile: Backend engineer profile\nAI Research: - CRUD work is exposed"
        );
        assert_eq!(calls[3].system_prompt, MENTOR_SYSTEM);
        assert!(calls[3].user_prompt.starts_with("The user achieved an AI Replacement Probability Score of 3/10"));
        assert!(calls[3].user_prompt.contains("Their AI Immunity is 70/100."));
        assert!(calls[3].user_prompt.contains("Profile context: Backend engineer profile."));

        assert_eq!(
            calls.iter().map(|c| c.temperature).collect::<Vec<_>>(),
            vec![0.0, 0.0, 0.0, 0.2]
        );

        assert_eq!(out.judged.final_score, 3.0);
        assert_eq!(out.judged.scores.total(), 420);
        assert_eq!(out.mentor.fields.level_up_quests.len(), 3);
        assert_eq!(out.structured_profile(), "Backend engineer profile");
        assert_eq!(out.research_insights(), "- CRUD work is exposed");
    }

    #[tokio::test]
    async fn test_judge_defaults_do_not_abort_chain() {
        let client = ScriptedClient::new("gpt-4o-mini")
            .respond(r#"{"structured_profile": "p", "vigor_score": 80}"#)
            .respond(r#"{"research_insights": "i", "immunity_score": 70}"#)
            .respond(r#"{"domain_depth": "n/a"}"#)
            .respond(r#"{}"#);
        let out = run_chain(&client, &content("x"), &CancellationToken::new())
            .await
            .unwrap();

        let scores = out.judged.scores;
        assert_eq!(
            (scores.depth, scores.width, scores.variance, scores.experience_context),
            (50, 50, 50, 50)
        );
        assert!(out.mentor.fields.cyber_roadmap.is_empty());
        assert!(out.mentor.fields.level_up_quests.is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_stage_aborts_chain() {
        let client = ScriptedClient::new("gpt-4o-mini")
            .respond(r#"{"structured_profile": "p", "vigor_score": 80}"#)
            .respond("Sorry, I can't do that.");
        let err = run_chain(&client, &content("x"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::StageParse {
                stage: Stage::Oracle,
                ..
            }
        ));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_retried() {
        let client = ScriptedClient::new("gpt-4o-mini")
            .respond(r#"{"structured_profile": "p", "vigor_score": 80}"#)
            .respond(r#"{"research_insights": "i", "immunity_score": 70}"#)
            .fail(500, "upstream exploded")
            .respond(r#"{"domain_depth": 90}"#);
        let err = run_chain(&client, &content("x"), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            PipelineError::Provider {
                stage: Stage::Judge,
                source: LlmError::Api { status, .. },
            } => assert_eq!(status, 500),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_cancel_after_oracle_stops_before_judge() {
        let cancel = CancellationToken::new();
        let client = ScriptedClient::with_stage_scores("gemini-2.5-flash", [80, 70, 90, 60, 55, 65])
            .cancel_after(2, cancel.clone());

        let err = run_chain(&client, &content("x"), &cancel).await.unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_already_cancelled_makes_no_calls() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let client = ScriptedClient::with_stage_scores("gemini-2.5-flash", [50; 6]);

        let err = run_chain(&client, &content("x"), &cancel).await.unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled));
        assert_eq!(client.call_count(), 0);
    }
}
