//! ATS scoring: how well does a resume match a job description?
//!
//! Only the first 2,000 characters of the JD and 4,000 of the resume are sent.

use tracing::info;

use crate::extract::truncate_chars;
use crate::generation::prompts::build_scoring_prompt;
use crate::generation::{generate_json, ServiceError};
use crate::llm_client::Generator;
use crate::models::analysis::AnalysisRecord;

const JD_CHAR_LIMIT: usize = 2_000;
const RESUME_CHAR_LIMIT: usize = 4_000;

/// Scores `resume_text` against `jd_text`.
///
/// Generation failures propagate untouched; a reply that does not decode as an
/// `AnalysisRecord` is a `ServiceError::Decode`.
pub async fn score_resume(
    generator: &dyn Generator,
    resume_text: &str,
    jd_text: &str,
    credential: &str,
    preferred_model: &str,
) -> Result<AnalysisRecord, ServiceError> {
    let prompt = build_scoring_prompt(
        truncate_chars(resume_text, RESUME_CHAR_LIMIT),
        truncate_chars(jd_text, JD_CHAR_LIMIT),
    );

    let analysis: AnalysisRecord =
        generate_json(generator, &prompt, credential, preferred_model).await?;

    info!(
        match_percentage = analysis.match_percentage,
        missing = analysis.missing_keywords.len(),
        "ATS analysis complete"
    );
    Ok(analysis)
}
