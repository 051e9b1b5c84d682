//! Asks the model for a resume rewritten against a job description.
//!
//! Only the first 1,000 characters of the JD and 2,000 of the resume are sent.
//! The decoded `ResumeRecord` is the single input to every renderer.

use tracing::info;

use crate::extract::truncate_chars;
use crate::generation::prompts::build_rewrite_prompt;
use crate::generation::{generate_json, ServiceError};
use crate::llm_client::Generator;
use crate::models::resume::ResumeRecord;

const JD_CHAR_LIMIT: usize = 1_000;
const RESUME_CHAR_LIMIT: usize = 2_000;

pub async fn enhance_resume(
    generator: &dyn Generator,
    resume_text: &str,
    jd_text: &str,
    credential: &str,
    preferred_model: &str,
) -> Result<ResumeRecord, ServiceError> {
    let prompt = build_rewrite_prompt(
        truncate_chars(resume_text, RESUME_CHAR_LIMIT),
        truncate_chars(jd_text, JD_CHAR_LIMIT),
    );

    let resume: ResumeRecord =
        generate_json(generator, &prompt, credential, preferred_model).await?;

    info!(
        jobs = resume.experience.len(),
        education = resume.education.len(),
        skills = resume.skills.len(),
        "Resume rewrite complete"
    );
    Ok(resume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::stub::StubGenerator;
    use crate::llm_client::GenerationError;

    #[tokio::test]
    async fn test_enhance_resume_decodes_record() {
        let reply = r#"Here you go:
```json
{
  "name": "Ada Lovelace",
  "email": "ada@example.com",
  "phone": "555-0100",
  "summary": "Backend engineer.",
  "skills": ["Rust", "Go"],
  "experience": [{"title": "Engineer", "company": "Engines", "points": ["Shipped things"]}],
  "education": [{"degree": "BSc", "school": "London", "year": "2012"}]
}
```"#;
        let stub = StubGenerator::replying(reply);

        let resume = enhance_resume(&stub, "resume", "jd", "key", "gemini-2.5-flash")
            .await
            .unwrap();

        assert_eq!(resume.name, "Ada Lovelace");
        assert_eq!(resume.skills, vec!["Rust", "Go"]);
        assert_eq!(resume.experience[0].points, vec!["Shipped things"]);
        assert_eq!(resume.education[0].school, "London");
    }

    #[tokio::test]
    async fn test_enhance_resume_partial_reply_defaults_missing_fields() {
        let stub = StubGenerator::replying(r#"{"name": "Ada", "skills": ["Rust"]}"#);

        let resume = enhance_resume(&stub, "resume", "jd", "key", "gemini-2.5-flash")
            .await
            .unwrap();

        assert_eq!(resume.name, "Ada");
        assert!(resume.experience.is_empty());
        assert!(resume.education.is_empty());
        assert_eq!(resume.summary, "");
    }

    #[tokio::test]
    async fn test_enhance_resume_truncates_inputs() {
        let stub = StubGenerator::replying("{}");
        let resume = "r".repeat(RESUME_CHAR_LIMIT * 2);
        let jd = "j".repeat(JD_CHAR_LIMIT * 2);

        enhance_resume(&stub, &resume, &jd, "key", "gemini-2.5-flash")
            .await
            .unwrap();

        let prompt = stub.last_prompt();
        assert!(prompt.contains(&"r".repeat(RESUME_CHAR_LIMIT)));
        assert!(!prompt.contains(&"r".repeat(RESUME_CHAR_LIMIT + 1)));
        assert!(prompt.contains(&"j".repeat(JD_CHAR_LIMIT)));
        assert!(!prompt.contains(&"j".repeat(JD_CHAR_LIMIT + 1)));
    }

    #[tokio::test]
    async fn test_enhance_resume_propagates_exhausted_chain() {
        let stub = StubGenerator::failing(GenerationError::AllModelsFailed {
            last_error: "operation timed out".to_string(),
        });

        let err = enhance_resume(&stub, "resume", "jd", "key", "gemini-2.5-flash")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "All models failed. Last error: operation timed out"
        );
    }

    #[tokio::test]
    async fn test_enhance_resume_truncated_json_is_decode_error() {
        // Reply cut off mid-object: braces are found but the span is not valid JSON.
        let stub = StubGenerator::replying(r#"{"name": "Ada", "skills": ["Rust", } trailing"#);

        let err = enhance_resume(&stub, "resume", "jd", "key", "gemini-2.5-flash")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Decode(_)));
    }
}
