// All LLM prompts for the ATS scoring and rewrite services.
// Inputs are truncated by the callers before they reach these builders.

/// ATS scoring prompt. Requests an `AnalysisRecord`-shaped JSON object.
pub fn build_scoring_prompt(resume_text: &str, jd_text: &str) -> String {
    format!(
        r#"You are an ATS Scanner. Evaluate RESUME vs JD.
JD: {jd_text}
RESUME: {resume_text}
Output JSON: {{ "match_percentage": 50, "missing_keywords": ["a","b"], "reasoning": "x", "improvement_tips": ["y"] }}"#
    )
}

/// Resume rewrite prompt. Requests a `ResumeRecord`-shaped JSON object.
pub fn build_rewrite_prompt(resume_text: &str, jd_text: &str) -> String {
    format!(
        r#"Rewrite resume for JD. Output JSON.
JD: {jd_text}
RESUME: {resume_text}
Output JSON: {{ "name": "A", "email": "B", "phone": "C", "summary": "D", "skills": ["E"], "experience": [{{ "title": "T", "company": "C", "points": ["P"] }}], "education": [{{ "degree": "D", "school": "S", "year": "Y" }}] }}"#
    )
}
