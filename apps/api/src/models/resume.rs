use serde::{Deserialize, Serialize};

use crate::models::{lenient_text, null_as_default};

/// The canonical rewritten resume consumed by every renderer.
///
/// Every field is optional on the wire; anything missing decodes to empty text or an
/// empty list, so renderers never have to special-case absent data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub school: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub year: String,
}

impl ResumeRecord {
    /// `email | phone`, the contact line shared by the PDF and Word renderers.
    pub fn contact_line(&self) -> String {
        format!("{} | {}", self.email, self.phone)
    }

    /// Skills as a single comma-separated line.
    pub fn skills_line(&self) -> String {
        self.skills.join(", ")
    }
}

impl ExperienceEntry {
    /// `title - company`, the bold heading line of a job.
    pub fn heading(&self) -> String {
        format!("{} - {}", self.title, self.company)
    }
}

impl EducationEntry {
    /// `degree - school (year)`.
    pub fn line(&self) -> String {
        format!("{} - {} ({})", self.degree, self.school, self.year)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn sample_resume() -> ResumeRecord {
        ResumeRecord {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+44 20 7946 0000".to_string(),
            summary: "Backend engineer with a decade of experience building distributed \
                      systems in Rust and Go, focused on reliability and developer tooling."
                .to_string(),
            skills: vec![
                "Rust".to_string(),
                "Kubernetes".to_string(),
                "PostgreSQL".to_string(),
            ],
            experience: vec![
                ExperienceEntry {
                    title: "Staff Engineer".to_string(),
                    company: "Analytical Engines Ltd".to_string(),
                    points: vec![
                        "Cut p99 latency of the billing API by 40% by redesigning the cache layer"
                            .to_string(),
                        "Led a team of 5 migrating 30 services to Kubernetes".to_string(),
                    ],
                },
                ExperienceEntry {
                    title: "Software Engineer".to_string(),
                    company: "Difference Works".to_string(),
                    points: vec!["Built the ingestion pipeline processing 2M events/day".to_string()],
                },
            ],
            education: vec![EducationEntry {
                degree: "BSc Mathematics".to_string(),
                school: "University of London".to_string(),
                year: "2012".to_string(),
            }],
        }
    }
}
