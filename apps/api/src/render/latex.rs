//! LaTeX export: fills one of three fixed `.tex` templates.
//!
//! Scalar fields are placed with plain placeholder substitution; experience and
//! education are expanded into LaTeX structures first. All user text is escaped
//! before substitution, so the output compiles whatever the model wrote.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::resume::ResumeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LatexTemplate {
    #[default]
    Classic,
    Modern,
    Technical,
}

impl LatexTemplate {
    pub const ALL: [LatexTemplate; 3] = [
        LatexTemplate::Classic,
        LatexTemplate::Modern,
        LatexTemplate::Technical,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LatexTemplate::Classic => "Classic",
            LatexTemplate::Modern => "Modern",
            LatexTemplate::Technical => "Technical",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            LatexTemplate::Classic => CLASSIC_TEMPLATE,
            LatexTemplate::Modern => MODERN_TEMPLATE,
            LatexTemplate::Technical => TECHNICAL_TEMPLATE,
        }
    }
}

impl fmt::Display for LatexTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("unknown LaTeX template '{0}' (expected Classic, Modern or Technical)")]
pub struct UnknownTemplate(pub String);

impl FromStr for LatexTemplate {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LatexTemplate::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

/// Renders `resume` into the chosen template.
pub fn render_latex(template: LatexTemplate, resume: &ResumeRecord) -> String {
    let (first_name, last_name) = split_name(&resume.name);
    let skills = resume
        .skills
        .iter()
        .map(|s| escape_latex(s))
        .collect::<Vec<_>>()
        .join(", ");

    // Escaped text can never contain a placeholder (`_` becomes `\_`), so
    // substitution order does not matter.
    template
        .source()
        .replace("Var_FirstName", &escape_latex(first_name))
        .replace("Var_LastName", &escape_latex(last_name))
        .replace("Var_Name", &escape_latex(&resume.name))
        .replace("Var_Email", &escape_latex(&resume.email))
        .replace("Var_Phone", &escape_latex(&resume.phone))
        .replace("Var_Summary", &escape_latex(&resume.summary))
        .replace("Var_Experience", &experience_block(resume))
        .replace("Var_Education", &education_block(resume))
        .replace("Var_Skills", &skills)
}

/// Escapes the characters LaTeX treats specially in running text.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

fn experience_block(resume: &ResumeRecord) -> String {
    let mut block = String::new();
    for job in &resume.experience {
        block.push_str(&format!(
            "\\textbf{{{}}} at \\textit{{{}}} \\\\ \n",
            escape_latex(&job.title),
            escape_latex(&job.company)
        ));
        // An itemize without items does not compile.
        if !job.points.is_empty() {
            block.push_str("\\begin{itemize} \n");
            for point in &job.points {
                block.push_str(&format!("\\item {} \n", escape_latex(point)));
            }
            block.push_str("\\end{itemize} ");
        }
        block.push_str("\\vspace{2mm} \n");
    }
    block
}

fn education_block(resume: &ResumeRecord) -> String {
    resume
        .education
        .iter()
        .map(|entry| {
            format!(
                "\\textbf{{{}}} - {} ({}) \\\\ \n",
                escape_latex(&entry.degree),
                escape_latex(&entry.school),
                escape_latex(&entry.year)
            )
        })
        .collect()
}

/// Splits a full name for moderncv's `\name{first}{last}`.
fn split_name(name: &str) -> (&str, &str) {
    let name = name.trim();
    match name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (name, ""),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Templates
// ────────────────────────────────────────────────────────────────────────────

const CLASSIC_TEMPLATE: &str = r"
\documentclass[a4paper,10pt]{article}
\usepackage[left=1in,right=1in,top=1in,bottom=1in]{geometry}
\usepackage{titlesec}
\titleformat{\section}{\large\bfseries\uppercase}{}{0em}{}[\titlerule]
\begin{document}
\begin{center}
    {\Huge \textbf{Var_Name}} \\
    Var_Email | Var_Phone
\end{center}
\section{Summary}
Var_Summary
\section{Experience}
Var_Experience
\section{Education}
Var_Education
\section{Skills}
Var_Skills
\end{document}
";

const MODERN_TEMPLATE: &str = r"
\documentclass[11pt,a4paper,sans]{moderncv}
\moderncvstyle{banking}
\moderncvcolor{blue}
\usepackage[scale=0.75]{geometry}
\name{Var_FirstName}{Var_LastName}
\email{Var_Email}
\phone{Var_Phone}
\begin{document}
\makecvtitle
\section{Summary}
Var_Summary
\section{Experience}
Var_Experience
\section{Skills}
Var_Skills
\section{Education}
Var_Education
\end{document}
";

const TECHNICAL_TEMPLATE: &str = r"
\documentclass[a4paper,10pt]{article}
\usepackage{geometry}
\geometry{a4paper, margin=0.75in}
\begin{document}
\noindent{\Huge \bfseries Var_Name} \\
\rule{\textwidth}{1pt}
Var_Email \hfill Var_Phone \\
\section*{TECHNICAL SKILLS}
Var_Skills
\section*{EXPERIENCE}
Var_Experience
\end{document}
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::fixtures::sample_resume;
    use crate::models::resume::ExperienceEntry;

    #[test]
    fn test_template_from_str_is_case_insensitive() {
        assert_eq!("modern".parse::<LatexTemplate>().unwrap(), LatexTemplate::Modern);
        assert_eq!(" Technical ".parse::<LatexTemplate>().unwrap(), LatexTemplate::Technical);
        assert!("Fancy".parse::<LatexTemplate>().is_err());
    }

    #[test]
    fn test_classic_fills_every_placeholder() {
        let tex = render_latex(LatexTemplate::Classic, &sample_resume());

        assert!(!tex.contains("Var_"), "unfilled placeholder in:\n{tex}");
        assert!(tex.contains(r"{\Huge \textbf{Ada Lovelace}} \\"));
        assert!(tex.contains("ada@example.com | +44 20 7946 0000"));
        assert!(tex.contains("Rust, Kubernetes, PostgreSQL"));
        assert!(tex.contains(r"\textbf{BSc Mathematics} - University of London (2012) \\"));
    }

    #[test]
    fn test_experience_block_structure() {
        let tex = render_latex(LatexTemplate::Classic, &sample_resume());
        let expected = "\\textbf{Software Engineer} at \\textit{Difference Works} \\\\ \n\
                        \\begin{itemize} \n\
                        \\item Built the ingestion pipeline processing 2M events/day \n\
                        \\end{itemize} \\vspace{2mm} \n";
        assert!(tex.contains(expected), "missing block in:\n{tex}");
    }

    #[test]
    fn test_job_without_points_has_no_empty_itemize() {
        let mut resume = sample_resume();
        resume.experience = vec![ExperienceEntry {
            title: "Advisor".to_string(),
            company: "Board".to_string(),
            points: vec![],
        }];
        let tex = render_latex(LatexTemplate::Classic, &resume);
        assert!(!tex.contains(r"\begin{itemize}"));
        assert!(tex.contains("\\textbf{Advisor} at \\textit{Board} \\\\ \n\\vspace{2mm} \n"));
    }

    #[test]
    fn test_modern_splits_name() {
        let tex = render_latex(LatexTemplate::Modern, &sample_resume());
        assert!(tex.contains(r"\name{Ada}{Lovelace}"));
        assert!(!tex.contains("Var_"));
    }

    #[test]
    fn test_technical_omits_education_section() {
        let tex = render_latex(LatexTemplate::Technical, &sample_resume());
        assert!(tex.contains(r"\section*{TECHNICAL SKILLS}"));
        assert!(!tex.contains("University of London"));
        assert!(!tex.contains("Var_"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut resume = sample_resume();
        resume.summary = r"Grew revenue 40% & cut costs by $2M for R_D #1 {team} ~ ^ \".to_string();
        let tex = render_latex(LatexTemplate::Classic, &resume);
        assert!(tex.contains(
            r"Grew revenue 40\% \& cut costs by \$2M for R\_D \#1 \{team\} \textasciitilde{} \textasciicircum{} \textbackslash{}"
        ));
    }

    #[test]
    fn test_placeholder_text_in_user_data_is_not_resubstituted() {
        let mut resume = sample_resume();
        resume.summary = "Var_Email".to_string();
        let tex = render_latex(LatexTemplate::Classic, &resume);
        assert!(tex.contains(r"Var\_Email"));
    }

    #[test]
    fn test_empty_record_renders_every_template() {
        for template in LatexTemplate::ALL {
            let tex = render_latex(template, &ResumeRecord::default());
            assert!(tex.contains(r"\begin{document}"));
            assert!(tex.contains(r"\end{document}"));
            assert!(!tex.contains("Var_"), "{template} left a placeholder");
        }
    }

    #[test]
    fn test_render_latex_is_deterministic() {
        let resume = sample_resume();
        assert_eq!(
            render_latex(LatexTemplate::Modern, &resume),
            render_latex(LatexTemplate::Modern, &resume)
        );
    }
}
