// All LLM prompt constants for the agent, plus the shared context block
// builder that both the question generator and the resume synthesizer embed.

use crate::models::session::{ProfileInputs, QAPair};

/// System prompt for follow-up question generation — constrains the model to
/// one question line or the literal token NONE.
pub const QUESTION_SYSTEM: &str =
    "You are a resume-writing assistant gathering missing information. \
    Respond with EXACTLY ONE follow-up question on a single line, formatted \
    exactly as: - Q: <your question> \
    If the profile already contains enough information for a complete resume, \
    respond with the single word NONE instead. \
    Never output more than one question. Never add explanations.";

/// Question generation template. Replace `{profile_context}` before sending.
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Below is the information a user has provided to build a developer resume.

{profile_context}

Generate the single most valuable follow-up question to improve this resume.
Prefer asking over stopping: only answer NONE when another question would add
nothing. Remember the required format: one line starting with "- Q: ", or the
single word NONE."#;

/// System prompt for resume synthesis.
pub const RESUME_SYSTEM: &str =
    "You are a professional resume writer for software developers. \
    Write concise, specific resume drafts in lightweight markdown: # for \
    section headings, ## for subheadings, - for bullet items. \
    Use only the information provided. Never invent employers, dates, or \
    numbers.";

/// Resume synthesis template. Replace `{profile_context}` before sending.
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Below is the information a user has provided to build a developer resume,
including their answers to follow-up questions.

{profile_context}

Write a clean, complete resume draft with sections for experience, projects,
skills, and certifications. Keep it factual and grounded in the information
above."#;

/// Renders the shared context block: every profile field, then the recorded
/// follow-up exchanges.
pub(crate) fn profile_context(inputs: &ProfileInputs, answers: &[QAPair]) -> String {
    let mut context = String::from("[Profile]\n");
    context.push_str(&format!("- Email: {}\n", inputs.email));
    context.push_str(&format!("- Preferred job: {}\n", inputs.preferred_job));
    context.push_str(&format!("- Major type: {}\n", inputs.major_type.as_str()));
    context.push_str(&format!("- Company: {}\n", inputs.company_name));
    context.push_str(&format!("- Position: {}\n", inputs.position));
    context.push_str(&format!("- Work period: {} months\n", inputs.work_period));
    context.push_str(&format!(
        "- Certifications: {}\n",
        inputs.certification_count
    ));
    context.push_str(&format!("- Projects: {}\n", inputs.project_count));
    context.push_str(&format!(
        "- Additional experiences: {}\n",
        inputs.additional_experiences
    ));

    context.push_str("\n[Answers to follow-up questions]\n");
    if answers.is_empty() {
        context.push_str("- none yet\n");
    } else {
        for pair in answers {
            context.push_str(&format!("- {} → {}\n", pair.question, pair.answer));
        }
    }
    context
}
