//! 求职信生成
//!
//! 模板占位符：`{position}` `{company}` `{experience}` `{skills}` `{culture}` `{name}`。
//! 模板渲染失败（未知占位符、括号未闭合）时退回通用求职信，不向上报错。

use tracing::warn;

use crate::models::{CandidateProfile, ExperienceLevel, JobRequirements, Posting};

/// 默认模板
pub const DEFAULT_TEMPLATE: &str = "Dear Hiring Manager,

I am writing to express my strong interest in the {position} role at {company}. {experience}

Your job posting particularly caught my attention because of the opportunity to work with {skills}. My background aligns well with your requirements, and I am excited about the possibility of contributing to {company}'s continued success.

{culture}

I would welcome the opportunity to discuss how my skills and enthusiasm can benefit your team. Thank you for considering my application.

Best regards,
{name}";

/// 模板渲染错误
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("未知占位符: {{{0}}}")]
    UnknownPlaceholder(String),
    #[error("占位符括号未闭合 (位置 {0})")]
    Unclosed(usize),
}

/// 渲染用字段
#[derive(Debug, Clone)]
pub struct LetterFields<'a> {
    pub position: &'a str,
    pub company: &'a str,
    pub experience: &'a str,
    pub skills: &'a str,
    pub culture: &'a str,
    pub name: &'a str,
}

impl LetterFields<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        match key {
            "position" => Some(self.position),
            "company" => Some(self.company),
            "experience" => Some(self.experience),
            "skills" => Some(self.skills),
            "culture" => Some(self.culture),
            "name" => Some(self.name),
            _ => None,
        }
    }
}

/// 渲染模板
pub fn render(template: &str, fields: &LetterFields<'_>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or(TemplateError::Unclosed(offset + open))?;
        let key = &after[..close];
        let value = fields
            .get(key.trim())
            .ok_or_else(|| TemplateError::UnknownPlaceholder(key.to_string()))?;
        out.push_str(value);

        let consumed = open + 1 + close + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}

/// 经验段落
pub fn experience_paragraph(level: ExperienceLevel) -> &'static str {
    match level {
        ExperienceLevel::Entry => "As a recent graduate with a strong foundation in technology and analytics, I am eager to apply my skills in a professional environment.",
        ExperienceLevel::Mid => "With several years of experience in data analysis and technology, I have developed strong skills in problem-solving and project execution.",
        ExperienceLevel::Senior => "As an experienced professional with a proven track record in leadership and technical excellence, I am excited about taking on new challenges.",
        ExperienceLevel::Executive => "With extensive leadership experience and a strategic mindset, I am well-positioned to drive organizational success.",
    }
}

fn culture_response(keyword: &str) -> Option<&'static str> {
    match keyword {
        "collaborative" => Some("I thrive in collaborative environments and enjoy working with cross-functional teams."),
        "innovative" => Some("I am passionate about innovation and bringing creative solutions to complex challenges."),
        "fast-paced" => Some("I excel in fast-paced environments and adapt quickly to changing priorities."),
        "remote" => Some("I have extensive experience working effectively in remote and distributed teams."),
        "growth mindset" => Some("I embrace continuous learning and am always seeking opportunities to grow professionally."),
        _ => None,
    }
}

/// 文化段落：取前两个有对应回应的关键词
pub fn culture_paragraph(keywords: &[String]) -> String {
    if keywords.is_empty() {
        return "I am particularly drawn to your company's commitment to innovation and excellence."
            .to_string();
    }
    let responses: Vec<&str> = keywords
        .iter()
        .filter_map(|k| culture_response(k))
        .take(2)
        .collect();
    if responses.is_empty() {
        "I am excited about the opportunity to contribute to your team's success and grow within your organization.".to_string()
    } else {
        responses.join(" ")
    }
}

/// 通用求职信
pub fn generic_letter(position: &str, company: &str, name: &str) -> String {
    let position = non_empty_or(position, "this position");
    let company = non_empty_or(company, "your company");
    format!(
        "Dear Hiring Manager,

I am writing to express my interest in the {position} role at {company}.
My background and skills align well with the requirements for this position.

I would welcome the opportunity to discuss how I can contribute to your team's success.

Best regards,
{name}"
    )
}

/// 为职位生成求职信
pub fn compose(
    posting: &Posting,
    requirements: &JobRequirements,
    profile: &CandidateProfile,
) -> String {
    let skills: Vec<&str> = requirements
        .skills
        .iter()
        .take(5)
        .map(|s| s.skill.as_str())
        .collect();
    let skills_text = if skills.is_empty() {
        "relevant technologies".to_string()
    } else {
        skills.join(", ")
    };
    let culture = culture_paragraph(&requirements.culture_keywords);

    let fields = LetterFields {
        position: non_empty_or(&posting.title, "this position"),
        company: non_empty_or(&posting.company, "the company"),
        experience: experience_paragraph(requirements.experience_level),
        skills: &skills_text,
        culture: &culture,
        name: &profile.name,
    };

    let template = profile
        .cover_letter_template
        .as_deref()
        .unwrap_or(DEFAULT_TEMPLATE);

    match render(template, &fields) {
        Ok(letter) => letter,
        Err(e) => {
            warn!(
                "⚠️ 求职信模板渲染失败 ({} - {}): {}，使用通用模板",
                posting.company, posting.title, e
            );
            generic_letter(&posting.title, &posting.company, &profile.name)
        }
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
