use serde::{Deserialize, Serialize};

use super::posting::Posting;

/// 经验级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[default]
    Entry,
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Executive => "executive",
        }
    }
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 命中的技能
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub skill: String,
    pub category: String,
    /// 在描述中出现的次数（至少为 1）
    pub frequency: usize,
}

/// 从职位描述中提取出的要求
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobRequirements {
    /// 按频次降序，最多 15 个
    pub skills: Vec<SkillMatch>,
    pub experience_level: ExperienceLevel,
    pub culture_keywords: Vec<String>,
    pub key_phrases: Vec<String>,
    /// 0-1 之间
    pub complexity_score: f64,
}

/// 评分后的候选职位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub posting: Posting,
    /// 0-1，保留三位小数
    pub similarity_score: f64,
    pub priority_score: f64,
    pub requirements: JobRequirements,
    pub should_apply: bool,
    pub cover_letter: String,
    pub recommendations: Vec<String>,
}

impl ScoredCandidate {
    pub fn skills(&self) -> &[SkillMatch] {
        &self.requirements.skills
    }

    pub fn experience_level(&self) -> ExperienceLevel {
        self.requirements.experience_level
    }

    /// 技能快照，写入台账用
    pub fn skills_snapshot(&self) -> String {
        self.requirements
            .skills
            .iter()
            .map(|s| s.skill.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
