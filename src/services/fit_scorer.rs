//! 职位匹配评分 - 业务能力层
//!
//! 纯计算，不做 I/O：同样的职位与资料永远得到同样的结果。

use tracing::debug;

use crate::models::{CandidateProfile, ExperienceLevel, JobRequirements, Posting, ScoredCandidate};
use crate::services::cover_letter;
use crate::services::taxonomy::SkillTaxonomy;
use crate::services::text::{clean_text, round3, words, TextSimilarity, TfIdfCosine, TfIdfSpace};

/// 最多保留的技能数
pub const MAX_SKILLS: usize = 15;
/// 最多保留的关键短语数
pub const MAX_KEY_PHRASES: usize = 10;

/// 职位评分器
pub struct FitScorer {
    taxonomy: SkillTaxonomy,
    similarity: Box<dyn TextSimilarity>,
    similarity_threshold: f64,
}

impl FitScorer {
    /// 使用 TF-IDF 余弦相似度创建评分器
    pub fn new(similarity_threshold: f64) -> Self {
        Self::with_similarity(similarity_threshold, Box::new(TfIdfCosine))
    }

    /// 使用自定义相似度度量创建评分器
    pub fn with_similarity(similarity_threshold: f64, similarity: Box<dyn TextSimilarity>) -> Self {
        Self {
            taxonomy: SkillTaxonomy::new(),
            similarity,
            similarity_threshold,
        }
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// 为职位评分
    pub fn score(&self, posting: &Posting, profile: &CandidateProfile) -> ScoredCandidate {
        let requirements = self.extract_requirements(&posting.description, &profile.resume_text);

        let similarity_score = if clean_text(&posting.description).is_empty() {
            0.0
        } else {
            let raw = self
                .similarity
                .similarity(&profile.resume_text, &posting.description);
            if raw.is_finite() {
                round3(raw.clamp(0.0, 1.0))
            } else {
                0.0
            }
        };

        let priority_score = priority_score(similarity_score, &requirements);
        let cover_letter = cover_letter::compose(posting, &requirements, profile);
        let recommendations = recommendations(similarity_score, &requirements);

        debug!(
            "评分完成 {} - {}: 相似度 {:.3}, 优先级 {:.3}",
            posting.company, posting.title, similarity_score, priority_score
        );

        ScoredCandidate {
            posting: posting.clone(),
            similarity_score,
            priority_score,
            should_apply: similarity_score >= self.similarity_threshold,
            requirements,
            cover_letter,
            recommendations,
        }
    }

    /// 从职位描述中提取要求
    ///
    /// 描述为空或清洗后为空时返回默认值（无技能、entry 级别）。
    pub fn extract_requirements(&self, description: &str, profile_text: &str) -> JobRequirements {
        let clean = clean_text(description);
        if clean.is_empty() {
            return JobRequirements::default();
        }
        let tokens = words(&clean);

        let mut skills = self.taxonomy.find_skills(&tokens);
        let technical_terms = skills.len();
        skills.truncate(MAX_SKILLS);

        let key_phrases = TfIdfSpace::build(&[clean.as_str(), profile_text]).top_terms(
            0,
            MAX_KEY_PHRASES,
            0.1,
        );

        JobRequirements {
            skills,
            experience_level: self.taxonomy.experience_level(&tokens),
            culture_keywords: self.taxonomy.culture_keywords(&tokens),
            key_phrases,
            complexity_score: complexity_score(technical_terms, tokens.len()),
        }
    }
}

/// 优先级 = 相似度 + 技能加成 + 经验加成 + 文化加成，截断到 [0, 1]
pub fn priority_score(similarity: f64, requirements: &JobRequirements) -> f64 {
    let skill_boost = (requirements.skills.len() as f64 * 0.02).min(0.2);
    let experience_boost = match requirements.experience_level {
        ExperienceLevel::Entry | ExperienceLevel::Mid => 0.1,
        ExperienceLevel::Senior | ExperienceLevel::Executive => 0.05,
    };
    let culture_boost = requirements.culture_keywords.len() as f64 * 0.01;

    round3(similarity + skill_boost + experience_boost + culture_boost).clamp(0.0, 1.0)
}

/// 复杂度：每百词命中的技术词数，上限 1
pub fn complexity_score(technical_terms: usize, word_count: usize) -> f64 {
    let per_hundred = (word_count as f64 / 100.0).max(1.0);
    round3((technical_terms as f64 / per_hundred).min(1.0))
}

/// 申请建议
pub fn recommendations(similarity: f64, requirements: &JobRequirements) -> Vec<String> {
    let mut out = Vec::new();

    if similarity < 0.3 {
        out.push("Consider focusing on positions that better match your current skill set");
    } else if similarity < 0.6 {
        out.push("Good potential match - emphasize transferable skills in your application");
    } else {
        out.push("Excellent match - strong candidate for this position");
    }

    if requirements.skills.len() > 10 {
        out.push("This role requires diverse technical skills - highlight your adaptability");
    }

    match requirements.experience_level {
        ExperienceLevel::Senior if similarity > 0.7 => {
            out.push("Consider emphasizing leadership and mentoring experience")
        }
        ExperienceLevel::Entry => out.push("Focus on education, projects, and eagerness to learn"),
        _ => {}
    }

    out.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkillMatch;

    struct Fixed(f64);

    impl TextSimilarity for Fixed {
        fn similarity(&self, _: &str, _: &str) -> f64 {
            self.0
        }
    }

    fn profile() -> CandidateProfile {
        CandidateProfile {
            name: "Alex Morgan".to_string(),
            email: "alex@example.com".to_string(),
            phone: "07700 900123".to_string(),
            resume_text: "Economist with econometrics, Stata, R and Python. \
                          Macroeconomic forecasting and policy analysis research."
                .to_string(),
            resume_path: None,
            cover_letter_template: None,
            answers: Default::default(),
        }
    }

    fn posting(description: &str) -> Posting {
        Posting::new(
            "https://www.linkedin.com/jobs/view/101",
            "Economist",
            "Acme Analytics",
            "London",
            description,
        )
    }

    fn requirements(skills: usize, level: ExperienceLevel, culture: usize) -> JobRequirements {
        JobRequirements {
            skills: (0..skills)
                .map(|i| SkillMatch {
                    skill: format!("skill{}", i),
                    category: "economics".to_string(),
                    frequency: 1,
                })
                .collect(),
            experience_level: level,
            culture_keywords: (0..culture).map(|i| format!("c{}", i)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_description_falls_back() {
        let scorer = FitScorer::new(0.5);
        for description in ["", "   ", "!!! ---"] {
            let scored = scorer.score(&posting(description), &profile());
            assert_eq!(scored.similarity_score, 0.0);
            assert!(scored.skills().is_empty());
            assert_eq!(scored.experience_level(), ExperienceLevel::Entry);
            assert!(!scored.should_apply);
            assert!(scored.cover_letter.contains("Economist role at Acme Analytics"));
        }
    }

    #[test]
    fn test_score_is_deterministic() {
        let scorer = FitScorer::new(0.1);
        let p = posting(
            "Junior Economist: econometrics, Stata and forecasting. \
             Collaborative, remote-friendly research team.",
        );
        let first = scorer.score(&p, &profile());
        let second = scorer.score(&p, &profile());
        assert_eq!(first, second);
        assert!(first.similarity_score > 0.0 && first.similarity_score <= 1.0);
        assert_eq!(first.experience_level(), ExperienceLevel::Entry);
        assert_eq!(
            first.requirements.culture_keywords,
            vec!["collaborative", "remote"]
        );
    }

    #[test]
    fn test_priority_formula() {
        // 0.5 + 3*0.02 + 0.1 + 2*0.01
        let r = requirements(3, ExperienceLevel::Mid, 2);
        assert_eq!(priority_score(0.5, &r), 0.68);
        // 技能加成封顶 0.2，senior 只有 0.05
        let r = requirements(14, ExperienceLevel::Senior, 0);
        assert_eq!(priority_score(0.5, &r), 0.75);
        // 截断到 1
        let r = requirements(15, ExperienceLevel::Entry, 15);
        assert_eq!(priority_score(0.95, &r), 1.0);
    }

    #[test]
    fn test_priority_monotonic_in_similarity() {
        let r = requirements(4, ExperienceLevel::Executive, 1);
        let mut previous = f64::MIN;
        for step in 0..=100 {
            let similarity = step as f64 / 100.0;
            let p = priority_score(similarity, &r);
            assert!(p >= previous, "{} < {} at {}", p, previous, similarity);
            assert!((0.0..=1.0).contains(&p));
            previous = p;
        }
    }

    #[test]
    fn test_should_apply_uses_threshold_inclusively() {
        let scorer = FitScorer::with_similarity(0.6, Box::new(Fixed(0.6)));
        assert!(scorer.score(&posting("Economist"), &profile()).should_apply);
        let scorer = FitScorer::with_similarity(0.6, Box::new(Fixed(0.5999)));
        let scored = scorer.score(&posting("Economist"), &profile());
        // 0.5999 四舍五入到 0.6
        assert_eq!(scored.similarity_score, 0.6);
        let scorer = FitScorer::with_similarity(0.6, Box::new(Fixed(0.59)));
        assert!(!scorer.score(&posting("Economist"), &profile()).should_apply);
    }

    #[test]
    fn test_out_of_range_similarity_is_clamped() {
        let scorer = FitScorer::with_similarity(0.5, Box::new(Fixed(1.7)));
        assert_eq!(scorer.score(&posting("Economist"), &profile()).similarity_score, 1.0);
        let scorer = FitScorer::with_similarity(0.5, Box::new(Fixed(f64::NAN)));
        assert_eq!(scorer.score(&posting("Economist"), &profile()).similarity_score, 0.0);
    }

    #[test]
    fn test_skills_truncated_to_top_fifteen() {
        let many = "python r econometrics stata eviews forecasting macroeconomics microeconomics \
                    valuation derivatives audit compliance reuters factset excel tableau anova \
                    optimization budgeting macroeconometrics python";
        let scorer = FitScorer::new(0.5);
        let scored = scorer.score(&posting(many), &profile());
        assert_eq!(scored.skills().len(), MAX_SKILLS);
        assert_eq!(scored.skills()[0].skill, "python");
        assert_eq!(scored.skills()[0].frequency, 2);
        assert_eq!(scored.requirements.complexity_score, 1.0);
    }

    #[test]
    fn test_recommendations() {
        let r = requirements(11, ExperienceLevel::Senior, 0);
        assert_eq!(
            recommendations(0.8, &r),
            vec![
                "Excellent match - strong candidate for this position",
                "This role requires diverse technical skills - highlight your adaptability",
                "Consider emphasizing leadership and mentoring experience",
            ]
        );
        let r = requirements(0, ExperienceLevel::Entry, 0);
        assert_eq!(recommendations(0.2, &r).len(), 2);
    }

    #[test]
    fn test_complexity_score() {
        assert_eq!(complexity_score(0, 50), 0.0);
        assert_eq!(complexity_score(1, 400), 0.25);
        assert_eq!(complexity_score(5, 20), 1.0);
    }
}
