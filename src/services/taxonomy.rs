//! 技能分类表与文化/经验关键词
//!
//! 所有关键词都按 [`clean_text`] 的规则清洗后做整词匹配，
//! 因此 `r` 只会命中独立的单词 r，而不会命中 `research` 里的 r。

use crate::models::{ExperienceLevel, SkillMatch};
use crate::services::text::{clean_text, count_phrase, words};

/// (分类, 技能列表)，顺序即同频次时的优先顺序
const SKILL_CATEGORIES: &[(&str, &[&str])] = &[
    ("programming", &["python", "r"]),
    (
        "economics",
        &[
            "econometrics",
            "difference-in-differences",
            "did regression",
            "causal inference",
            "instrumental variables",
            "regression discontinuity",
            "panel data analysis",
            "time series analysis",
            "forecasting",
            "economic modeling",
            "stata",
            "eviews",
            "monetary policy",
            "fiscal policy",
            "macroeconomics",
            "microeconomics",
            "gdp analysis",
            "inflation modeling",
            "economic growth",
            "market analysis",
            "financial economics",
            "behavioral economics",
            "development economics",
            "international economics",
            "labor economics",
            "public economics",
            "game theory",
            "optimization",
            "cost-benefit analysis",
            "policy analysis",
            "economic research",
            "quantitative economics",
            "applied economics",
        ],
    ),
    (
        "statistics",
        &[
            "statistical analysis",
            "hypothesis testing",
            "p-values",
            "confidence intervals",
            "normal distribution",
            "regression analysis",
            "anova",
            "chi-square test",
            "t-test",
            "correlation analysis",
            "multivariate analysis",
            "bayesian statistics",
            "non-parametric statistics",
            "survival analysis",
            "factor analysis",
            "cluster analysis",
            "monte carlo simulation",
            "bootstrap methods",
            "statistical modeling",
            "experimental design",
            "a/b testing",
            "statistical inference",
            "descriptive statistics",
            "probability theory",
            "stochastic processes",
            "statistical software",
        ],
    ),
    (
        "finance",
        &[
            "financial modeling",
            "valuation",
            "dcf analysis",
            "financial statements",
            "ratio analysis",
            "risk management",
            "portfolio optimization",
            "derivatives",
            "fixed income",
            "equity analysis",
            "credit analysis",
            "financial planning",
            "budgeting",
            "forecasting",
            "variance analysis",
            "cost accounting",
            "management accounting",
            "financial reporting",
            "audit",
            "compliance",
            "bloomberg terminal",
            "reuters",
            "factset",
            "capital markets",
            "investment banking",
            "corporate finance",
            "quantitative finance",
        ],
    ),
    ("business_tools", &["excel", "tableau"]),
    (
        "macro_research_methodologies",
        &[
            "time series analysis",
            "vector autoregression",
            "var models",
            "structural equation modeling",
            "dynamic stochastic general equilibrium",
            "dsge models",
            "panel data econometrics",
            "cointegration analysis",
            "error correction models",
            "macroeconomic forecasting",
            "bayesian econometrics",
            "state space models",
            "kalman filter",
            "impulse response functions",
            "spectral analysis",
            "nonlinear time series",
            "hac estimators",
            "heteroskedasticity and autocorrelation consistent",
            "macroeconomic policy analysis",
            "macroeconomic modeling",
            "growth accounting",
            "business cycle analysis",
            "monetary policy analysis",
            "fiscal policy evaluation",
            "macroeconomic data analysis",
            "structural breaks",
            "panel cointegration",
            "unit root tests",
            "macroeconometrics",
            "granger causality",
            "johansen cointegration",
            "arch models",
            "garch models",
            "volatility modeling",
        ],
    ),
];

/// 经验级别，按判定顺序排列
const EXPERIENCE_PATTERNS: &[(ExperienceLevel, &[&str])] = &[
    (
        ExperienceLevel::Entry,
        &[
            "entry level",
            "junior",
            "graduate",
            "new grad",
            "0-2 years",
            "recent graduate",
        ],
    ),
    (
        ExperienceLevel::Mid,
        &[
            "mid level",
            "intermediate",
            "2-5 years",
            "3-7 years",
            "experienced",
        ],
    ),
    (
        ExperienceLevel::Senior,
        &[
            "senior",
            "lead",
            "principal",
            "5+ years",
            "7+ years",
            "expert",
            "advanced",
        ],
    ),
    (
        ExperienceLevel::Executive,
        &[
            "director",
            "manager",
            "head of",
            "vp",
            "vice president",
            "chief",
            "executive",
        ],
    ),
];

/// 公司文化关键词
pub const CULTURE_INDICATORS: [&str; 15] = [
    "collaborative",
    "innovative",
    "fast-paced",
    "dynamic",
    "flexible",
    "remote",
    "hybrid",
    "team player",
    "leadership",
    "growth mindset",
    "diversity",
    "inclusion",
    "work-life balance",
    "startup",
    "enterprise",
];

struct Entry {
    skill: &'static str,
    category: &'static str,
    pattern: Vec<String>,
}

/// 预清洗的技能分类表
pub struct SkillTaxonomy {
    entries: Vec<Entry>,
    experience: Vec<(ExperienceLevel, Vec<Vec<String>>)>,
    culture: Vec<(&'static str, Vec<String>)>,
}

impl Default for SkillTaxonomy {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillTaxonomy {
    pub fn new() -> Self {
        let mut entries: Vec<Entry> = Vec::new();
        for (category, skills) in SKILL_CATEGORIES {
            for skill in skills.iter() {
                // 同一技能出现在多个分类时，只保留第一个
                if entries.iter().any(|e| e.skill == *skill) {
                    continue;
                }
                entries.push(Entry {
                    skill,
                    category,
                    pattern: words(&clean_text(skill)),
                });
            }
        }

        let experience = EXPERIENCE_PATTERNS
            .iter()
            .map(|(level, patterns)| {
                let cleaned = patterns.iter().map(|p| words(&clean_text(p))).collect();
                (*level, cleaned)
            })
            .collect();

        let culture = CULTURE_INDICATORS
            .iter()
            .map(|c| (*c, words(&clean_text(c))))
            .collect();

        Self {
            entries,
            experience,
            culture,
        }
    }

    /// 技能总数（去重后）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 在已清洗文本中查找所有技能
    ///
    /// 结果按频次降序；同频次保持分类表中的顺序。
    pub fn find_skills(&self, tokens: &[String]) -> Vec<SkillMatch> {
        let mut found: Vec<SkillMatch> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let frequency = count_phrase(tokens, &entry.pattern);
                (frequency > 0).then(|| SkillMatch {
                    skill: entry.skill.to_string(),
                    category: entry.category.to_string(),
                    frequency,
                })
            })
            .collect();
        found.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        found
    }

    /// 第一个命中的经验级别，默认 entry
    pub fn experience_level(&self, tokens: &[String]) -> ExperienceLevel {
        self.experience
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| count_phrase(tokens, p) > 0))
            .map(|(level, _)| *level)
            .unwrap_or_default()
    }

    /// 命中的文化关键词，按关键词表顺序
    pub fn culture_keywords(&self, tokens: &[String]) -> Vec<String> {
        self.culture
            .iter()
            .filter(|(_, pattern)| count_phrase(tokens, pattern) > 0)
            .map(|(keyword, _)| keyword.to_string())
            .collect()
    }
}
