//! 候选人资料
//!
//! 从 TOML 文件加载，见 [`crate::models::loaders::load_profile`]。

use std::path::PathBuf;

use serde::Deserialize;

/// 候选人资料
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// 简历全文，用于相似度计算
    pub resume_text: String,
    /// 简历文件，表单出现上传控件时使用
    #[serde(default)]
    pub resume_path: Option<PathBuf>,
    /// 自定义求职信模板，支持 `{position}` `{company}` `{experience}` `{skills}` `{culture}` `{name}`
    #[serde(default)]
    pub cover_letter_template: Option<String>,
    #[serde(default)]
    pub answers: StandardAnswers,
}

/// 常见筛选问题的标准回答
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StandardAnswers {
    pub authorized: String,
    pub visa: String,
    pub relocate: String,
    pub notice: String,
    pub salary: String,
    pub experience: String,
}

impl Default for StandardAnswers {
    fn default() -> Self {
        Self {
            authorized: "Yes".to_string(),
            visa: "Yes".to_string(),
            relocate: "Yes".to_string(),
            notice: "2 weeks".to_string(),
            salary: "35000".to_string(),
            experience: "Yes".to_string(),
        }
    }
}

impl StandardAnswers {
    /// (关键词, 回答)，按匹配优先级排列
    pub fn pairs(&self) -> [(&'static str, &str); 6] {
        [
            ("authorized", self.authorized.as_str()),
            ("visa", self.visa.as_str()),
            ("relocate", self.relocate.as_str()),
            ("notice", self.notice.as_str()),
            ("salary", self.salary.as_str()),
            ("experience", self.experience.as_str()),
        ]
    }

    /// 根据问题标签挑选回答
    pub fn answer_for(&self, label: &str) -> Option<&str> {
        let label = label.to_lowercase();
        self.pairs()
            .into_iter()
            .find(|(keyword, _)| label.contains(keyword))
            .map(|(_, answer)| answer)
    }
}
