//! 职位（Posting）
//!
//! 职位的身份是规范化后的 URL：去掉查询串、锚点和末尾斜杠。
//! 同一职位带不同跟踪参数的链接会被视为同一条。

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// 搜索得到的职位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    /// 平台职位 ID（从 URL 中提取，提取不到时为规范化 URL 本身）
    pub id: String,
    /// 规范化 URL
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    /// 职位描述，可能为空
    pub description: String,
    pub job_type: Option<String>,
    pub compensation: Option<String>,
    /// 是否支持快速申请；未知时为 None
    pub easy_apply: Option<bool>,
    pub date_posted: Option<String>,
    /// 命中该职位的搜索关键词
    pub search_term: Option<String>,
    /// 命中该职位的搜索地点
    pub search_location: Option<String>,
}

impl Posting {
    /// 创建职位，URL 会被规范化
    pub fn new(
        url: &str,
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let url = canonical_url(url);
        Self {
            id: posting_id(&url),
            url,
            title: title.into(),
            company: company.into(),
            location: location.into(),
            description: description.into(),
            job_type: None,
            compensation: None,
            easy_apply: None,
            date_posted: None,
            search_term: None,
            search_location: None,
        }
    }

    pub fn with_easy_apply(mut self, easy_apply: bool) -> Self {
        self.easy_apply = Some(easy_apply);
        self
    }

    /// 公司 + 职位名的去重键（不区分大小写）
    pub fn identity_key(&self) -> (String, String) {
        (
            self.company.trim().to_lowercase(),
            self.title.trim().to_lowercase(),
        )
    }
}

/// 规范化职位 URL
pub fn canonical_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let end = trimmed
        .find(|c| c == '?' || c == '#')
        .unwrap_or(trimmed.len());
    trimmed[..end].trim_end_matches('/').to_string()
}

/// 从规范化 URL 中提取职位 ID
///
/// 识别 `/jobs/view/<数字>` 以及 `/jobs/view/<slug>-<数字>` 两种形式。
pub fn posting_id(canonical: &str) -> String {
    static JOB_ID: OnceLock<Option<Regex>> = OnceLock::new();
    let re = JOB_ID.get_or_init(|| Regex::new(r"/jobs/view/(?:[^/]*-)?(\d+)$").ok());

    re.as_ref()
        .and_then(|re| re.captures(canonical))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| canonical.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_url_strips_tracking() {
        assert_eq!(
            canonical_url(" https://www.linkedin.com/jobs/view/3812345678/?refId=abc&trk=x "),
            "https://www.linkedin.com/jobs/view/3812345678"
        );
        assert_eq!(
            canonical_url("https://example.com/jobs/42#apply"),
            "https://example.com/jobs/42"
        );
    }

    #[test]
    fn test_posting_id_extraction() {
        assert_eq!(
            posting_id("https://www.linkedin.com/jobs/view/3812345678"),
            "3812345678"
        );
        assert_eq!(
            posting_id("https://www.linkedin.com/jobs/view/economist-at-acme-3812345678"),
            "3812345678"
        );
        // 非标准链接退化为 URL 本身
        assert_eq!(
            posting_id("https://careers.acme.com/role/77"),
            "https://careers.acme.com/role/77"
        );
    }

    #[test]
    fn test_new_canonicalizes_url() {
        let p = Posting::new(
            "https://www.linkedin.com/jobs/view/123/?trk=1",
            "Economist",
            "Acme",
            "London",
            "",
        );
        assert_eq!(p.url, "https://www.linkedin.com/jobs/view/123");
        assert_eq!(p.id, "123");
    }

    #[test]
    fn test_identity_key_ignores_case() {
        let a = Posting::new("https://a/1", "Economist ", "ACME", "", "");
        let b = Posting::new("https://a/2", "economist", "Acme", "", "");
        assert_eq!(a.identity_key(), b.identity_key());
    }
}
