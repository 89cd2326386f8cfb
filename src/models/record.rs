//! 台账记录
//!
//! 一行 CSV 对应一次申请尝试。字段顺序即列顺序，见 [`LEDGER_COLUMNS`]。

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::candidate::ScoredCandidate;
use crate::utils::truncate_text;

/// 台账列名，顺序与 [`LedgerRecord`] 字段一致
pub const LEDGER_COLUMNS: [&str; 16] = [
    "timestamp",
    "company",
    "title",
    "location",
    "url",
    "similarity_score",
    "status",
    "platform",
    "job_type",
    "compensation",
    "description_snippet",
    "skills_snapshot",
    "notes",
    "follow_up_date",
    "response_received",
    "interview_scheduled",
];

/// 申请结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    /// 已完成提交
    Applied,
    /// 流程正常结束但未完成提交（找不到入口、卡在某一步等）
    Failed,
    /// 驱动故障、超时或意外崩溃
    Error,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Failed => "Failed",
            ApplicationStatus::Error => "Error",
        }
    }
}

/// Yes / No 列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

/// 台账中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    #[serde(with = "ledger_timestamp")]
    pub timestamp: NaiveDateTime,
    pub company: String,
    pub title: String,
    pub location: String,
    pub url: String,
    pub similarity_score: f64,
    pub status: ApplicationStatus,
    pub platform: String,
    pub job_type: String,
    pub compensation: String,
    pub description_snippet: String,
    pub skills_snapshot: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub follow_up_date: String,
    #[serde(default)]
    pub response_received: YesNo,
    #[serde(default)]
    pub interview_scheduled: YesNo,
}

impl LedgerRecord {
    /// 由评分结果生成记录
    pub fn from_candidate(
        candidate: &ScoredCandidate,
        status: ApplicationStatus,
        timestamp: NaiveDateTime,
        platform: &str,
    ) -> Self {
        let posting = &candidate.posting;
        Self {
            timestamp,
            company: posting.company.clone(),
            title: posting.title.clone(),
            location: posting.location.clone(),
            url: posting.url.clone(),
            similarity_score: candidate.similarity_score,
            status,
            platform: platform.to_string(),
            job_type: posting
                .job_type
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            compensation: posting
                .compensation
                .clone()
                .unwrap_or_else(|| "Not specified".to_string()),
            description_snippet: truncate_text(&posting.description, 200),
            skills_snapshot: candidate.skills_snapshot(),
            notes: String::new(),
            follow_up_date: String::new(),
            response_received: YesNo::No,
            interview_scheduled: YesNo::No,
        }
    }
}

/// 时间戳格式 `%Y-%m-%d %H:%M:%S`（本地时间）
pub mod ledger_timestamp {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}
