//! 申请上下文
//!
//! 封装"我正在处理第几个职位、是哪家公司"这一信息，只用于日志。

use std::fmt::Display;

use crate::models::ScoredCandidate;

/// 申请上下文
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 本次运行中的序号（从1开始）
    pub index: usize,

    /// 本次运行计划申请的总数
    pub total: usize,

    pub company: String,

    pub title: String,

    pub url: String,
}

impl SubmissionCtx {
    /// 创建新的申请上下文
    pub fn new(index: usize, total: usize, candidate: &ScoredCandidate) -> Self {
        Self {
            index,
            total,
            company: candidate.posting.company.clone(),
            title: candidate.posting.title.clone(),
            url: candidate.posting.url.clone(),
        }
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[申请 {}/{} {} - {}]",
            self.index, self.total, self.company, self.title
        )
    }
}
