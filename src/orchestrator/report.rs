//! 运行统计与报告

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::info;

use crate::services::LedgerStats;

/// 运行阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunPhase {
    Idle,
    PreflightCheck,
    Discovering,
    Scoring,
    Authenticating,
    Submitting,
    Reporting,
}

/// 运行结局
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum RunOutcome {
    /// 所有选中的职位都处理完毕
    Completed,
    /// 收到中断信号，处理完当前职位后停止
    Cancelled,
    /// 今日额度已用完
    QuotaExhausted {
        applied_today: usize,
        daily_limit: usize,
    },
    /// 没有搜到任何新职位
    NoPostings,
    /// 有职位但没有达到阈值的
    NoQualifiedPostings,
    /// 终止整次运行的错误
    Fatal { phase: RunPhase, reason: String },
}

impl RunOutcome {
    /// 正常结束（包括"今天没什么可投"）都算成功
    pub fn is_success(&self) -> bool {
        !matches!(self, RunOutcome::Fatal { .. })
    }

    pub fn reason(&self) -> String {
        match self {
            RunOutcome::Completed => "completed".to_string(),
            RunOutcome::Cancelled => "cancelled".to_string(),
            RunOutcome::QuotaExhausted {
                applied_today,
                daily_limit,
            } => format!("quota exhausted ({}/{})", applied_today, daily_limit),
            RunOutcome::NoPostings => "no new postings found".to_string(),
            RunOutcome::NoQualifiedPostings => "no postings above threshold".to_string(),
            RunOutcome::Fatal { phase, reason } => format!("{:?} failed: {}", phase, reason),
        }
    }
}

/// 搜索阶段的计数
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchStats {
    /// 发起的搜索调用次数
    pub total_searches: usize,
    /// 失败或超时的调用
    pub failed_searches: usize,
    /// 搜索接口返回的职位总数（去重、过滤前）
    pub total_jobs_found: usize,
    /// 去重、过滤后留下的职位
    pub jobs_after_filtering: usize,
    pub jobs_per_search: f64,
    /// 过滤后留下的百分比
    pub filter_efficiency: f64,
}

impl SearchStats {
    /// 记一次成功的搜索调用
    pub fn record(&mut self, found: usize, kept: usize) {
        self.total_searches += 1;
        self.total_jobs_found += found;
        self.jobs_after_filtering += kept;
        self.refresh();
    }

    /// 记一次失败或超时的搜索调用
    pub fn record_failure(&mut self) {
        self.total_searches += 1;
        self.failed_searches += 1;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.jobs_per_search =
            round1(self.total_jobs_found as f64 / self.total_searches.max(1) as f64);
        self.filter_efficiency = round1(
            self.jobs_after_filtering as f64 / self.total_jobs_found.max(1) as f64 * 100.0,
        );
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 本次运行的计数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub discovered: usize,
    pub analyzed: usize,
    pub attempted: usize,
    pub successful: usize,
    /// 流程走完但没有提交成功
    pub failed: usize,
    /// 驱动故障、超时、崩溃
    pub errors: usize,
    pub skipped_already_applied: usize,
    pub search: SearchStats,
    /// 搜索结果导出文件
    pub export_path: Option<PathBuf>,
    #[serde(with = "crate::models::record::ledger_timestamp")]
    pub start_time: NaiveDateTime,
}

impl SessionStats {
    pub fn new(start_time: NaiveDateTime) -> Self {
        Self {
            discovered: 0,
            analyzed: 0,
            attempted: 0,
            successful: 0,
            failed: 0,
            errors: 0,
            skipped_already_applied: 0,
            search: SearchStats::default(),
            export_path: None,
            start_time,
        }
    }

    pub fn start_now() -> Self {
        Self::new(Local::now().naive_local())
    }
}

/// 本次运行的申请结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationResults {
    pub attempted: usize,
    pub successful: usize,
    pub failed: usize,
    /// 百分比，保留一位小数
    pub success_rate: f64,
}

impl From<&SessionStats> for ApplicationResults {
    fn from(stats: &SessionStats) -> Self {
        let success_rate = if stats.attempted == 0 {
            0.0
        } else {
            round1(stats.successful as f64 / stats.attempted as f64 * 100.0)
        };
        Self {
            attempted: stats.attempted,
            successful: stats.successful,
            failed: stats.failed + stats.errors,
            success_rate,
        }
    }
}

/// 运行报告，`run` 的唯一返回值
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub success: bool,
    pub outcome: RunOutcome,
    pub reason: String,
    pub final_phase: RunPhase,
    pub duration_seconds: f64,
    pub stats: SessionStats,
    pub results: ApplicationResults,
    pub ledger_stats: LedgerStats,
}

impl SessionReport {
    pub fn new(
        outcome: RunOutcome,
        final_phase: RunPhase,
        duration: Duration,
        stats: SessionStats,
        ledger_stats: LedgerStats,
    ) -> Self {
        Self {
            success: outcome.is_success(),
            reason: outcome.reason(),
            outcome,
            final_phase,
            duration_seconds: duration.as_secs_f64(),
            results: ApplicationResults::from(&stats),
            stats,
            ledger_stats,
        }
    }

    /// 输出最终统计
    pub fn log(&self) {
        info!("\n{}", "=".repeat(60));
        info!("📊 本次运行统计");
        info!(
            "完成时间: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        info!("{}", "=".repeat(60));
        info!("🏁 结局: {}", self.reason);
        info!("⏱️ 耗时: {:.1} 秒", self.duration_seconds);
        info!(
            "🔍 搜索 {} 次（失败 {}），返回 {} 个职位，平均每次 {:.1} 个",
            self.stats.search.total_searches,
            self.stats.search.failed_searches,
            self.stats.search.total_jobs_found,
            self.stats.search.jobs_per_search
        );
        info!(
            "🔍 发现职位: {}（过滤后保留 {:.1}%）",
            self.stats.discovered, self.stats.search.filter_efficiency
        );
        if let Some(path) = &self.stats.export_path {
            info!("💾 搜索结果: {}", path.display());
        }
        info!("🧮 分析职位: {}", self.stats.analyzed);
        info!("⏭️ 已申请跳过: {}", self.stats.skipped_already_applied);
        info!(
            "✅ 成功: {}/{} ({:.1}%)",
            self.results.successful, self.results.attempted, self.results.success_rate
        );
        info!("❌ 失败: {}  💥 异常: {}", self.stats.failed, self.stats.errors);
        info!("{}", "─".repeat(60));
        info!(
            "📒 台账累计 {} 条，今日 {} 条，平均相似度 {:.3}，回复率 {:.1}%",
            self.ledger_stats.total,
            self.ledger_stats.today,
            self.ledger_stats.avg_similarity,
            self.ledger_stats.response_rate
        );
        for (i, (company, count)) in self.ledger_stats.top_companies.iter().enumerate() {
            info!("   {}. {} ({} 次)", i + 1, company, count);
        }
        info!("{}", "=".repeat(60));
    }
}
