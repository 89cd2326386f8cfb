//! 编排控制器 - 编排层
//!
//! ## 职责
//!
//! 一次运行的全部调度：额度检查、职位发现、评分排序、台账去重、
//! 逐个申请、节奏控制、统计与取消。
//!
//! ## 阶段
//!
//! `Idle → PreflightCheck → Discovering → Scoring → Authenticating → Submitting → Reporting → Idle`
//!
//! 任何阶段结束都会走到 Reporting，`run` 总是返回一份 [`SessionReport`]。
//! 浏览器会话只在 Authenticating 到 Submitting 之间存在，无论怎么退出都只释放一次。

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use futures::FutureExt;
use tokio::time::{sleep, timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::driver::{SessionLauncher, UiDriver};
use crate::models::{ApplicationStatus, CandidateProfile, LedgerRecord, Posting, ScoredCandidate};
use crate::orchestrator::report::{RunOutcome, RunPhase, SearchStats, SessionReport, SessionStats};
use crate::services::{
    export_postings, ApplicationLedger, FitScorer, JobSearch, ReachabilityProbe, SearchQuery,
};
use crate::utils::logging::truncate_text;
use crate::utils::pacing::DelayRange;
use crate::workflow::{LoginFlow, SubmissionCtx, SubmissionFlow, SubmissionOutcome};

/// 编排控制器
pub struct OrchestrationController<L: SessionLauncher> {
    config: Config,
    profile: Arc<CandidateProfile>,
    scorer: FitScorer,
    search: Arc<dyn JobSearch>,
    probe: Arc<dyn ReachabilityProbe>,
    launcher: L,
    phase: RunPhase,
    stats: SessionStats,
    ledger: Option<ApplicationLedger>,
}

impl<L: SessionLauncher> OrchestrationController<L> {
    pub fn new(
        config: Config,
        profile: CandidateProfile,
        scorer: FitScorer,
        search: Arc<dyn JobSearch>,
        probe: Arc<dyn ReachabilityProbe>,
        launcher: L,
    ) -> Self {
        Self {
            config,
            profile: Arc::new(profile),
            scorer,
            search,
            probe,
            launcher,
            phase: RunPhase::Idle,
            stats: SessionStats::start_now(),
            ledger: None,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// 最近一次运行打开的台账
    pub fn ledger(&self) -> Option<&ApplicationLedger> {
        self.ledger.as_ref()
    }

    /// 执行一次完整运行
    pub async fn run(&mut self, cancel: &CancellationToken) -> SessionReport {
        let started = Instant::now();
        self.stats = SessionStats::start_now();
        self.ledger = None;

        let outcome = self.execute(cancel).await;
        let final_phase = self.phase;

        self.enter(RunPhase::Reporting);
        let ledger_stats = self
            .ledger
            .as_ref()
            .map(ApplicationLedger::stats)
            .unwrap_or_default();
        let report = SessionReport::new(
            outcome,
            final_phase,
            started.elapsed(),
            self.stats.clone(),
            ledger_stats,
        );
        report.log();

        self.enter(RunPhase::Idle);
        report
    }

    async fn execute(&mut self, cancel: &CancellationToken) -> RunOutcome {
        // ========== 预检 ==========
        self.enter(RunPhase::PreflightCheck);
        let remaining = match self.preflight().await {
            Ok(remaining) => remaining,
            Err(outcome) => return outcome,
        };

        // ========== 发现职位 ==========
        self.enter(RunPhase::Discovering);
        let (postings, search) = self.discover(cancel).await;
        self.stats.discovered = postings.len();
        self.stats.search = search;
        if self.config.export_discovered {
            match export_postings(&self.config.export_dir, &postings, Local::now().naive_local()) {
                Ok(path) => self.stats.export_path = path,
                Err(e) => warn!("⚠️ 导出搜索结果失败: {:#}", e),
            }
        }
        if cancel.is_cancelled() {
            return RunOutcome::Cancelled;
        }
        if postings.is_empty() {
            warn!("⚠️ 没有搜到任何职位");
            return RunOutcome::NoPostings;
        }
        info!("✓ 共发现 {} 个职位（已去重）", postings.len());

        // ========== 评分排序 ==========
        self.enter(RunPhase::Scoring);
        let Some(scored) = self.score_all(postings, cancel) else {
            return RunOutcome::Cancelled;
        };
        let selected = rank_candidates(scored, self.config.priority_threshold, remaining);
        if selected.is_empty() {
            warn!("⚠️ 没有达到阈值的职位");
            return RunOutcome::NoQualifiedPostings;
        }
        self.log_selected(&selected);

        // ========== 登录 + 申请 ==========
        self.enter(RunPhase::Authenticating);
        let driver = match self.launcher.launch().await {
            Ok(driver) => driver,
            Err(e) => {
                error!("❌ 启动浏览器会话失败: {:#}", e);
                return RunOutcome::Fatal {
                    phase: RunPhase::Authenticating,
                    reason: format!("{:#}", e),
                };
            }
        };

        let session = AssertUnwindSafe(self.drive_session(&driver, &selected, cancel))
            .catch_unwind()
            .await;

        if let Err(e) = driver.close().await {
            warn!("⚠️ 释放浏览器会话失败: {:#}", e);
        } else {
            debug!("浏览器会话已释放");
        }

        match session {
            Ok(outcome) => outcome,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// 预检，返回今天还能申请的数量
    async fn preflight(&mut self) -> Result<usize, RunOutcome> {
        if let Err(e) = self.config.validate() {
            error!("❌ 配置无效: {}", e);
            return Err(fatal(RunPhase::PreflightCheck, AppError::from(e)));
        }

        let ledger = ApplicationLedger::open(&self.config.ledger_path).map_err(|e| {
            error!("❌ 无法打开台账: {}", e);
            fatal(RunPhase::PreflightCheck, AppError::from(e))
        })?;
        let applied_today = ledger.count_today();
        self.ledger = Some(ledger);

        let daily_limit = self.config.daily_limit;
        if applied_today >= daily_limit {
            warn!("⚠️ 今日额度已用完 ({}/{})", applied_today, daily_limit);
            return Err(RunOutcome::QuotaExhausted {
                applied_today,
                daily_limit,
            });
        }

        let url = self.config.platform_url.clone();
        if !self.probe.is_reachable(&url).await {
            error!("❌ 目标平台不可达: {}", url);
            return Err(fatal(RunPhase::PreflightCheck, AppError::Unreachable { url }));
        }

        let remaining = daily_limit - applied_today;
        info!("✓ 预检通过，今日已申请 {}，剩余额度 {}", applied_today, remaining);
        Ok(remaining)
    }

    /// 关键词 × 地点逐个搜索，调用之间随机停顿
    ///
    /// 按规范化 URL 去重，再按 (公司, 职位) 去重，保留先出现的。
    async fn discover(&self, cancel: &CancellationToken) -> (Vec<Posting>, SearchStats) {
        let config = &self.config;
        let queries: Vec<SearchQuery> = config
            .keywords
            .iter()
            .flat_map(|keyword| {
                config.locations.iter().map(move |location| SearchQuery {
                    keyword: keyword.clone(),
                    location: location.clone(),
                    max_results: config.max_results_per_search,
                    recency_hours: config.recency_hours,
                })
            })
            .collect();
        let delay = DelayRange::seconds(
            self.config.discovery_delay_min_seconds,
            self.config.discovery_delay_max_seconds,
        );

        let mut postings = Vec::new();
        let mut stats = SearchStats::default();
        let mut seen_urls = HashSet::new();
        let mut seen_keys = HashSet::new();

        for (i, query) in queries.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("🛑 收到取消信号，停止搜索");
                break;
            }
            if i > 0 && !pause(delay.sample(), cancel).await {
                info!("🛑 收到取消信号，停止搜索");
                break;
            }

            info!(
                "🔍 [{}/{}] 搜索 '{}' @ {}",
                i + 1,
                queries.len(),
                query.keyword,
                query.location
            );
            let found = match timeout(self.config.search_timeout(), self.search.search(query)).await {
                Ok(Ok(found)) => found,
                Ok(Err(e)) => {
                    warn!("⚠️ 搜索 '{}' @ {} 失败: {:#}", query.keyword, query.location, e);
                    stats.record_failure();
                    continue;
                }
                Err(_) => {
                    warn!("⚠️ 搜索 '{}' @ {} 超时", query.keyword, query.location);
                    stats.record_failure();
                    continue;
                }
            };

            let returned = found.len();
            let mut added = 0;
            for posting in found {
                if self.config.easy_apply_only && posting.easy_apply == Some(false) {
                    debug!("跳过站外申请职位: {}", posting.url);
                    continue;
                }
                if !seen_urls.insert(posting.url.clone()) || !seen_keys.insert(posting.identity_key()) {
                    continue;
                }
                postings.push(posting);
                added += 1;
            }
            stats.record(returned, added);
            info!("✓ 返回 {} 个，新增 {} 个职位", returned, added);
        }

        (postings, stats)
    }

    /// 评分；取消时返回 None
    fn score_all(
        &mut self,
        postings: Vec<Posting>,
        cancel: &CancellationToken,
    ) -> Option<Vec<ScoredCandidate>> {
        let mut scored = Vec::with_capacity(postings.len());
        for posting in postings {
            if cancel.is_cancelled() {
                info!("🛑 收到取消信号，停止评分");
                return None;
            }
            if self.ledger.as_ref().is_some_and(|l| l.exists(&posting.url)) {
                debug!("已在台账中，跳过: {}", posting.url);
                self.stats.skipped_already_applied += 1;
                continue;
            }
            scored.push(self.scorer.score(&posting, &self.profile));
            self.stats.analyzed += 1;
        }
        let qualified = scored.iter().filter(|c| c.should_apply).count();
        info!(
            "🧮 评分完成: {} 个，相似度 ≥ {} 的 {} 个，台账中已有 {} 个",
            self.stats.analyzed,
            self.scorer.similarity_threshold(),
            qualified,
            self.stats.skipped_already_applied
        );
        Some(scored)
    }

    /// 登录后逐个申请
    async fn drive_session(
        &mut self,
        driver: &L::Driver,
        selected: &[ScoredCandidate],
        cancel: &CancellationToken,
    ) -> RunOutcome {
        let login = LoginFlow::new(&self.config);
        if let Err(e) = login.authenticate(driver).await {
            error!("❌ 登录失败: {}", e);
            return fatal(RunPhase::Authenticating, AppError::from(e));
        }

        self.enter(RunPhase::Submitting);
        let flow = SubmissionFlow::new(&self.config, Arc::clone(&self.profile));
        let total = selected.len();

        for (i, candidate) in selected.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("🛑 收到取消信号，已处理 {}/{}", i, total);
                return RunOutcome::Cancelled;
            }

            let ctx = SubmissionCtx::new(i + 1, total, candidate);
            self.stats.attempted += 1;
            let (status, note) = self.submit_one(&flow, driver, candidate, &ctx).await;
            match status {
                ApplicationStatus::Applied => self.stats.successful += 1,
                ApplicationStatus::Failed => self.stats.failed += 1,
                ApplicationStatus::Error => self.stats.errors += 1,
            }

            let mut record = LedgerRecord::from_candidate(
                candidate,
                status,
                Local::now().naive_local(),
                &self.config.platform_name,
            );
            record.notes = note;
            let Some(ledger) = self.ledger.as_mut() else {
                return RunOutcome::Fatal {
                    phase: RunPhase::Submitting,
                    reason: "ledger not open".to_string(),
                };
            };
            if let Err(e) = ledger.append(record) {
                error!("{} ❌ 写入台账失败: {}", ctx, e);
                return fatal(RunPhase::Submitting, AppError::from(e));
            }

            if i + 1 < total {
                let delay = self.config.inter_application_delay();
                debug!("等待 {:?} 后继续", delay);
                pause(delay, cancel).await;
            }
        }

        RunOutcome::Completed
    }

    /// 申请一个职位，崩溃和超时都记为 Error
    async fn submit_one(
        &self,
        flow: &SubmissionFlow,
        driver: &L::Driver,
        candidate: &ScoredCandidate,
        ctx: &SubmissionCtx,
    ) -> (ApplicationStatus, String) {
        let attempt = AssertUnwindSafe(flow.run(driver, candidate, ctx)).catch_unwind();
        match timeout(self.config.submission_timeout(), attempt).await {
            Ok(Ok(outcome)) => {
                let note = match &outcome {
                    SubmissionOutcome::Complete => String::new(),
                    SubmissionOutcome::Abandoned(reason) => reason.to_string(),
                };
                (outcome.ledger_status(), note)
            }
            Ok(Err(panic)) => {
                let message = panic_message(panic.as_ref());
                error!("{} 💥 申请过程崩溃: {}", ctx, message);
                (ApplicationStatus::Error, format!("panic: {}", message))
            }
            Err(_) => {
                error!("{} ⏰ 申请超时", ctx);
                (ApplicationStatus::Error, "timeout".to_string())
            }
        }
    }

    fn enter(&mut self, phase: RunPhase) {
        debug!("阶段 {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn log_selected(&self, selected: &[ScoredCandidate]) {
        info!("🎯 选中 {} 个职位:", selected.len());
        for (i, c) in selected.iter().enumerate() {
            info!(
                "  {}. {} - {} (相似度 {:.3}, 优先级 {:.3})",
                i + 1,
                c.posting.company,
                truncate_text(&c.posting.title, 60),
                c.similarity_score,
                c.priority_score
            );
        }
    }
}

/// 过滤、排序、截断
///
/// 保留 `should_apply` 且优先级高于阈值的职位，按优先级稳定降序，最多 `remaining` 个。
pub fn rank_candidates(
    scored: Vec<ScoredCandidate>,
    priority_threshold: f64,
    remaining: usize,
) -> Vec<ScoredCandidate> {
    let mut selected: Vec<ScoredCandidate> = scored
        .into_iter()
        .filter(|c| c.should_apply && c.priority_score > priority_threshold)
        .collect();
    selected.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
    selected.truncate(remaining);
    selected
}

/// 等待一段时间；被取消时提前返回 false
async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    if duration.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = sleep(duration) => true,
    }
}

fn fatal(phase: RunPhase, error: AppError) -> RunOutcome {
    RunOutcome::Fatal {
        phase,
        reason: error.to_string(),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
