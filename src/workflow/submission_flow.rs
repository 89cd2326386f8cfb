//! 单个职位的申请流程 - 流程层
//!
//! 状态机：`NotStarted → FormStep(n) → Complete | Abandoned`
//!
//! 1. 打开职位页，按优先级寻找快速申请入口
//! 2. 每一步先看是否已出现完成标识，再填写表单，最后点击下一步
//! 3. 步数有硬上限；驱动异常一律收敛为 `Abandoned`

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::infrastructure::driver::{find_actionable, UiDriver};
use crate::infrastructure::selectors::{APPLY_ENTRY, COMPLETION, PROCEED};
use crate::models::{ApplicationStatus, CandidateProfile, ScoredCandidate};
use crate::utils::pacing::HumanPacing;
use crate::workflow::form_filler::FormFiller;
use crate::workflow::submission_ctx::SubmissionCtx;

/// 放弃原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbandonReason {
    /// 页面上没有可用的快速申请入口
    ApplyEntryNotFound,
    /// 第 n 步找不到下一步按钮
    StuckOnStep(usize),
    /// 超过最大步数
    MaxStepsExceeded,
    /// 驱动异常
    DriverFault(String),
}

impl fmt::Display for AbandonReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbandonReason::ApplyEntryNotFound => write!(f, "apply-entry-not-found"),
            AbandonReason::StuckOnStep(n) => write!(f, "stuck-on-step-{}", n),
            AbandonReason::MaxStepsExceeded => write!(f, "max-steps-exceeded"),
            AbandonReason::DriverFault(message) => write!(f, "driver-fault: {}", message),
        }
    }
}

/// 状态机状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    NotStarted,
    /// 表单第 n 步（从1开始）
    FormStep(usize),
    Complete,
    Abandoned(AbandonReason),
}

/// 申请结果，只有两种终态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Complete,
    Abandoned(AbandonReason),
}

impl SubmissionOutcome {
    /// 写入台账的状态
    pub fn ledger_status(&self) -> ApplicationStatus {
        match self {
            SubmissionOutcome::Complete => ApplicationStatus::Applied,
            SubmissionOutcome::Abandoned(AbandonReason::DriverFault(_)) => ApplicationStatus::Error,
            SubmissionOutcome::Abandoned(_) => ApplicationStatus::Failed,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, SubmissionOutcome::Complete)
    }
}

/// 申请流程
///
/// 不持有任何资源（page），驱动由调用方借给它。
pub struct SubmissionFlow {
    filler: FormFiller,
    pacing: HumanPacing,
    max_steps: usize,
    apply_timeout: Duration,
    proceed_timeout: Duration,
    completion_timeout: Duration,
}

impl SubmissionFlow {
    /// 创建新的申请流程
    pub fn new(config: &Config, profile: Arc<CandidateProfile>) -> Self {
        Self {
            filler: FormFiller::new(
                profile,
                config.pacing,
                Duration::from_millis(config.field_lookup_timeout_ms),
            ),
            pacing: config.pacing,
            max_steps: config.max_form_steps,
            apply_timeout: Duration::from_millis(config.apply_lookup_timeout_ms),
            proceed_timeout: Duration::from_millis(config.proceed_lookup_timeout_ms),
            completion_timeout: Duration::from_millis(config.completion_lookup_timeout_ms),
        }
    }

    /// 跑完整个状态机
    pub async fn run<D: UiDriver>(
        &self,
        driver: &D,
        candidate: &ScoredCandidate,
        ctx: &SubmissionCtx,
    ) -> SubmissionOutcome {
        info!("{} 📝 开始申请 {}", ctx, ctx.url);

        let mut state = SubmissionState::NotStarted;
        loop {
            state = match self.step(driver, candidate, ctx, state).await {
                Ok(next) => next,
                Err(e) => {
                    error!("{} ❌ 驱动异常: {:#}", ctx, e);
                    SubmissionState::Abandoned(AbandonReason::DriverFault(format!("{:#}", e)))
                }
            };

            match state {
                SubmissionState::Complete => {
                    info!("{} ✅ 申请已提交", ctx);
                    return SubmissionOutcome::Complete;
                }
                SubmissionState::Abandoned(reason) => {
                    warn!("{} ⚠️ 放弃申请: {}", ctx, reason);
                    return SubmissionOutcome::Abandoned(reason);
                }
                other => state = other,
            }
        }
    }

    /// 执行一次状态转移
    pub async fn step<D: UiDriver>(
        &self,
        driver: &D,
        candidate: &ScoredCandidate,
        ctx: &SubmissionCtx,
        state: SubmissionState,
    ) -> Result<SubmissionState> {
        let next = match state {
            SubmissionState::NotStarted => self.open(driver, candidate).await?,
            SubmissionState::FormStep(n) if n > self.max_steps => {
                // 最后一次点击可能就是提交，确认一次再放弃
                if self.is_complete(driver).await? {
                    SubmissionState::Complete
                } else {
                    SubmissionState::Abandoned(AbandonReason::MaxStepsExceeded)
                }
            }
            SubmissionState::FormStep(n) => self.form_step(driver, candidate, ctx, n).await?,
            terminal => terminal,
        };
        Ok(next)
    }

    async fn open<D: UiDriver>(&self, driver: &D, candidate: &ScoredCandidate) -> Result<SubmissionState> {
        driver.navigate(&candidate.posting.url).await?;
        self.pacing.page_load.wait().await;

        let Some(entry) = find_actionable(driver, &APPLY_ENTRY, self.apply_timeout).await? else {
            return Ok(SubmissionState::Abandoned(AbandonReason::ApplyEntryNotFound));
        };
        driver.click(&entry).await?;
        self.pacing.step.wait().await;
        Ok(SubmissionState::FormStep(1))
    }

    async fn form_step<D: UiDriver>(
        &self,
        driver: &D,
        candidate: &ScoredCandidate,
        ctx: &SubmissionCtx,
        n: usize,
    ) -> Result<SubmissionState> {
        debug!("{} 表单第 {}/{} 步", ctx, n, self.max_steps);

        if self.is_complete(driver).await? {
            return Ok(SubmissionState::Complete);
        }

        self.filler.fill(driver, &candidate.cover_letter, ctx).await;
        self.pacing.action.wait().await;

        let Some(proceed) = find_actionable(driver, &PROCEED, self.proceed_timeout).await? else {
            return Ok(SubmissionState::Abandoned(AbandonReason::StuckOnStep(n)));
        };
        driver.click(&proceed).await?;
        self.pacing.step.wait().await;
        Ok(SubmissionState::FormStep(n + 1))
    }

    async fn is_complete<D: UiDriver>(&self, driver: &D) -> Result<bool> {
        Ok(driver
            .find(COMPLETION.selectors, self.completion_timeout)
            .await?
            .is_some())
    }
}
