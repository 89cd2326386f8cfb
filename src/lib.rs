//! # Apply Orchestrator
//!
//! 自动发现、评分并投递职位申请的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `UiDriver` - 页面操作能力，`ChromiumDriver` 是唯一的 page owner
//! - `selectors` - 按优先级排列的选择器数据
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个职位
//! - `FitScorer` - 相似度、优先级、求职信
//! - `ApplicationLedger` - CSV 申请台账
//! - `JobSearch` / `ReachabilityProbe` - 外部 HTTP 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个职位"的完整申请流程
//! - `SubmissionCtx` - 上下文封装（序号 + 公司 + 职位）
//! - `SubmissionFlow` - 状态机（入口 → 逐步填写 → 提交）
//! - `LoginFlow` - 登录
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/controller` - 额度、发现、排序、逐个申请、取消
//! - `orchestrator/report` - 运行统计与报告
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::ChromiumLauncher;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromiumDriver, SessionLauncher, UiDriver};
pub use models::{CandidateProfile, Posting, ScoredCandidate};
pub use orchestrator::{OrchestrationController, SessionReport};
pub use services::{ApplicationLedger, FitScorer};
pub use workflow::{SubmissionCtx, SubmissionFlow, SubmissionOutcome};
