//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整次运行的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `controller` - 编排控制器
//! - 预检：配置、台账、今日额度、平台连通性
//! - 发现：关键词 × 地点搜索，调用之间随机停顿，去重
//! - 评分：跳过台账中已有的职位，过滤、排序、按剩余额度截断
//! - 申请：持有浏览器会话，逐个驱动 SubmissionFlow，结果写回台账
//!
//! ### `report` - 运行统计与报告
//!
//! ## 层次关系
//!
//! ```text
//! controller (处理 Vec<Posting>)
//!     ↓
//! workflow::SubmissionFlow (处理单个职位)
//!     ↓
//! services (能力层：scorer / ledger / search)
//!     ↓
//! infrastructure (基础设施：UiDriver)
//! ```

pub mod controller;
pub mod report;

// 重新导出主要类型
pub use controller::{rank_candidates, OrchestrationController};
pub use report::{
    ApplicationResults, RunOutcome, RunPhase, SearchStats, SessionReport, SessionStats,
};
