//! 表单填写
//!
//! 尽力而为：找不到字段、字段已有内容、驱动报错都只记日志，不影响流程。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::infrastructure::driver::UiDriver;
use crate::infrastructure::selectors::{
    SelectorSet, COVER_LETTER_FIELD, EMAIL_FIELD, FILE_INPUT, PHONE_FIELD, SELECT_INPUT,
    TEXT_INPUT,
};
use crate::models::CandidateProfile;
use crate::utils::pacing::HumanPacing;
use crate::workflow::submission_ctx::SubmissionCtx;

/// 求职信最多填写的字符数
pub const COVER_LETTER_LIMIT: usize = 1000;

/// 下拉框标签中出现这些词时选 "yes"
const YES_SELECT_KEYWORDS: [&str; 3] = ["authorized", "visa", "relocate"];

/// 单步填写结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    pub contact_fields: usize,
    pub cover_letter: bool,
    pub answered: usize,
    pub selections: usize,
    pub uploads: usize,
}

impl FillReport {
    pub fn total(&self) -> usize {
        self.contact_fields
            + usize::from(self.cover_letter)
            + self.answered
            + self.selections
            + self.uploads
    }
}

/// 表单填写器
pub struct FormFiller {
    profile: Arc<CandidateProfile>,
    pacing: HumanPacing,
    field_timeout: Duration,
}

impl FormFiller {
    pub fn new(profile: Arc<CandidateProfile>, pacing: HumanPacing, field_timeout: Duration) -> Self {
        Self {
            profile,
            pacing,
            field_timeout,
        }
    }

    /// 填写当前页面上认识的字段
    pub async fn fill<D: UiDriver>(
        &self,
        driver: &D,
        cover_letter: &str,
        ctx: &SubmissionCtx,
    ) -> FillReport {
        let mut report = FillReport::default();

        for (set, value) in [
            (PHONE_FIELD, self.profile.phone.as_str()),
            (EMAIL_FIELD, self.profile.email.as_str()),
        ] {
            match self.fill_field(driver, &set, value).await {
                Ok(true) => report.contact_fields += 1,
                Ok(false) => {}
                Err(e) => debug!("{} 填写 {} 出错: {}", ctx, set.name, e),
            }
        }

        let letter: String = cover_letter.chars().take(COVER_LETTER_LIMIT).collect();
        match self.fill_field(driver, &COVER_LETTER_FIELD, &letter).await {
            Ok(filled) => report.cover_letter = filled,
            Err(e) => debug!("{} 填写求职信出错: {}", ctx, e),
        }

        match self.answer_questions(driver).await {
            Ok(count) => report.answered = count,
            Err(e) => debug!("{} 回答问题出错: {}", ctx, e),
        }

        match self.answer_selects(driver).await {
            Ok(count) => report.selections = count,
            Err(e) => debug!("{} 处理下拉框出错: {}", ctx, e),
        }

        match self.upload_resume(driver).await {
            Ok(count) => report.uploads = count,
            Err(e) => debug!("{} 上传简历出错: {}", ctx, e),
        }

        if report.total() > 0 {
            info!("{} ✏️ 本页填写了 {} 项", ctx, report.total());
        }
        report
    }

    /// 找到空的字段就填上，已有内容的不覆盖
    async fn fill_field<D: UiDriver>(&self, driver: &D, set: &SelectorSet, value: &str) -> Result<bool> {
        if value.trim().is_empty() {
            return Ok(false);
        }
        let Some(element) = driver.find(set.selectors, self.field_timeout).await? else {
            return Ok(false);
        };
        if !driver.is_visible(&element).await? || !driver.value(&element).await?.is_empty() {
            return Ok(false);
        }
        driver.type_text(&element, value, &self.pacing.keystroke).await?;
        self.pacing.action.wait().await;
        Ok(true)
    }

    /// 文本问题按标签关键词套用标准回答
    async fn answer_questions<D: UiDriver>(&self, driver: &D) -> Result<usize> {
        let mut answered = 0;
        for element in driver.find_all(&TEXT_INPUT).await? {
            if !driver.is_visible(&element).await? || !driver.value(&element).await?.is_empty() {
                continue;
            }
            let label = driver.label(&element).await?;
            if let Some(answer) = self.profile.answers.answer_for(&label) {
                debug!("回答问题 '{}' -> {}", label, answer);
                driver.type_text(&element, answer, &self.pacing.keystroke).await?;
                self.pacing.action.wait().await;
                answered += 1;
            }
        }
        Ok(answered)
    }

    async fn answer_selects<D: UiDriver>(&self, driver: &D) -> Result<usize> {
        let mut selected = 0;
        for element in driver.find_all(&SELECT_INPUT).await? {
            let label = driver.label(&element).await?.to_lowercase();
            if !YES_SELECT_KEYWORDS.iter().any(|k| label.contains(k)) {
                continue;
            }
            if driver.select_option(&element, "yes").await? {
                selected += 1;
                self.pacing.action.wait().await;
            }
        }
        Ok(selected)
    }

    /// 可见的上传控件都传简历；资料里没有简历文件则跳过
    async fn upload_resume<D: UiDriver>(&self, driver: &D) -> Result<usize> {
        let Some(path) = self.profile.resume_path.as_deref() else {
            return Ok(0);
        };
        let mut uploads = 0;
        for element in driver.find_all(&FILE_INPUT).await? {
            if driver.is_visible(&element).await? {
                driver.upload_file(&element, path).await?;
                uploads += 1;
            }
        }
        Ok(uploads)
    }
}
