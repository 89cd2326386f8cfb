//! 搜索结果导出
//!
//! 把本次搜到的职位写成 `discovered_jobs_%Y%m%d_%H%M%S.csv`，方便人工复核。
//! 导出失败不影响申请流程。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use crate::models::Posting;

/// 导出的一行
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    title: &'a str,
    company: &'a str,
    location: &'a str,
    job_type: &'a str,
    date_posted: &'a str,
    job_url: &'a str,
    description: &'a str,
    compensation: &'a str,
    easy_apply: &'a str,
    search_term: &'a str,
    search_location: &'a str,
    scraped_at: String,
}

impl<'a> ExportRow<'a> {
    fn new(posting: &'a Posting, scraped_at: &NaiveDateTime) -> Self {
        Self {
            title: &posting.title,
            company: &posting.company,
            location: &posting.location,
            job_type: posting.job_type.as_deref().unwrap_or_default(),
            date_posted: posting.date_posted.as_deref().unwrap_or_default(),
            job_url: &posting.url,
            description: &posting.description,
            compensation: posting.compensation.as_deref().unwrap_or_default(),
            easy_apply: match posting.easy_apply {
                Some(true) => "yes",
                Some(false) => "no",
                None => "",
            },
            search_term: posting.search_term.as_deref().unwrap_or_default(),
            search_location: posting.search_location.as_deref().unwrap_or_default(),
            scraped_at: scraped_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// 导出文件名
pub fn export_file_name(at: &NaiveDateTime) -> String {
    format!("discovered_jobs_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// 导出职位到 `dir`；没有职位时不生成文件，返回 None
pub fn export_postings(
    dir: &Path,
    postings: &[Posting],
    at: NaiveDateTime,
) -> Result<Option<PathBuf>> {
    if postings.is_empty() {
        return Ok(None);
    }

    std::fs::create_dir_all(dir).with_context(|| format!("创建导出目录失败: {}", dir.display()))?;
    let path = dir.join(export_file_name(&at));

    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("创建导出文件失败: {}", path.display()))?;
    for posting in postings {
        writer.serialize(ExportRow::new(posting, &at))?;
    }
    writer.flush()?;

    info!("💾 已导出 {} 个职位到 {}", postings.len(), path.display());
    Ok(Some(path))
}
