//! 申请台账 - 业务能力层
//!
//! CSV 文件，一行一次申请尝试。内存中保留全部记录，每次追加都整体重写：
//! 先写同目录临时文件，再原子改名覆盖，任何时刻磁盘上的台账都是完整的。
//! 不支持多进程同时写入。

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::LedgerError;
use crate::models::{canonical_url, ApplicationStatus, LedgerRecord, YesNo, LEDGER_COLUMNS};

/// 台账汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerStats {
    pub total: usize,
    pub today: usize,
    pub avg_similarity: f64,
    /// 申请次数最多的公司，最多 5 个
    pub top_companies: Vec<(String, usize)>,
    /// 收到回复的百分比
    pub response_rate: f64,
}

/// 申请台账
#[derive(Debug)]
pub struct ApplicationLedger {
    path: PathBuf,
    records: Vec<LedgerRecord>,
}

impl ApplicationLedger {
    /// 打开台账
    ///
    /// 文件不存在时创建（只含表头）；空文件视为没有记录；内容损坏返回错误。
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let ledger = Self {
                path,
                records: Vec::new(),
            };
            if let Some(parent) = ledger.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| LedgerError::io(parent, e))?;
            }
            ledger.persist()?;
            info!("📒 已创建新的申请台账: {}", ledger.path.display());
            return Ok(ledger);
        }

        let records = read_records(&path)?;
        info!(
            "📒 已加载申请台账: {} ({} 条记录)",
            path.display(),
            records.len()
        );
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    /// 是否有任意状态的记录
    pub fn exists(&self, url: &str) -> bool {
        let url = canonical_url(url);
        self.records.iter().any(|r| canonical_url(&r.url) == url)
    }

    /// 是否已成功申请过
    pub fn has_applied(&self, url: &str) -> bool {
        let url = canonical_url(url);
        self.records
            .iter()
            .any(|r| r.status == ApplicationStatus::Applied && canonical_url(&r.url) == url)
    }

    /// 追加一条记录并落盘
    ///
    /// 写盘失败时内存中的记录也会回滚，保持与磁盘一致。
    pub fn append(&mut self, record: LedgerRecord) -> Result<(), LedgerError> {
        debug!(
            "写入台账: {} - {} [{}]",
            record.company,
            record.title,
            record.status.as_str()
        );
        self.records.push(record);
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }
        Ok(())
    }

    /// 今天（本地时间）的记录数
    pub fn count_today(&self) -> usize {
        self.count_on(Local::now().date_naive())
    }

    /// 指定日期的记录数
    pub fn count_on(&self, date: NaiveDate) -> usize {
        self.records
            .iter()
            .filter(|r| r.timestamp.date() == date)
            .count()
    }

    /// 汇总统计
    pub fn stats(&self) -> LedgerStats {
        let total = self.records.len();
        if total == 0 {
            return LedgerStats::default();
        }

        let avg_similarity =
            self.records.iter().map(|r| r.similarity_score).sum::<f64>() / total as f64;

        // 按首次出现顺序计数，保证同次数时结果稳定
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for r in &self.records {
            let entry = counts.entry(r.company.as_str()).or_insert(0);
            if *entry == 0 {
                order.push(r.company.as_str());
            }
            *entry += 1;
        }
        let mut top_companies: Vec<(String, usize)> = order
            .into_iter()
            .map(|c| (c.to_string(), counts.get(c).copied().unwrap_or(0)))
            .collect();
        top_companies.sort_by(|a, b| b.1.cmp(&a.1));
        top_companies.truncate(5);

        let responded = self
            .records
            .iter()
            .filter(|r| r.response_received == YesNo::Yes)
            .count();

        LedgerStats {
            total,
            today: self.count_today(),
            avg_similarity,
            top_companies,
            response_rate: responded as f64 / total as f64 * 100.0,
        }
    }

    fn persist(&self) -> Result<(), LedgerError> {
        let bytes = render_csv(&self.records).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })?;

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(parent).map_err(|e| LedgerError::io(parent, e))?;
        temp.write_all(&bytes)
            .and_then(|_| temp.flush())
            .map_err(|e| LedgerError::io(temp.path(), e))?;
        temp.persist(&self.path)
            .map_err(|e| LedgerError::io(&self.path, e.error))?;
        Ok(())
    }
}

fn render_csv(records: &[LedgerRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(LEDGER_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn read_records(path: &Path) -> Result<Vec<LedgerRecord>, LedgerError> {
    let metadata = std::fs::metadata(path).map_err(|e| LedgerError::io(path, e))?;
    if metadata.len() == 0 {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| corrupt(path, 1, &e))?;

    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<LedgerRecord>().enumerate() {
        let record = row.map_err(|e| corrupt(path, idx as u64 + 2, &e))?;
        records.push(record);
    }
    Ok(records)
}

fn corrupt(path: &Path, fallback_line: u64, error: &csv::Error) -> LedgerError {
    let line = error
        .position()
        .map(|p| p.line())
        .unwrap_or(fallback_line);
    LedgerError::Corrupt {
        path: path.to_path_buf(),
        line,
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn record(url: &str, company: &str, status: ApplicationStatus, ts: NaiveDateTime) -> LedgerRecord {
        LedgerRecord {
            timestamp: ts,
            company: company.to_string(),
            title: "Economist".to_string(),
            location: "London".to_string(),
            url: url.to_string(),
            similarity_score: 0.5,
            status,
            platform: "LinkedIn".to_string(),
            job_type: "Full-time".to_string(),
            compensation: "Not specified".to_string(),
            description_snippet: "Analyse data, \"quoted\", and\nnewlines".to_string(),
            skills_snapshot: "stata, r".to_string(),
            notes: String::new(),
            follow_up_date: String::new(),
            response_received: YesNo::No,
            interview_scheduled: YesNo::No,
        }
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    #[test]
    fn test_missing_file_is_created_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("applications.csv");
        let ledger = ApplicationLedger::open(&path).unwrap();
        assert!(ledger.records().is_empty());

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), LEDGER_COLUMNS.join(","));
    }

    #[test]
    fn test_empty_file_is_zero_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applications.csv");
        std::fs::write(&path, "").unwrap();
        let ledger = ApplicationLedger::open(&path).unwrap();
        assert_eq!(ledger.count_today(), 0);
        assert_eq!(ledger.stats(), LedgerStats::default());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applications.csv");
        std::fs::write(&path, "timestamp,company\nnot-a-date,Acme\n").unwrap();
        let err = ApplicationLedger::open(&path).unwrap_err();
        assert!(matches!(err, LedgerError::Corrupt { line: 2, .. }), "{:?}", err);
    }

    #[test]
    fn test_append_round_trip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applications.csv");

        let mut ledger = ApplicationLedger::open(&path).unwrap();
        let url = "https://www.linkedin.com/jobs/view/42";
        ledger
            .append(record(url, "Acme", ApplicationStatus::Applied, now()))
            .unwrap();
        ledger
            .append(record(
                "https://www.linkedin.com/jobs/view/43",
                "Globex",
                ApplicationStatus::Failed,
                now(),
            ))
            .unwrap();

        let reopened = ApplicationLedger::open(&path).unwrap();
        assert_eq!(reopened.records().len(), 2);
        assert!(reopened.exists(url));
        assert!(reopened.exists("https://www.linkedin.com/jobs/view/42/?trk=abc"));
        assert!(reopened.has_applied(url));
        assert!(reopened.exists("https://www.linkedin.com/jobs/view/43"));
        assert!(!reopened.has_applied("https://www.linkedin.com/jobs/view/43"));
        assert!(!reopened.exists("https://www.linkedin.com/jobs/view/44"));
        assert_eq!(reopened.records()[0].description_snippet, ledger.records()[0].description_snippet);
    }

    #[test]
    fn test_count_today_ignores_other_days() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ApplicationLedger::open(dir.path().join("a.csv")).unwrap();
        let yesterday = now() - Duration::days(1);
        ledger
            .append(record("https://x/1", "Acme", ApplicationStatus::Applied, yesterday))
            .unwrap();
        ledger
            .append(record("https://x/2", "Acme", ApplicationStatus::Error, now()))
            .unwrap();
        assert_eq!(ledger.count_today(), 1);
        assert_eq!(ledger.count_on(yesterday.date()), 1);
    }

    #[test]
    fn test_stats() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ApplicationLedger::open(dir.path().join("a.csv")).unwrap();
        for (i, company) in ["Acme", "Globex", "Acme", "Initech"].iter().enumerate() {
            let mut r = record(&format!("https://x/{}", i), company, ApplicationStatus::Applied, now());
            r.similarity_score = 0.25 * (i + 1) as f64;
            if i == 0 {
                r.response_received = YesNo::Yes;
            }
            ledger.append(r).unwrap();
        }
        let stats = ledger.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.today, 4);
        assert!((stats.avg_similarity - 0.625).abs() < 1e-9);
        assert_eq!(
            stats.top_companies,
            vec![
                ("Acme".to_string(), 2),
                ("Globex".to_string(), 1),
                ("Initech".to_string(), 1)
            ]
        );
        assert_eq!(stats.response_rate, 25.0);
    }

    #[test]
    fn test_column_order_matches_record_fields() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .serialize(record("https://x/1", "Acme", ApplicationStatus::Applied, now()))
            .unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().next().unwrap(), LEDGER_COLUMNS.join(","));
    }
}
