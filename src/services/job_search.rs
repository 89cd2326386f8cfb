//! 职位搜索 - 业务能力层
//!
//! 通过 HTTP 调用 JobSpy 风格的搜索接口。返回体解析采取宽松策略：
//! 缺字段的条目被跳过，结构不符的返回视为 0 个职位。

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::Posting;

/// 一次搜索请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub location: String,
    pub max_results: usize,
    pub recency_hours: u32,
}

/// 职位搜索能力
#[async_trait]
pub trait JobSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Posting>>;
}

/// HTTP 搜索客户端
pub struct HttpJobSearch {
    client: Client,
    endpoint: String,
}

impl HttpJobSearch {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.search_timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("无法创建搜索 HTTP 客户端")?;
        Ok(Self {
            client,
            endpoint: config.search_endpoint.clone(),
        })
    }
}

#[async_trait]
impl JobSearch for HttpJobSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Posting>> {
        debug!(
            "请求搜索接口: {} ({} @ {})",
            self.endpoint, query.keyword, query.location
        );

        let body: Value = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("site_name", "linkedin".to_string()),
                ("search_term", query.keyword.clone()),
                ("location", query.location.clone()),
                ("results_wanted", query.max_results.to_string()),
                ("hours_old", query.recency_hours.to_string()),
                ("linkedin_fetch_description", "true".to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("搜索请求失败: {}", self.endpoint))?
            .error_for_status()
            .context("搜索接口返回错误状态")?
            .json()
            .await
            .context("搜索接口返回的不是 JSON")?;

        Ok(parse_postings(&body, query))
    }
}

/// 从返回体中解析职位
///
/// 支持顶层数组，或 `jobs` / `data` / `results` 字段下的数组。
pub fn parse_postings(body: &Value, query: &SearchQuery) -> Vec<Posting> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(map) => {
            match ["jobs", "data", "results"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_array))
            {
                Some(items) => items,
                None => {
                    warn!("⚠️ 搜索返回结构无法识别，视为 0 个职位");
                    return Vec::new();
                }
            }
        }
        _ => {
            warn!("⚠️ 搜索返回为空或格式错误，视为 0 个职位");
            return Vec::new();
        }
    };

    let postings: Vec<Posting> = items
        .iter()
        .filter_map(|item| parse_posting(item, query))
        .collect();

    if postings.len() < items.len() {
        debug!("跳过 {} 条缺少链接的职位", items.len() - postings.len());
    }
    postings
}

fn parse_posting(item: &Value, query: &SearchQuery) -> Option<Posting> {
    let url = text(item, &["job_url", "url", "link"])?;

    let mut posting = Posting::new(
        &url,
        text(item, &["title"]).unwrap_or_else(|| "Unknown".to_string()),
        text(item, &["company", "company_name"]).unwrap_or_else(|| "Unknown".to_string()),
        text(item, &["location"]).unwrap_or_default(),
        text(item, &["description"]).unwrap_or_default(),
    );
    posting.job_type = text(item, &["job_type"]);
    posting.compensation = compensation(item);
    posting.date_posted = text(item, &["date_posted"]);
    posting.easy_apply = item
        .get("easy_apply")
        .or_else(|| item.get("is_easy_apply"))
        .and_then(Value::as_bool)
        .or_else(|| {
            // 存在外部投递链接说明需要跳转到公司站点
            text(item, &["job_url_direct"]).map(|_| false)
        });
    posting.search_term = Some(query.keyword.clone());
    posting.search_location = Some(query.location.clone());
    Some(posting)
}

/// 取第一个非空字符串字段（数字也按字符串处理）
fn text(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match item.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn compensation(item: &Value) -> Option<String> {
    if let Some(range) = text(item, &["salary_range", "compensation"]) {
        return Some(range);
    }
    let min = item.get("min_amount").and_then(Value::as_f64);
    let max = item.get("max_amount").and_then(Value::as_f64);
    let amount = match (min, max) {
        (Some(min), Some(max)) => format!("{:.0}-{:.0}", min, max),
        (Some(v), None) | (None, Some(v)) => format!("{:.0}", v),
        (None, None) => return None,
    };
    let currency = text(item, &["currency"]).unwrap_or_default();
    let interval = text(item, &["interval"]).unwrap_or_default();
    Some(
        [currency.as_str(), amount.as_str(), interval.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query() -> SearchQuery {
        SearchQuery {
            keyword: "Economist".to_string(),
            location: "London".to_string(),
            max_results: 50,
            recency_hours: 24,
        }
    }

    #[test]
    fn test_parse_top_level_array() {
        let body = json!([
            {
                "job_url": "https://www.linkedin.com/jobs/view/1/?trk=a",
                "title": "Economist",
                "company": "Acme",
                "location": "London",
                "description": "Econometrics",
                "job_type": "fulltime",
                "min_amount": 40000.0,
                "max_amount": 50000.0,
                "currency": "GBP",
                "interval": "yearly"
            },
            { "title": "No link" }
        ]);
        let postings = parse_postings(&body, &query());
        assert_eq!(postings.len(), 1);
        let p = &postings[0];
        assert_eq!(p.url, "https://www.linkedin.com/jobs/view/1");
        assert_eq!(p.id, "1");
        assert_eq!(p.compensation.as_deref(), Some("GBP 40000-50000 yearly"));
        assert_eq!(p.easy_apply, None);
        assert_eq!(p.search_term.as_deref(), Some("Economist"));
    }

    #[test]
    fn test_parse_wrapped_array_and_defaults() {
        let body = json!({ "jobs": [
            { "url": "https://x/jobs/view/2", "easy_apply": true },
            { "job_url": "https://x/jobs/view/3", "job_url_direct": "https://careers.acme.com/3" }
        ]});
        let postings = parse_postings(&body, &query());
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].title, "Unknown");
        assert_eq!(postings[0].company, "Unknown");
        assert_eq!(postings[0].description, "");
        assert_eq!(postings[0].easy_apply, Some(true));
        assert_eq!(postings[1].easy_apply, Some(false));
    }

    #[test]
    fn test_malformed_body_is_zero_postings() {
        assert!(parse_postings(&Value::Null, &query()).is_empty());
        assert!(parse_postings(&json!({"error": "rate limited"}), &query()).is_empty());
        assert!(parse_postings(&json!("oops"), &query()).is_empty());
    }
}
