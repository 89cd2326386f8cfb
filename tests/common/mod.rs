//! 集成测试公共替身：脚本化的页面驱动、搜索、连通性探测
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, Result};
use apply_orchestrator::config::{Config, Credentials};
use apply_orchestrator::infrastructure::selectors::{
    Selector, APPLY_ENTRY, COMPLETION, COVER_LETTER_FIELD, EMAIL_FIELD, FILE_INPUT,
    LOGIN_PASSWORD, LOGIN_SUBMIT, LOGIN_SUCCESS, LOGIN_USERNAME, PHONE_FIELD, PROCEED,
    SELECT_INPUT, TEXT_INPUT,
};
use apply_orchestrator::infrastructure::{SessionLauncher, UiDriver};
use apply_orchestrator::models::{CandidateProfile, Posting, StandardAnswers};
use apply_orchestrator::services::{JobSearch, ReachabilityProbe, SearchQuery, TextSimilarity};
use apply_orchestrator::utils::pacing::{HumanPacing, KeystrokePace};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const PLATFORM_URL: &str = "https://platform.test";
pub const LOGIN_URL: &str = "https://platform.test/login";
pub const FEED_URL: &str = "https://platform.test/feed/";
pub const CHALLENGE_URL: &str = "https://platform.test/checkpoint/challenge";

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

// ========== 页面脚本 ==========

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyButton {
    /// 在 APPLY_ENTRY 中的下标
    pub selector_index: usize,
    pub visible: bool,
    pub enabled: bool,
}

/// 一个职位页面的行为
#[derive(Debug, Clone)]
pub struct FakePage {
    pub apply_buttons: Vec<ApplyButton>,
    /// 点击多少次"下一步"后出现完成标识
    pub clicks_to_complete: usize,
    pub has_proceed: bool,
    pub navigate_fails: bool,
    /// 点击这么多次之后标签页崩溃，之后的查找全部报错
    pub tab_dies_after_clicks: Option<usize>,
    pub panics: bool,
    pub hangs: bool,
    pub has_phone: bool,
    pub phone_prefill: Option<String>,
    pub has_email: bool,
    pub has_cover_letter: bool,
    /// 文本问题的标签
    pub questions: Vec<String>,
    /// 下拉框的标签
    pub selects: Vec<String>,
    pub has_upload: bool,
}

impl FakePage {
    /// 有快速申请入口，点 `clicks` 次下一步后完成
    pub fn easy(clicks: usize) -> Self {
        Self {
            apply_buttons: vec![ApplyButton {
                selector_index: 0,
                visible: true,
                enabled: true,
            }],
            clicks_to_complete: clicks,
            has_proceed: true,
            navigate_fails: false,
            tab_dies_after_clicks: None,
            panics: false,
            hangs: false,
            has_phone: false,
            phone_prefill: None,
            has_email: false,
            has_cover_letter: false,
            questions: Vec::new(),
            selects: Vec::new(),
            has_upload: false,
        }
    }

    pub fn without_apply() -> Self {
        Self {
            apply_buttons: Vec::new(),
            ..Self::easy(1)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginBehavior {
    Succeed,
    StayOnChallenge,
    MissingForm,
}

/// 整个站点：按 URL 分页面
pub struct FakeSite {
    pub pages: HashMap<String, FakePage>,
    pub login: LoginBehavior,
    /// 第 n 次打开职位页时触发取消
    pub cancel_on_visit: Option<(usize, CancellationToken)>,
}

impl FakeSite {
    pub fn new(pages: impl IntoIterator<Item = (String, FakePage)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            login: LoginBehavior::Succeed,
            cancel_on_visit: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// 驱动操作记录，会话关闭后仍可检查
#[derive(Debug, Default)]
pub struct DriverLog {
    pub navigations: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub clicks: Vec<String>,
    pub uploads: Vec<PathBuf>,
    pub selections: Vec<String>,
    /// 每次输入收到的击键节奏
    pub paces: Vec<KeystrokePace>,
    pub closes: usize,
}

impl DriverLog {
    pub fn job_navigations(&self) -> Vec<String> {
        self.navigations
            .iter()
            .filter(|u| u.as_str() != LOGIN_URL)
            .cloned()
            .collect()
    }

    pub fn typed_into(&self, key: &str) -> Vec<String> {
        self.typed
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

// ========== 驱动 ==========

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeElement {
    Apply(ApplyButton),
    Proceed,
    Completion,
    Field(&'static str),
    Text(usize),
    Select(usize),
    File,
    LoginUsername,
    LoginPassword,
    LoginSubmit,
    LoginSuccess,
}

impl FakeElement {
    fn key(&self) -> String {
        match self {
            FakeElement::Apply(b) => format!("apply-{}", b.selector_index),
            FakeElement::Proceed => "proceed".to_string(),
            FakeElement::Completion => "completion".to_string(),
            FakeElement::Field(name) => name.to_string(),
            FakeElement::Text(i) => format!("text-{}", i),
            FakeElement::Select(i) => format!("select-{}", i),
            FakeElement::File => "file".to_string(),
            FakeElement::LoginUsername => "username".to_string(),
            FakeElement::LoginPassword => "password".to_string(),
            FakeElement::LoginSubmit => "login-submit".to_string(),
            FakeElement::LoginSuccess => "global-nav".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct PageState {
    url: String,
    opened: bool,
    proceed_clicks: usize,
    clicks: usize,
    values: HashMap<String, String>,
    visits: usize,
}

pub struct FakeDriver {
    site: Arc<FakeSite>,
    log: Arc<Mutex<DriverLog>>,
    state: Mutex<PageState>,
}

impl FakeDriver {
    pub fn new(site: Arc<FakeSite>, log: Arc<Mutex<DriverLog>>) -> Self {
        Self {
            site,
            log,
            state: Mutex::new(PageState::default()),
        }
    }

    fn resolve(&self, selector: &Selector) -> Option<FakeElement> {
        let state = lock(&self.state);

        if state.url == LOGIN_URL {
            if self.site.login == LoginBehavior::MissingForm {
                return None;
            }
            return if LOGIN_USERNAME.contains(selector) {
                Some(FakeElement::LoginUsername)
            } else if LOGIN_PASSWORD.contains(selector) {
                Some(FakeElement::LoginPassword)
            } else if LOGIN_SUBMIT.contains(selector) {
                Some(FakeElement::LoginSubmit)
            } else {
                None
            };
        }
        if state.url == FEED_URL {
            return (*selector == LOGIN_SUCCESS.selectors[0]).then_some(FakeElement::LoginSuccess);
        }

        let page = self.site.pages.get(&state.url)?;
        if let Some(index) = APPLY_ENTRY.selectors.iter().position(|s| s == selector) {
            if state.opened {
                return None;
            }
            return page
                .apply_buttons
                .iter()
                .find(|b| b.selector_index == index)
                .cloned()
                .map(FakeElement::Apply);
        }
        if !state.opened {
            return None;
        }
        if *selector == PROCEED.selectors[0] && page.has_proceed {
            return Some(FakeElement::Proceed);
        }
        if *selector == COMPLETION.selectors[0] && state.proceed_clicks >= page.clicks_to_complete {
            return Some(FakeElement::Completion);
        }
        if *selector == PHONE_FIELD.selectors[0] && page.has_phone {
            return Some(FakeElement::Field("phone"));
        }
        if *selector == EMAIL_FIELD.selectors[0] && page.has_email {
            return Some(FakeElement::Field("email"));
        }
        if *selector == COVER_LETTER_FIELD.selectors[0] && page.has_cover_letter {
            return Some(FakeElement::Field("cover_letter"));
        }
        None
    }

    fn ensure_alive(&self) -> Result<()> {
        let state = lock(&self.state);
        let dies_after = self
            .site
            .pages
            .get(&state.url)
            .and_then(|p| p.tab_dies_after_clicks);
        match dies_after {
            Some(n) if state.clicks >= n => Err(anyhow!("Target closed")),
            _ => Ok(()),
        }
    }

    fn label_of(&self, element: &FakeElement) -> String {
        let state = lock(&self.state);
        let Some(page) = self.site.pages.get(&state.url) else {
            return String::new();
        };
        match element {
            FakeElement::Text(i) => page.questions.get(*i).cloned().unwrap_or_default(),
            FakeElement::Select(i) => page.selects.get(*i).cloned().unwrap_or_default(),
            FakeElement::Field(name) => name.to_string(),
            _ => String::new(),
        }
    }
}

#[async_trait]
impl UiDriver for FakeDriver {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<()> {
        lock(&self.log).navigations.push(url.to_string());
        let page = self.site.pages.get(url).cloned();

        let visits = {
            let mut state = lock(&self.state);
            state.url = url.to_string();
            state.opened = false;
            state.proceed_clicks = 0;
            state.clicks = 0;
            state.values.clear();
            if let Some(prefill) = page.as_ref().and_then(|p| p.phone_prefill.clone()) {
                state.values.insert("phone".to_string(), prefill);
            }
            if url != LOGIN_URL {
                state.visits += 1;
            }
            state.visits
        };

        if url != LOGIN_URL {
            if let Some((n, token)) = &self.site.cancel_on_visit {
                if visits == *n {
                    token.cancel();
                }
            }
        }

        if let Some(page) = page {
            if page.panics {
                panic!("renderer crashed on {}", url);
            }
            if page.hangs {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if page.navigate_fails {
                return Err(anyhow!("net::ERR_CONNECTION_RESET"));
            }
        }
        Ok(())
    }

    async fn find(&self, selectors: &[Selector], _timeout: Duration) -> Result<Option<FakeElement>> {
        self.ensure_alive()?;
        Ok(selectors.iter().find_map(|s| self.resolve(s)))
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<FakeElement>> {
        self.ensure_alive()?;
        let state = lock(&self.state);
        let Some(page) = self.site.pages.get(&state.url) else {
            return Ok(Vec::new());
        };
        if !state.opened {
            return Ok(Vec::new());
        }
        let found = if *selector == TEXT_INPUT {
            (0..page.questions.len()).map(FakeElement::Text).collect()
        } else if *selector == SELECT_INPUT {
            (0..page.selects.len()).map(FakeElement::Select).collect()
        } else if *selector == FILE_INPUT && page.has_upload {
            vec![FakeElement::File]
        } else {
            Vec::new()
        };
        Ok(found)
    }

    async fn type_text(&self, element: &FakeElement, text: &str, pace: &KeystrokePace) -> Result<()> {
        let key = element.key();
        lock(&self.state).values.insert(key.clone(), text.to_string());
        let mut log = lock(&self.log);
        log.typed.push((key, text.to_string()));
        log.paces.push(*pace);
        Ok(())
    }

    async fn click(&self, element: &FakeElement) -> Result<()> {
        lock(&self.log).clicks.push(element.key());
        let mut state = lock(&self.state);
        state.clicks += 1;
        match element {
            FakeElement::Apply(_) => state.opened = true,
            FakeElement::Proceed => state.proceed_clicks += 1,
            FakeElement::LoginSubmit => {
                state.url = match self.site.login {
                    LoginBehavior::Succeed => FEED_URL.to_string(),
                    _ => CHALLENGE_URL.to_string(),
                };
            }
            _ => {}
        }
        Ok(())
    }

    async fn is_visible(&self, element: &FakeElement) -> Result<bool> {
        Ok(match element {
            FakeElement::Apply(b) => b.visible,
            _ => true,
        })
    }

    async fn is_enabled(&self, element: &FakeElement) -> Result<bool> {
        Ok(match element {
            FakeElement::Apply(b) => b.enabled,
            _ => true,
        })
    }

    async fn value(&self, element: &FakeElement) -> Result<String> {
        Ok(lock(&self.state)
            .values
            .get(&element.key())
            .cloned()
            .unwrap_or_default())
    }

    async fn label(&self, element: &FakeElement) -> Result<String> {
        Ok(self.label_of(element))
    }

    async fn select_option(&self, element: &FakeElement, containing: &str) -> Result<bool> {
        let label = self.label_of(element);
        lock(&self.log)
            .selections
            .push(format!("{}={}", label, containing));
        Ok(true)
    }

    async fn upload_file(&self, _element: &FakeElement, path: &Path) -> Result<()> {
        lock(&self.log).uploads.push(path.to_path_buf());
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(lock(&self.state).url.clone())
    }

    async fn close(self) -> Result<()> {
        lock(&self.log).closes += 1;
        Ok(())
    }
}

pub struct FakeLauncher {
    pub site: Arc<FakeSite>,
    pub log: Arc<Mutex<DriverLog>>,
    pub launches: Arc<AtomicUsize>,
    pub fail: bool,
}

impl FakeLauncher {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
            log: Arc::new(Mutex::new(DriverLog::default())),
            launches: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    /// 测试在控制器拿走启动器之前留一份句柄
    pub fn handles(&self) -> (Arc<Mutex<DriverLog>>, Arc<AtomicUsize>) {
        (Arc::clone(&self.log), Arc::clone(&self.launches))
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    type Driver = FakeDriver;

    async fn launch(&self) -> Result<FakeDriver> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("chrome not found"));
        }
        Ok(FakeDriver::new(Arc::clone(&self.site), Arc::clone(&self.log)))
    }
}

// ========== 外部能力替身 ==========

pub struct StubSearch {
    pub results: Vec<Posting>,
    pub calls: AtomicUsize,
    pub queries: Mutex<Vec<SearchQuery>>,
}

impl StubSearch {
    pub fn new(results: Vec<Posting>) -> Self {
        Self {
            results,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobSearch for StubSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Posting>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.queries).push(query.clone());
        Ok(self.results.clone())
    }
}

pub struct StubProbe(pub bool);

#[async_trait]
impl ReachabilityProbe for StubProbe {
    async fn is_reachable(&self, _url: &str) -> bool {
        self.0
    }
}

/// 按职位描述返回固定相似度
pub struct FixedSimilarity(pub HashMap<String, f64>);

impl TextSimilarity for FixedSimilarity {
    fn similarity(&self, _profile_text: &str, description: &str) -> f64 {
        self.0.get(description).copied().unwrap_or(0.0)
    }
}

// ========== 构造工具 ==========

pub fn job_url(n: u32) -> String {
    format!("https://platform.test/jobs/view/{}", n)
}

/// 描述里不含任何技能词，优先级 = 相似度 + 0.1（entry 级别加成）
pub fn posting(n: u32, company: &str) -> Posting {
    Posting::new(
        &job_url(n),
        format!("Analyst {}", n),
        company,
        "London",
        format!("posting number {}", n),
    )
}

pub fn similarities(pairs: &[(&Posting, f64)]) -> FixedSimilarity {
    FixedSimilarity(
        pairs
            .iter()
            .map(|(p, s)| (p.description.clone(), *s))
            .collect(),
    )
}

pub fn test_config(ledger_path: &Path) -> Config {
    let mut config = Config::default();
    config.keywords = vec!["Economist".to_string()];
    config.locations = vec!["London".to_string()];
    config.credentials = Credentials {
        email: "me@example.com".to_string(),
        password: "secret".to_string(),
    };
    config.ledger_path = ledger_path.to_path_buf();
    config.platform_url = PLATFORM_URL.to_string();
    config.login_url = LOGIN_URL.to_string();
    config.daily_limit = 50;
    config.similarity_threshold = 0.5;
    config.priority_threshold = 0.6;
    config.inter_application_delay_seconds = 0;
    config.discovery_delay_min_seconds = 0;
    config.discovery_delay_max_seconds = 0;
    config.pacing = HumanPacing::instant();
    config
}

pub fn test_profile() -> CandidateProfile {
    CandidateProfile {
        name: "Alex Doe".to_string(),
        email: "alex@example.com".to_string(),
        phone: "+44 7700 900123".to_string(),
        resume_text: "Economist with econometrics and policy analysis experience".to_string(),
        resume_path: None,
        cover_letter_template: None,
        answers: StandardAnswers::default(),
    }
}
