//! 页面元素选择器
//!
//! 选择器是数据：每组是按优先级排列的 (策略, 表达式) 列表，
//! 由调用方依次尝试，第一个可用的生效。

/// 选择器策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Css,
    XPath,
}

/// 单个选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    pub strategy: Strategy,
    pub pattern: &'static str,
}

impl Selector {
    pub const fn css(pattern: &'static str) -> Self {
        Self {
            strategy: Strategy::Css,
            pattern,
        }
    }

    pub const fn xpath(pattern: &'static str) -> Self {
        Self {
            strategy: Strategy::XPath,
            pattern,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.strategy {
            Strategy::Css => write!(f, "css:{}", self.pattern),
            Strategy::XPath => write!(f, "xpath:{}", self.pattern),
        }
    }
}

/// 有名字的一组选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorSet {
    pub name: &'static str,
    pub selectors: &'static [Selector],
}

impl SelectorSet {
    pub fn contains(&self, selector: &Selector) -> bool {
        self.selectors.contains(selector)
    }
}

// ========== 申请流程 ==========

/// 快速申请入口
pub const APPLY_ENTRY: SelectorSet = SelectorSet {
    name: "apply-entry",
    selectors: &[
        Selector::xpath(
            "//button[contains(@class, 'jobs-apply-button') and contains(., 'Easy Apply')]",
        ),
        Selector::xpath("//button[contains(text(), 'Easy Apply')]"),
        Selector::xpath("//button[@data-control-name='jobdetails_topcard_inapply']"),
        Selector::css(".jobs-apply-button--top-card"),
        Selector::css(".jobs-s-apply button"),
    ],
};

/// 下一步 / 继续 / 提交
pub const PROCEED: SelectorSet = SelectorSet {
    name: "proceed",
    selectors: &[
        Selector::xpath("//button[contains(text(), 'Next')]"),
        Selector::xpath("//button[contains(text(), 'Continue')]"),
        Selector::xpath("//button[contains(text(), 'Review')]"),
        Selector::xpath("//button[contains(text(), 'Submit')]"),
        Selector::xpath("//button[contains(text(), 'Send application')]"),
        Selector::css(".jobs-easy-apply-form-actions__action-container button[aria-label*='Continue']"),
        Selector::css(".jobs-easy-apply-form-actions__action-container button[aria-label*='Submit']"),
    ],
};

/// 申请完成标识
pub const COMPLETION: SelectorSet = SelectorSet {
    name: "completion",
    selectors: &[
        Selector::xpath("//h3[contains(text(), 'Application sent')]"),
        Selector::xpath("//h2[contains(text(), 'Your application was sent')]"),
        Selector::css("[data-test-modal-id='application-sent-confirmation']"),
    ],
};

// ========== 表单字段 ==========

pub const PHONE_FIELD: SelectorSet = SelectorSet {
    name: "phone",
    selectors: &[
        Selector::css("input[name*='phone']"),
        Selector::css("input[id*='phone']"),
        Selector::css("input[placeholder*='phone']"),
        Selector::css("input[aria-label*='phone']"),
    ],
};

pub const EMAIL_FIELD: SelectorSet = SelectorSet {
    name: "email",
    selectors: &[
        Selector::css("input[type='email']"),
        Selector::css("input[name*='email']"),
        Selector::css("input[id*='email']"),
    ],
};

pub const COVER_LETTER_FIELD: SelectorSet = SelectorSet {
    name: "cover-letter",
    selectors: &[
        Selector::css("textarea[name*='cover']"),
        Selector::css("textarea[id*='cover']"),
        Selector::css("textarea[placeholder*='cover']"),
        Selector::css("textarea[aria-label*='cover']"),
        Selector::css(".jobs-easy-apply-form-section__grouping textarea"),
    ],
};

pub const TEXT_INPUT: Selector = Selector::css("input[type='text']");
pub const SELECT_INPUT: Selector = Selector::css("select");
pub const FILE_INPUT: Selector = Selector::css("input[type='file']");

// ========== 登录 ==========

pub const LOGIN_USERNAME: SelectorSet = SelectorSet {
    name: "login-username",
    selectors: &[Selector::css("#username")],
};

pub const LOGIN_PASSWORD: SelectorSet = SelectorSet {
    name: "login-password",
    selectors: &[Selector::css("#password")],
};

pub const LOGIN_SUBMIT: SelectorSet = SelectorSet {
    name: "login-submit",
    selectors: &[Selector::xpath("//button[@type='submit']")],
};

/// 登录成功后才会出现的导航元素
pub const LOGIN_SUCCESS: SelectorSet = SelectorSet {
    name: "login-success",
    selectors: &[
        Selector::css(".global-nav"),
        Selector::xpath("//a[contains(@href, '/feed/')]"),
        Selector::xpath("//button[contains(@class, 'global-nav')]"),
    ],
};
