//! 基础设施层
//!
//! 持有稀缺资源（浏览器页面），只向上暴露能力。

pub mod chromium_driver;
pub mod driver;
pub mod selectors;

pub use chromium_driver::{BrowserOwnership, ChromiumDriver};
pub use driver::{find_actionable, SessionLauncher, UiDriver};
pub use selectors::{Selector, SelectorSet, Strategy};
