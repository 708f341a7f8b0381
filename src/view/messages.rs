//! User-facing wording for status lines, alerts and placeholders.

use std::fmt;
use std::str::FromStr;

use crate::catalog::Placeholders;
use crate::config::ConfigError;
use crate::transport::TransportError;

/// Display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Simplified Chinese.
    Zh,
}

impl Locale {
    /// BCP 47 tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            "zh" | "zh-cn" | "zh-hans" => Ok(Self::Zh),
            _ => Err(ConfigError::invalid_choice("locale", value, "en, zh")),
        }
    }
}

/// Message catalog for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    /// Catalog for `locale`.
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// The catalog's locale.
    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Heading of the rendered page.
    #[must_use]
    pub fn page_title(&self) -> &'static str {
        match self.locale {
            Locale::En => "Bookshelf",
            Locale::Zh => "我的书架",
        }
    }

    /// Label of the load trigger.
    #[must_use]
    pub fn load_label(&self) -> &'static str {
        match self.locale {
            Locale::En => "Load books",
            Locale::Zh => "加载书籍",
        }
    }

    /// Status shown before the first load.
    #[must_use]
    pub fn idle(&self) -> &'static str {
        match self.locale {
            Locale::En => "Press the button to load books.",
            Locale::Zh => "点击按钮加载书籍。",
        }
    }

    /// Status shown while the catalog request is pending.
    #[must_use]
    pub fn loading(&self) -> &'static str {
        match self.locale {
            Locale::En => "Loading books from the cloud…",
            Locale::Zh => "正在从云端加载书籍…",
        }
    }

    /// Status after rendering `count` books.
    #[must_use]
    pub fn loaded(&self, count: usize) -> String {
        match self.locale {
            Locale::En if count == 1 => "Loaded 1 book.".to_string(),
            Locale::En => format!("Loaded {count} books."),
            Locale::Zh => format!("已加载 {count} 本书。"),
        }
    }

    /// Status when the catalog holds no books.
    #[must_use]
    pub fn no_books(&self) -> &'static str {
        match self.locale {
            Locale::En => "No books found. Add a few in the backend first.",
            Locale::Zh => "没有查询到任何书籍，可以先在后台添加几本。",
        }
    }

    /// Status for a failed catalog request.
    #[must_use]
    pub fn load_failed(&self, error: &TransportError) -> String {
        let reason = self.transport_error(error);
        match self.locale {
            Locale::En => format!("Load failed: {reason}"),
            Locale::Zh => format!("加载失败：{reason}"),
        }
    }

    /// Status for a panic raised while loading.
    #[must_use]
    pub fn load_exception(&self, message: &str) -> String {
        match self.locale {
            Locale::En => format!("Load exception: {message}"),
            Locale::Zh => format!("加载异常：{message}"),
        }
    }

    /// Alert shown when the page lacks a required element.
    #[must_use]
    pub fn missing_elements(&self) -> &'static str {
        match self.locale {
            Locale::En => "Page elements failed to load, please refresh and try again.",
            Locale::Zh => "页面元素加载失败，请刷新页面重试",
        }
    }

    /// Reported when a book id is empty.
    #[must_use]
    pub fn book_id_missing(&self) -> &'static str {
        match self.locale {
            Locale::En => "Error: book id missing",
            Locale::Zh => "错误：书籍 ID 不存在",
        }
    }

    /// Status for a failed download-link request.
    #[must_use]
    pub fn download_failed(&self, error: &TransportError) -> String {
        let reason = self.transport_error(error);
        match self.locale {
            Locale::En => format!("Download failed: {reason}"),
            Locale::Zh => format!("下载失败：{reason}"),
        }
    }

    /// Status when the response carries no usable `download_url`.
    #[must_use]
    pub fn no_download_link(&self) -> &'static str {
        match self.locale {
            Locale::En => "Download failed: server returned no download link",
            Locale::Zh => "下载失败：服务器未返回下载链接",
        }
    }

    /// Status when following the download link fails.
    #[must_use]
    pub fn redirect_failed(&self) -> &'static str {
        match self.locale {
            Locale::En => "Redirect failed, please visit the link manually",
            Locale::Zh => "跳转失败，请手动访问链接",
        }
    }

    /// Text placed before the author on a card.
    #[must_use]
    pub fn author_prefix(&self) -> &'static str {
        match self.locale {
            Locale::En => "by",
            Locale::Zh => "作者 ·",
        }
    }

    /// Caption of a card's download button.
    #[must_use]
    pub fn download_label(&self) -> &'static str {
        match self.locale {
            Locale::En => "Download",
            Locale::Zh => "下载",
        }
    }

    /// Tooltip of a card's download button.
    #[must_use]
    pub fn download_hint(&self) -> &'static str {
        match self.locale {
            Locale::En => "Download book",
            Locale::Zh => "下载书籍",
        }
    }

    /// Placeholders for missing record fields.
    #[must_use]
    pub fn placeholders(&self) -> Placeholders {
        match self.locale {
            Locale::En => Placeholders {
                title: "Untitled book",
                author: "Anonymous",
                description: "No description yet.",
            },
            Locale::Zh => Placeholders {
                title: "未命名书籍",
                author: "佚名",
                description: "暂无简介。",
            },
        }
    }

    /// Localized text for a transport failure.
    ///
    /// `HTTP <status>` and propagated messages are kept as they are.
    #[must_use]
    pub fn transport_error(&self, error: &TransportError) -> String {
        if self.locale == Locale::En {
            return error.to_string();
        }
        match error {
            TransportError::Network { .. } => "网络错误".to_string(),
            TransportError::ParseFailed { .. } => "解析响应失败".to_string(),
            TransportError::SendFailed { .. } => "发送请求失败".to_string(),
            TransportError::Unsupported => "当前环境不支持网络请求".to_string(),
            TransportError::Exception { message } => format!("请求异常：{message}"),
            TransportError::HttpStatus { .. } | TransportError::Propagated { .. } => {
                error.to_string()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_str() {
        assert_eq!("zh-CN".parse::<Locale>().unwrap(), Locale::Zh);
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_loaded_pluralization() {
        let en = Messages::new(Locale::En);
        assert_eq!(en.loaded(1), "Loaded 1 book.");
        assert_eq!(en.loaded(3), "Loaded 3 books.");
        assert_eq!(Messages::new(Locale::Zh).loaded(3), "已加载 3 本书。");
    }

    #[test]
    fn test_load_failed_keeps_http_status() {
        let error = TransportError::http_status(500);
        assert_eq!(Messages::new(Locale::En).load_failed(&error), "Load failed: HTTP 500");
        assert_eq!(Messages::new(Locale::Zh).load_failed(&error), "加载失败：HTTP 500");
    }

    #[test]
    fn test_transport_error_localized() {
        let zh = Messages::new(Locale::Zh);
        assert_eq!(zh.transport_error(&TransportError::network("x")), "网络错误");
        assert_eq!(
            zh.transport_error(&TransportError::exception("boom")),
            "请求异常：boom"
        );
    }

    #[test]
    fn test_placeholders_per_locale() {
        assert_eq!(Messages::new(Locale::Zh).placeholders().title, "未命名书籍");
        assert_eq!(Messages::new(Locale::En).placeholders().author, "Anonymous");
    }

    #[test]
    fn test_fixed_texts_translated_for_each_locale() {
        let en = Messages::new(Locale::En);
        let zh = Messages::new(Locale::Zh);
        let pairs = [
            (en.page_title(), zh.page_title()),
            (en.load_label(), zh.load_label()),
            (en.idle(), zh.idle()),
            (en.loading(), zh.loading()),
            (en.no_books(), zh.no_books()),
            (en.book_id_missing(), zh.book_id_missing()),
            (en.no_download_link(), zh.no_download_link()),
            (en.redirect_failed(), zh.redirect_failed()),
            (en.author_prefix(), zh.author_prefix()),
            (en.download_label(), zh.download_label()),
            (en.download_hint(), zh.download_hint()),
        ];
        for (english, chinese) in pairs {
            assert!(!english.is_empty());
            assert!(!chinese.is_empty());
            assert_ne!(english, chinese);
        }
        assert_eq!(zh.load_exception("boom"), "加载异常：boom");
    }
}
