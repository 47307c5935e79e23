// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 引擎渲染文本时显式传入 locale，不依赖全局语言设置
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// 获取当前全局语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置全局语言（仅影响未显式指定 locale 的翻译）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(resolve_locale(locale));
}

/// 是否为已提供翻译的语言
pub fn is_supported(locale: &str) -> bool {
    rust_i18n::available_locales!().iter().any(|l| *l == locale)
}

/// 规范化语言代码，未知语言回退为默认语言
///
/// # 示例
/// - "en" / "en-US" / "EN" → "en"
/// - "zh" / "zh-cn" → "zh-CN"
pub fn resolve_locale(locale: &str) -> &'static str {
    let lower = locale.trim().to_lowercase();
    if lower == "en" || lower.starts_with("en-") || lower.starts_with("en_") {
        "en"
    } else {
        DEFAULT_LOCALE
    }
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use exam_seating::i18n::t;
/// let msg = t("en", "outcome.failure");
/// ```
pub fn t(locale: &str, key: &str) -> String {
    rust_i18n::t!(key, locale = resolve_locale(locale)).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use exam_seating::i18n::t_with_args;
/// let msg = t_with_args("zh-CN", "warning.overflow_used", &[("room", "A-101"), ("count", "2")]);
/// ```
pub fn t_with_args(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = t(locale, key);
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的全局 locale 在测试间共享
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_resolve_locale() {
        assert_eq!(resolve_locale("en"), "en");
        assert_eq!(resolve_locale("EN-us"), "en");
        assert_eq!(resolve_locale("zh"), "zh-CN");
        assert_eq!(resolve_locale("tr"), "zh-CN");
        assert!(is_supported("en"));
        assert!(is_supported("zh-CN"));
    }

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");
        set_locale("zh-CN");
        assert_eq!(current_locale(), "zh-CN");
    }

    #[test]
    fn test_translate_with_explicit_locale() {
        let zh = t_with_args("zh-CN", "warning.overflow_used", &[("room", "A-101"), ("count", "2")]);
        assert!(zh.contains("A-101"));
        assert!(zh.contains("讲台备用座"));

        let en = t_with_args("en", "warning.overflow_used", &[("room", "A-101"), ("count", "2")]);
        assert!(en.contains("A-101"));
        assert!(en.contains("overflow desk"));
        assert!(!en.contains("%{"));
    }
}
