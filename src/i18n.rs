// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库,支持中文（默认）和英文
// 范围: 仅操作员可见的 CLI 提示; 设备类别标签不翻译
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN" 或 "en",忽略大小写）
///
/// # 返回
/// 实际生效的语言; 不支持的代码保持当前语言并返回 None
pub fn set_locale(locale: &str) -> Option<&'static str> {
    let resolved = resolve_locale(locale)?;
    rust_i18n::set_locale(resolved);
    Some(resolved)
}

/// 语言代码归一化（"zh" / "zh_cn" / "EN" 等）
pub fn resolve_locale(locale: &str) -> Option<&'static str> {
    let normalized = locale.trim().replace('_', "-").to_lowercase();
    match normalized.as_str() {
        "zh" | "zh-cn" | "zh-hans" => Some("zh-CN"),
        "en" | "en-us" | "en-gb" => Some("en"),
        _ => None,
    }
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use device_tally::i18n::t;
/// let msg = t("cli.no_overrides");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use device_tally::i18n::t_with_args;
/// let msg = t_with_args("cli.exported", &[("path", "/tmp/out.xlsx")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
