//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use std::collections::HashMap;
use rat_embed_lang::register_translations;

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

impl ErrorMessageI18n {
    /// 注册单条翻译（中/英/日）
    fn entry(
        translations: &mut HashMap<String, HashMap<String, String>>,
        key: &str,
        zh: &str,
        en: &str,
        ja: &str,
    ) {
        let mut messages = HashMap::new();
        messages.insert("zh-CN".to_string(), zh.to_string());
        messages.insert("en-US".to_string(), en.to_string());
        messages.insert("ja-JP".to_string(), ja.to_string());
        translations.insert(key.to_string(), messages);
    }

    /// 注册所有错误消息翻译
    pub fn register_all_translations() {
        let mut translations = HashMap::new();

        // 定义源相关错误
        Self::entry(
            &mut translations,
            "error.parse",
            "字段定义解析失败: {message}",
            "Failed to parse field definitions: {message}",
            "フィールド定義の解析に失敗しました: {message}",
        );
        Self::entry(
            &mut translations,
            "error.duplicate_field",
            "字段名 '{name}' 重复",
            "Field name '{name}' is duplicated",
            "フィールド名 '{name}' が重複しています",
        );
        Self::entry(
            &mut translations,
            "error.invalid_field",
            "字段定义不合法: {field} - {message}",
            "Invalid field definition: {field} - {message}",
            "フィールド定義が不正です: {field} - {message}",
        );

        // 投影重建错误
        Self::entry(
            &mut translations,
            "error.projection_rebuild",
            "重建投影视图 '{view}' 失败: {message}",
            "Failed to rebuild projection view '{view}': {message}",
            "投影ビュー '{view}' の再構築に失敗しました: {message}",
        );

        // 存储相关错误
        Self::entry(
            &mut translations,
            "error.query",
            "查询执行失败: {message}",
            "Query execution failed: {message}",
            "クエリ実行が失敗しました: {message}",
        );
        Self::entry(
            &mut translations,
            "error.connection",
            "数据库连接失败: {message}",
            "Database connection failed: {message}",
            "データベース接続に失敗しました: {message}",
        );
        Self::entry(
            &mut translations,
            "error.sqlite_file_not_found",
            "SQLite数据库文件不存在且未启用自动创建: {path}",
            "SQLite database file does not exist and auto-create is not enabled: {path}",
            "SQLiteデータベースファイルが存在せず、自動作成が有効ではありません: {path}",
        );
        Self::entry(
            &mut translations,
            "error.not_found",
            "记录 {id} 不存在",
            "Record {id} not found",
            "レコード {id} が見つかりません",
        );

        // 配置与序列化
        Self::entry(
            &mut translations,
            "error.config",
            "配置错误: {message}",
            "Configuration error: {message}",
            "設定エラー: {message}",
        );
        Self::entry(
            &mut translations,
            "error.serialization",
            "数据序列化失败: {message}",
            "Data serialization failed: {message}",
            "データシリアライズが失敗しました: {message}",
        );

        // 注册所有翻译
        register_translations(translations);
    }

    /// 初始化错误消息多语言支持
    pub fn init() {
        Self::register_all_translations();

        // 从环境变量获取语言设置，默认为zh-CN
        let lang = std::env::var("RAT_LANG")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_else(|_| "zh-CN".to_string());

        // 标准化语言代码
        use rat_embed_lang::normalize_language_code;
        let normalized_lang = normalize_language_code(&lang);
        set_language(&normalized_lang);
    }
}

/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{t, tf, set_language, current_language};
