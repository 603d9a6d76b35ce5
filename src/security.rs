//! 标识符安全验证工具
//!
//! 动态字段名会同时成为视图列名和查询层字段名，
//! 所以必须在两边都合法，且拼入DDL前统一加引号保护，防止SQL注入

use crate::error::DynViewResult;

/// 标识符最大长度
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// 标识符安全验证器
pub struct IdentifierValidator;

impl IdentifierValidator {
    /// 验证标识符的安全性
    ///
    /// 规则取SQLite列名与查询层字段名的交集：`[A-Za-z_][A-Za-z0-9_]*`
    ///
    /// # 参数
    /// * `field` - 出错时报告的字段位置（例如 `name`、`view_name`）
    /// * `name` - 待验证的标识符
    pub fn validate(field: &str, name: &str) -> DynViewResult<()> {
        if name.is_empty() {
            return Err(crate::dynview_error!(invalid_field, field, "标识符不能为空"));
        }

        if name.len() > MAX_IDENTIFIER_LENGTH {
            return Err(crate::dynview_error!(
                invalid_field,
                name,
                format!("标识符长度不能超过{}个字符", MAX_IDENTIFIER_LENGTH)
            ));
        }

        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(crate::dynview_error!(invalid_field, name, "标识符不能以数字开头"));
        }

        for (i, ch) in name.chars().enumerate() {
            if !ch.is_ascii_alphanumeric() && ch != '_' {
                return Err(crate::dynview_error!(
                    invalid_field,
                    name,
                    format!("标识符包含非法字符 '{}' 在位置 {}", ch, i)
                ));
            }
        }

        Ok(())
    }

    /// 获取安全的SQL标识符（双引号保护）
    pub fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// 获取安全的SQL字符串字面量（单引号保护）
    pub fn quote_literal(value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// 为顶层属性生成SQLite JSON路径字面量，例如 `'$."price"'`
    ///
    /// 属性名在解析阶段已经排除了双引号和路径分隔符
    pub fn json_path_literal(property: &str) -> String {
        Self::quote_literal(&format!("$.\"{}\"", property))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        // 有效标识符
        assert!(IdentifierValidator::validate("name", "price").is_ok());
        assert!(IdentifierValidator::validate("name", "unit_price").is_ok());
        assert!(IdentifierValidator::validate("name", "_hidden").is_ok());
        assert!(IdentifierValidator::validate("name", "createdAt").is_ok());

        // 无效标识符
        assert!(IdentifierValidator::validate("name", "").is_err());
        assert!(IdentifierValidator::validate("name", "9lives").is_err());
        assert!(IdentifierValidator::validate("name", "unit-price").is_err());
        assert!(IdentifierValidator::validate("name", "unit price").is_err());
        assert!(IdentifierValidator::validate("name", "x\"; DROP TABLE products; --").is_err());
        assert!(IdentifierValidator::validate("name", &"a".repeat(65)).is_err());
    }

    #[test]
    fn test_quoting() {
        assert_eq!(IdentifierValidator::quote_identifier("price"), "\"price\"");
        assert_eq!(IdentifierValidator::quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(IdentifierValidator::quote_literal("it's"), "'it''s'");
        assert_eq!(IdentifierValidator::json_path_literal("price"), "'$.\"price\"'");
        assert_eq!(IdentifierValidator::json_path_literal("o'neil"), "'$.\"o''neil\"'");
    }
}
