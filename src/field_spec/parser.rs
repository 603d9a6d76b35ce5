//! 定义源解析
//!
//! 定义源是一个包含 `dynamicFields` 键的JSON对象：
//! `{"dynamicFields": [{"name": "price", "type": "Decimal", "jsonPath": "$.price"}]}`
//! 键名匹配不区分大小写，未知键忽略；缺失或为空的字段列表得到空定义集。

use super::types::{DeclaredType, FieldSpec, FieldSpecSet};
use crate::error::DynViewResult;
use crate::security::IdentifierValidator;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fmt;

/// 多级路径分隔符与下标
static MULTI_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.\[\]]").unwrap());

/// 拼入JSON路径字面量时不安全的字符
static FORBIDDEN_PATH_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["*$\\\p{Cc}]"#).unwrap());

/// 解析定义源字节为字段定义集
///
/// # 错误
/// * `ParseError` - 字节不是合法的定义文档（含空文件，视为写入未完成）
/// * `InvalidFieldSpec` - 字段名或路径不合法
/// * `DuplicateFieldName` - 字段名重复（大小写不敏感）
pub fn load(bytes: &[u8]) -> DynViewResult<FieldSpecSet> {
    let document: Option<DefinitionDocument> = serde_json::from_slice(bytes)
        .map_err(|e| crate::dynview_error!(parse, e))?;

    let raw_fields = document
        .and_then(|doc| doc.dynamic_fields)
        .unwrap_or_default();

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(raw_fields.len());

    for raw in raw_fields {
        IdentifierValidator::validate("name", &raw.name)?;

        if !seen.insert(raw.name.to_ascii_lowercase()) {
            return Err(crate::dynview_error!(duplicate, raw.name));
        }

        let property = extract_property(&raw.json_path)
            .map_err(|msg| crate::dynview_error!(invalid_field, raw.name, msg))?;

        fields.push(FieldSpec::new(
            raw.name,
            DeclaredType::from_tag(&raw.type_tag),
            raw.json_path,
            property,
        ));
    }

    Ok(FieldSpecSet::new(fields))
}

/// 从提取路径中取出顶层属性名
///
/// 接受 `$.price`、`$price`（不推荐）与裸属性名 `price`；
/// 多级路径、下标和通配符一律拒绝，不做截断
pub fn extract_property(json_path: &str) -> Result<String, String> {
    let trimmed = json_path.trim();
    let property = trimmed
        .strip_prefix("$.")
        .or_else(|| trimmed.strip_prefix('$'))
        .unwrap_or(trimmed);

    if property.is_empty() {
        return Err(format!("路径 '{}' 没有指向任何属性", json_path));
    }

    if MULTI_SEGMENT.is_match(property) {
        return Err(format!("仅支持单级属性路径，'{}' 包含多级路径或下标", json_path));
    }

    if let Some(found) = FORBIDDEN_PATH_CHARS.find(property) {
        return Err(format!("路径 '{}' 包含非法字符 {:?}", json_path, found.as_str()));
    }

    Ok(property.to_string())
}

/// 定义文档
struct DefinitionDocument {
    dynamic_fields: Option<Vec<RawFieldSpec>>,
}

/// 未校验的字段定义
struct RawFieldSpec {
    name: String,
    type_tag: String,
    json_path: String,
}

impl<'de> Deserialize<'de> for DefinitionDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = DefinitionDocument;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object with a dynamicFields list")
            }

            fn visit_map<V>(self, mut map: V) -> Result<DefinitionDocument, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut dynamic_fields = None;

                while let Some(key) = map.next_key::<String>()? {
                    if key.eq_ignore_ascii_case("dynamicFields") {
                        dynamic_fields = map.next_value::<Option<Vec<RawFieldSpec>>>()?;
                    } else {
                        let _ = map.next_value::<IgnoredAny>()?;
                    }
                }

                Ok(DefinitionDocument { dynamic_fields })
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

impl<'de> Deserialize<'de> for RawFieldSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldVisitor;

        impl<'de> Visitor<'de> for FieldVisitor {
            type Value = RawFieldSpec;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a field definition object")
            }

            fn visit_map<V>(self, mut map: V) -> Result<RawFieldSpec, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut name = None;
                let mut type_tag = None;
                let mut json_path = None;

                while let Some(key) = map.next_key::<String>()? {
                    if key.eq_ignore_ascii_case("name") {
                        name = map.next_value::<Option<String>>()?;
                    } else if key.eq_ignore_ascii_case("type") {
                        type_tag = map.next_value::<Option<String>>()?;
                    } else if key.eq_ignore_ascii_case("jsonPath") {
                        json_path = map.next_value::<Option<String>>()?;
                    } else {
                        let _ = map.next_value::<IgnoredAny>()?;
                    }
                }

                Ok(RawFieldSpec {
                    name: name.unwrap_or_default(),
                    type_tag: type_tag.unwrap_or_default(),
                    json_path: json_path.ok_or_else(|| de::Error::missing_field("jsonPath"))?,
                })
            }
        }

        deserializer.deserialize_map(FieldVisitor)
    }
}
