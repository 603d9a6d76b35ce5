//! 路径提取器
//!
//! 从记录的JSON载荷中按字段定义取出强类型值。
//! 载荷缺失、属性缺失、类型不符都返回 `Absent`，从不返回错误：
//! 残缺或畸形的载荷不能破坏读路径。

use crate::field_spec::{DeclaredType, FieldSpec};
use serde_json::Value;

/// 提取出的强类型值
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// 字符串（String 与 Unknown 字段）
    String(String),
    /// 整数
    Int(i64),
    /// 布尔值
    Boolean(bool),
    /// 十进制数（Decimal 与 Float 字段）
    Decimal(f64),
    /// 字符串列表
    StringList(Vec<String>),
}

impl TypedValue {
    /// 转换为JSON值
    pub fn to_json_value(&self) -> Value {
        match self {
            TypedValue::String(s) => Value::String(s.clone()),
            TypedValue::Int(i) => Value::from(*i),
            TypedValue::Boolean(b) => Value::Bool(*b),
            TypedValue::Decimal(d) => serde_json::Number::from_f64(*d)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            TypedValue::StringList(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

/// 提取结果
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    /// 取到了可用的值
    Present(TypedValue),
    /// 没有可用的值（不是错误）
    Absent,
}

impl Extracted {
    pub fn is_absent(&self) -> bool {
        matches!(self, Extracted::Absent)
    }

    /// 转为 `Option`
    pub fn into_option(self) -> Option<TypedValue> {
        match self {
            Extracted::Present(value) => Some(value),
            Extracted::Absent => None,
        }
    }
}

/// 按字段定义从载荷中提取值
///
/// 只查找载荷顶层对象上的单个属性，不做嵌套遍历。
///
/// `ListOfString` 的特殊行为：属性存在但不是字符串数组时返回空列表，
/// 而不是 `Absent`；其余类型失败时都返回 `Absent`。
pub fn extract(payload: Option<&Value>, field: &FieldSpec) -> Extracted {
    let Some(object) = payload.and_then(Value::as_object) else {
        return Extracted::Absent;
    };

    let Some(located) = object.get(&field.property) else {
        return Extracted::Absent;
    };

    if located.is_null() {
        return Extracted::Absent;
    }

    let value = match field.declared_type {
        DeclaredType::String | DeclaredType::Unknown => {
            located.as_str().map(|s| TypedValue::String(s.to_string()))
        }
        DeclaredType::Int => located.as_i64().map(TypedValue::Int),
        DeclaredType::Boolean => located.as_bool().map(TypedValue::Boolean),
        DeclaredType::Decimal | DeclaredType::Float => located.as_f64().map(TypedValue::Decimal),
        DeclaredType::ListOfString => {
            return Extracted::Present(TypedValue::StringList(
                string_list(located).unwrap_or_default(),
            ));
        }
    };

    match value {
        Some(value) => Extracted::Present(value),
        None => {
            crate::debug_log!(
                "字段 {} 类型不符: 声明为 {}，实际值为 {}",
                field.name,
                field.declared_type,
                located
            );
            Extracted::Absent
        }
    }
}

/// 尝试把值解释为字符串数组，任一元素不是字符串即失败
fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
