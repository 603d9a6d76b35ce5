//! 查询层字段
//!
//! 每个动态字段由一个类型标签和一个解析闭包组成，
//! 闭包绑定单个字段定义，从记录载荷中取值。

use crate::catalog::Record;
use crate::extractor::{self, Extracted};
use crate::field_spec::{DeclaredType, FieldSpec};
use serde_json::Value;
use std::sync::Arc;

/// 查询层字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryFieldType {
    String,
    Int,
    Boolean,
    Decimal,
    ListOfString,
    /// 原始载荷
    Json,
}

impl QueryFieldType {
    /// 声明类型到查询层类型的映射，Unknown 按字符串处理
    pub fn from_declared(declared: DeclaredType) -> Self {
        match declared {
            DeclaredType::String | DeclaredType::Unknown => QueryFieldType::String,
            DeclaredType::Int => QueryFieldType::Int,
            DeclaredType::Boolean => QueryFieldType::Boolean,
            DeclaredType::Decimal | DeclaredType::Float => QueryFieldType::Decimal,
            DeclaredType::ListOfString => QueryFieldType::ListOfString,
        }
    }

    /// SDL中的类型名
    pub fn sdl_name(&self) -> &'static str {
        match self {
            QueryFieldType::String => "String",
            QueryFieldType::Int => "Int",
            QueryFieldType::Boolean => "Boolean",
            QueryFieldType::Decimal => "Decimal",
            QueryFieldType::ListOfString => "[String]",
            QueryFieldType::Json => "JSON",
        }
    }

    /// 值缺失时的表示：列表为空数组，其余为 null
    pub fn absent_value(&self) -> Value {
        match self {
            QueryFieldType::ListOfString => Value::Array(Vec::new()),
            _ => Value::Null,
        }
    }
}

/// 字段解析闭包
pub type Resolver = Arc<dyn Fn(&Record) -> Value + Send + Sync>;

/// 查询层类型上的一个字段
#[derive(Clone)]
pub struct DynamicField {
    name: String,
    field_type: QueryFieldType,
    non_null: bool,
    resolver: Resolver,
}

impl std::fmt::Debug for DynamicField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicField")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("non_null", &self.non_null)
            .finish()
    }
}

impl DynamicField {
    pub fn new(name: impl Into<String>, field_type: QueryFieldType, non_null: bool, resolver: Resolver) -> Self {
        Self {
            name: name.into(),
            field_type,
            non_null,
            resolver,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> QueryFieldType {
        self.field_type
    }

    pub fn is_non_null(&self) -> bool {
        self.non_null
    }

    /// 对记录求值
    pub fn resolve(&self, record: &Record) -> Value {
        (self.resolver)(record)
    }

    /// SDL字段声明，例如 `price: Decimal`
    pub fn sdl(&self) -> String {
        format!(
            "{}: {}{}",
            self.name,
            self.field_type.sdl_name(),
            if self.non_null { "!" } else { "" }
        )
    }
}

/// 字段构造函数：把一个字段定义变为查询层字段
pub type FieldConstructor = fn(FieldSpec) -> DynamicField;

/// 声明类型到构造函数的查找表
pub(crate) const FIELD_CONSTRUCTORS: &[(DeclaredType, FieldConstructor)] = &[
    (DeclaredType::String, string_field),
    (DeclaredType::Int, int_field),
    (DeclaredType::Boolean, boolean_field),
    (DeclaredType::Decimal, decimal_field),
    (DeclaredType::Float, decimal_field),
    (DeclaredType::ListOfString, list_of_string_field),
    (DeclaredType::Unknown, string_field),
];

/// 查找声明类型对应的构造函数，表中缺项时按字符串处理
pub fn constructor_for(declared: DeclaredType) -> FieldConstructor {
    FIELD_CONSTRUCTORS
        .iter()
        .find(|(tag, _)| *tag == declared)
        .map(|(_, constructor)| *constructor)
        .unwrap_or(string_field)
}

/// 便捷函数：创建字符串字段
pub fn string_field(spec: FieldSpec) -> DynamicField {
    extracting_field(spec, QueryFieldType::String)
}

/// 便捷函数：创建整数字段
pub fn int_field(spec: FieldSpec) -> DynamicField {
    extracting_field(spec, QueryFieldType::Int)
}

/// 便捷函数：创建布尔字段
pub fn boolean_field(spec: FieldSpec) -> DynamicField {
    extracting_field(spec, QueryFieldType::Boolean)
}

/// 便捷函数：创建十进制字段（Decimal 与 Float 共用）
pub fn decimal_field(spec: FieldSpec) -> DynamicField {
    extracting_field(spec, QueryFieldType::Decimal)
}

/// 便捷函数：创建字符串列表字段
pub fn list_of_string_field(spec: FieldSpec) -> DynamicField {
    extracting_field(spec, QueryFieldType::ListOfString)
}

fn extracting_field(spec: FieldSpec, field_type: QueryFieldType) -> DynamicField {
    let name = spec.name.clone();
    let resolver: Resolver = Arc::new(move |record: &Record| {
        match extractor::extract(record.payload(), &spec) {
            Extracted::Present(value) => value.to_json_value(),
            Extracted::Absent => field_type.absent_value(),
        }
    });
    DynamicField::new(name, field_type, false, resolver)
}

/// 标识字段 `Int!`
pub(crate) fn id_field(name: &str) -> DynamicField {
    DynamicField::new(
        name,
        QueryFieldType::Int,
        true,
        Arc::new(|record: &Record| Value::from(record.id)),
    )
}

/// 原始载荷字段
pub(crate) fn payload_field(name: &str) -> DynamicField {
    DynamicField::new(
        name,
        QueryFieldType::Json,
        false,
        Arc::new(|record: &Record| record.payload.clone().unwrap_or(Value::Null)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn record(payload: Option<Value>) -> Record {
        let now = Utc::now();
        Record {
            id: 7,
            payload,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_type_mapping() {
        assert_eq!(QueryFieldType::from_declared(DeclaredType::Float), QueryFieldType::Decimal);
        assert_eq!(QueryFieldType::from_declared(DeclaredType::Unknown), QueryFieldType::String);
        assert_eq!(QueryFieldType::ListOfString.sdl_name(), "[String]");
    }

    #[test]
    fn test_every_declared_type_has_constructor() {
        for declared in [
            DeclaredType::String,
            DeclaredType::Int,
            DeclaredType::Boolean,
            DeclaredType::Decimal,
            DeclaredType::Float,
            DeclaredType::ListOfString,
            DeclaredType::Unknown,
        ] {
            let spec = FieldSpec::new("f", declared, "$.f", "f");
            let field = constructor_for(declared)(spec);
            assert_eq!(field.field_type(), QueryFieldType::from_declared(declared));
        }
    }

    #[test]
    fn test_absent_resolves_to_null_or_empty_list() {
        let tag = string_field(FieldSpec::new("tag", DeclaredType::String, "$.missing", "missing"));
        let labels = list_of_string_field(FieldSpec::new("labels", DeclaredType::ListOfString, "$.labels", "labels"));

        let empty = record(Some(json!({})));
        assert_eq!(tag.resolve(&empty), Value::Null);
        assert_eq!(labels.resolve(&empty), json!([]));

        let no_payload = record(None);
        assert_eq!(tag.resolve(&no_payload), Value::Null);
        assert_eq!(labels.resolve(&no_payload), json!([]));
    }

    #[test]
    fn test_builtin_fields() {
        let rec = record(Some(json!({"price": 9.99})));
        assert_eq!(id_field("id").resolve(&rec), json!(7));
        assert_eq!(payload_field("data").resolve(&rec), json!({"price": 9.99}));
        assert_eq!(id_field("id").sdl(), "id: Int!");
    }
}
