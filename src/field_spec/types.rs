//! 字段定义类型
//!
//! 定义动态投影字段（FieldSpec）及其不可变集合（FieldSpecSet）

use serde::{Deserialize, Serialize};

/// 字段声明类型
///
/// 未识别的类型标签一律归为 `Unknown`，按字符串处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclaredType {
    /// 字符串
    String,
    /// 整数
    Int,
    /// 布尔值
    Boolean,
    /// 十进制数
    Decimal,
    /// 浮点数
    Float,
    /// 字符串列表
    ListOfString,
    /// 未知类型（按字符串处理）
    Unknown,
}

impl DeclaredType {
    /// 从定义源中的类型标签解析
    ///
    /// 标签匹配区分大小写；`ListString` 作为 `ListOfString` 的别名接受
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "String" => DeclaredType::String,
            "Int" => DeclaredType::Int,
            "Boolean" => DeclaredType::Boolean,
            "Decimal" => DeclaredType::Decimal,
            "Float" => DeclaredType::Float,
            "ListOfString" | "ListString" => DeclaredType::ListOfString,
            _ => DeclaredType::Unknown,
        }
    }

    /// 类型标签
    pub fn as_tag(&self) -> &'static str {
        match self {
            DeclaredType::String => "String",
            DeclaredType::Int => "Int",
            DeclaredType::Boolean => "Boolean",
            DeclaredType::Decimal => "Decimal",
            DeclaredType::Float => "Float",
            DeclaredType::ListOfString => "ListOfString",
            DeclaredType::Unknown => "Unknown",
        }
    }

    /// 投影列是否需要数值强制转换
    pub fn is_numeric(&self) -> bool {
        matches!(self, DeclaredType::Decimal | DeclaredType::Float)
    }
}

impl std::fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// 单个动态投影字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// 字段名（定义集内唯一）
    pub name: String,
    /// 声明类型
    pub declared_type: DeclaredType,
    /// 定义源中的原始路径，例如 `$.price`
    pub json_path: String,
    /// 去掉路径根标记后的顶层属性名，例如 `price`
    pub property: String,
}

impl FieldSpec {
    /// 创建字段定义
    ///
    /// 不做任何校验，校验在解析阶段完成
    pub fn new(
        name: impl Into<String>,
        declared_type: DeclaredType,
        json_path: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type,
            json_path: json_path.into(),
            property: property.into(),
        }
    }
}

/// 一代字段定义：发布后不可变，新的定义集整体替换旧的
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSpecSet {
    generation: u64,
    fields: Vec<FieldSpec>,
}

impl FieldSpecSet {
    /// 创建尚未发布的定义集（代号为0）
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            generation: 0,
            fields,
        }
    }

    /// 空定义集
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// 所属代号，0 表示启动时的空集或尚未发布
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 按声明顺序排列的字段
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// 字段名列表（声明顺序）
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// 按名称查找字段
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 检查字段名是否与固定列冲突（大小写不敏感，SQLite列名不区分大小写）
    pub fn check_reserved(&self, reserved: &[&str]) -> crate::error::DynViewResult<()> {
        for field in &self.fields {
            if reserved.iter().any(|r| r.eq_ignore_ascii_case(&field.name)) {
                return Err(crate::dynview_error!(
                    invalid_field,
                    field.name,
                    "字段名与投影的固定列冲突"
                ));
            }
        }
        Ok(())
    }
}
