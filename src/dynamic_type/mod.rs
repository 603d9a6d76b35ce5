//! 动态类型构建器
//!
//! 根据一代字段定义构造查询层对象类型：固定的标识与载荷字段，
//! 加上每个字段定义对应的一个解析字段。构建是纯计算，不访问存储。

pub mod field;

pub use field::{
    DynamicField, FieldConstructor, QueryFieldType, Resolver, boolean_field, constructor_for, decimal_field,
    int_field, list_of_string_field, string_field,
};

use crate::catalog::Record;
use crate::config::ProjectionConfig;
use crate::field_spec::FieldSpecSet;
use serde_json::{Map, Value};

/// 查询层动态类型
///
/// 完全由某一代定义集派生，没有独立身份
#[derive(Debug, Clone)]
pub struct DynamicType {
    name: String,
    generation: u64,
    builtin: Vec<DynamicField>,
    dynamic: Vec<DynamicField>,
}

impl DynamicType {
    /// 构建动态类型
    ///
    /// 字段名与定义集中的名称完全一致，顺序也一致。
    /// 重名必须已被定义存储拒绝。
    pub fn build(set: &FieldSpecSet, config: &ProjectionConfig) -> Self {
        let builtin = vec![
            field::id_field(&config.id_column),
            field::payload_field(&config.payload_column),
        ];

        let dynamic = set
            .fields()
            .iter()
            .map(|spec| constructor_for(spec.declared_type)(spec.clone()))
            .collect();

        Self {
            name: config.type_name.clone(),
            generation: set.generation(),
            builtin,
            dynamic,
        }
    }

    /// 没有任何动态字段的初始类型
    pub fn empty(config: &ProjectionConfig) -> Self {
        Self::build(&FieldSpecSet::empty(), config)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 派生自哪一代定义集
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 全部字段：标识、载荷，然后是动态字段
    pub fn fields(&self) -> impl Iterator<Item = &DynamicField> {
        self.builtin.iter().chain(self.dynamic.iter())
    }

    /// 动态字段（按定义顺序）
    pub fn dynamic_fields(&self) -> &[DynamicField] {
        &self.dynamic
    }

    /// 全部字段名
    pub fn field_names(&self) -> Vec<&str> {
        self.fields().map(DynamicField::name).collect()
    }

    /// 动态字段名（按定义顺序）
    pub fn dynamic_field_names(&self) -> Vec<&str> {
        self.dynamic.iter().map(DynamicField::name).collect()
    }

    pub fn field(&self, name: &str) -> Option<&DynamicField> {
        self.fields().find(|f| f.name() == name)
    }

    /// 用本类型的全部字段解析一条记录
    pub fn resolve_record(&self, record: &Record) -> Map<String, Value> {
        self.fields()
            .map(|f| (f.name().to_string(), f.resolve(record)))
            .collect()
    }

    /// 渲染为SDL类型定义
    pub fn to_sdl(&self) -> String {
        let mut sdl = format!("type {} {{\n", self.name);
        for field in self.fields() {
            sdl.push_str("  ");
            sdl.push_str(&field.sdl());
            sdl.push('\n');
        }
        sdl.push('}');
        sdl
    }
}
