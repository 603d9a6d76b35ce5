//! 投影视图DDL生成
//!
//! 每个动态字段生成一个从载荷列提取值的列表达式；
//! Decimal/Float 额外强制转换为 REAL，其余类型保持提取出的原始形式。

use crate::config::ProjectionConfig;
use crate::field_spec::{FieldSpec, FieldSpecSet};
use crate::security::IdentifierValidator;

/// 投影视图SQL构建器
pub struct ProjectionSqlBuilder<'a> {
    config: &'a ProjectionConfig,
}

impl<'a> ProjectionSqlBuilder<'a> {
    pub fn new(config: &'a ProjectionConfig) -> Self {
        Self { config }
    }

    /// `DROP VIEW IF EXISTS <view>`
    pub fn drop_view(&self) -> String {
        format!(
            "DROP VIEW IF EXISTS {}",
            IdentifierValidator::quote_identifier(&self.config.view_name)
        )
    }

    /// `CREATE VIEW <view> AS SELECT <id>, <字段表达式>..., <payload>, <created>, <updated> FROM <base>`
    pub fn create_view(&self, set: &FieldSpecSet) -> String {
        let mut select_fields = Vec::with_capacity(set.len() + 4);
        select_fields.push(IdentifierValidator::quote_identifier(&self.config.id_column));

        for field in set.fields() {
            select_fields.push(format!(
                "{} AS {}",
                self.column_expression(field),
                IdentifierValidator::quote_identifier(&field.name)
            ));
        }

        select_fields.push(IdentifierValidator::quote_identifier(&self.config.payload_column));
        select_fields.push(IdentifierValidator::quote_identifier(&self.config.created_column));
        select_fields.push(IdentifierValidator::quote_identifier(&self.config.updated_column));

        format!(
            "CREATE VIEW {} AS SELECT {} FROM {}",
            IdentifierValidator::quote_identifier(&self.config.view_name),
            select_fields.join(", "),
            IdentifierValidator::quote_identifier(&self.config.base_table)
        )
    }

    /// 单个字段的列表达式
    ///
    /// 载荷不是合法JSON时得到 NULL，而不是让整个查询报错。
    /// 数值字段只转换JSON数字，字符串、布尔、数组等一律为 NULL，与查询层解析一致
    pub fn column_expression(&self, field: &FieldSpec) -> String {
        let payload = IdentifierValidator::quote_identifier(&self.config.payload_column);
        let path = IdentifierValidator::json_path_literal(&field.property);

        let value = if field.declared_type.is_numeric() {
            format!(
                "CASE WHEN json_type({payload}, {path}) IN ('integer', 'real') \
                 THEN CAST(json_extract({payload}, {path}) AS REAL) END",
                payload = payload,
                path = path
            )
        } else {
            format!("json_extract({}, {})", payload, path)
        };

        // CASE 保证 json_valid 为假时不会对坏载荷求值
        format!("CASE WHEN json_valid({}) THEN {} END", payload, value)
    }

    /// 视图的列名（按顺序）
    pub fn column_names(&self, set: &FieldSpecSet) -> Vec<String> {
        let mut columns = Vec::with_capacity(set.len() + 4);
        columns.push(self.config.id_column.clone());
        columns.extend(set.fields().iter().map(|f| f.name.clone()));
        columns.push(self.config.payload_column.clone());
        columns.push(self.config.created_column.clone());
        columns.push(self.config.updated_column.clone());
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_spec::DeclaredType;

    fn set() -> FieldSpecSet {
        FieldSpecSet::new(vec![
            FieldSpec::new("price", DeclaredType::Decimal, "$.price", "price"),
            FieldSpec::new("tag", DeclaredType::String, "$.tag", "tag"),
        ])
    }

    #[test]
    fn test_drop_view() {
        let config = ProjectionConfig::products();
        assert_eq!(
            ProjectionSqlBuilder::new(&config).drop_view(),
            "DROP VIEW IF EXISTS \"products_view\""
        );
    }

    #[test]
    fn test_create_view() {
        let config = ProjectionConfig::products();
        let sql = ProjectionSqlBuilder::new(&config).create_view(&set());

        assert_eq!(
            sql,
            "CREATE VIEW \"products_view\" AS SELECT \"id\", \
             CASE WHEN json_valid(\"data\") THEN \
             CASE WHEN json_type(\"data\", '$.\"price\"') IN ('integer', 'real') \
             THEN CAST(json_extract(\"data\", '$.\"price\"') AS REAL) END END AS \"price\", \
             CASE WHEN json_valid(\"data\") THEN json_extract(\"data\", '$.\"tag\"') END AS \"tag\", \
             \"data\", \"created_at\", \"updated_at\" FROM \"products\""
        );
    }

    #[test]
    fn test_empty_set_only_fixed_columns() {
        let config = ProjectionConfig::products();
        let builder = ProjectionSqlBuilder::new(&config);

        assert_eq!(
            builder.create_view(&FieldSpecSet::empty()),
            "CREATE VIEW \"products_view\" AS SELECT \"id\", \"data\", \"created_at\", \"updated_at\" FROM \"products\""
        );
        assert_eq!(
            builder.column_names(&FieldSpecSet::empty()),
            vec!["id", "data", "created_at", "updated_at"]
        );
    }

    #[test]
    fn test_column_names_follow_declared_order() {
        let config = ProjectionConfig::products();
        assert_eq!(
            ProjectionSqlBuilder::new(&config).column_names(&set()),
            vec!["id", "price", "tag", "data", "created_at", "updated_at"]
        );
    }
}
