//! 投影视图的过滤与排序
//!
//! 列名只能取当前一代的动态字段或固定列，值一律作为参数绑定

use crate::error::DynViewResult;
use crate::security::IdentifierValidator;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 过滤操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    /// 等于（值为 null 时是 IS NULL）
    Eq,
    /// 不等于（值为 null 时是 IS NOT NULL）
    Ne,
    /// 大于
    Gt,
    /// 大于等于
    Gte,
    /// 小于
    Lt,
    /// 小于等于
    Lte,
}

impl FilterOperator {
    fn as_sql(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Ne => "<>",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
        }
    }
}

/// 过滤条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionCondition {
    /// 列名
    pub field: String,
    /// 操作符
    pub operator: FilterOperator,
    /// 值（数字、字符串、布尔或 null）
    pub value: Value,
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// 升序
    Asc,
    /// 降序
    Desc,
}

/// 排序配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionSort {
    /// 列名
    pub field: String,
    /// 排序方向
    pub direction: SortDirection,
}

/// 投影查询：条件之间为 AND
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionQuery {
    pub conditions: Vec<ProjectionCondition>,
    pub sort: Vec<ProjectionSort>,
}

/// 绑定到语句上的参数
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BindValue {
    Int(i64),
    Real(f64),
    Text(String),
}

impl ProjectionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加过滤条件
    pub fn filter(mut self, field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        self.conditions.push(ProjectionCondition {
            field: field.into(),
            operator,
            value,
        });
        self
    }

    /// 追加排序
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push(ProjectionSort {
            field: field.into(),
            direction,
        });
        self
    }

    /// 生成 SELECT 语句与参数
    ///
    /// `columns` 是允许出现的列名；总是以标识列作为最后的排序键，保证结果顺序稳定
    pub(crate) fn build_sql(
        &self,
        view: &str,
        id_column: &str,
        columns: &[&str],
    ) -> DynViewResult<(String, Vec<BindValue>)> {
        let mut sql = format!("SELECT * FROM {}", IdentifierValidator::quote_identifier(view));
        let mut params = Vec::new();

        if !self.conditions.is_empty() {
            let mut clauses = Vec::with_capacity(self.conditions.len());
            for condition in &self.conditions {
                let column = IdentifierValidator::quote_identifier(resolve_column(columns, &condition.field)?);
                clauses.push(condition_clause(&column, condition, &mut params)?);
            }
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let mut order = Vec::with_capacity(self.sort.len() + 1);
        for sort in &self.sort {
            let column = resolve_column(columns, &sort.field)?;
            let direction = match sort.direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            order.push(format!("{} {}", IdentifierValidator::quote_identifier(column), direction));
        }
        order.push(IdentifierValidator::quote_identifier(id_column));

        sql.push_str(" ORDER BY ");
        sql.push_str(&order.join(", "));
        Ok((sql, params))
    }
}

/// 按大小写不敏感匹配取得规范列名
fn resolve_column<'a>(columns: &[&'a str], field: &str) -> DynViewResult<&'a str> {
    columns
        .iter()
        .find(|c| c.eq_ignore_ascii_case(field))
        .copied()
        .ok_or_else(|| crate::dynview_error!(query, format!("投影中不存在列 '{}'", field)))
}

fn condition_clause(
    column: &str,
    condition: &ProjectionCondition,
    params: &mut Vec<BindValue>,
) -> DynViewResult<String> {
    let bind = match &condition.value {
        Value::Null => {
            return match condition.operator {
                FilterOperator::Eq => Ok(format!("{} IS NULL", column)),
                FilterOperator::Ne => Ok(format!("{} IS NOT NULL", column)),
                _ => Err(crate::dynview_error!(
                    query,
                    format!("列 '{}' 的 null 只能用于等于或不等于", condition.field)
                )),
            };
        }
        // 视图中的布尔值是 json_extract 得到的 0/1
        Value::Bool(b) => BindValue::Int(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BindValue::Int(i),
            None => BindValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => BindValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => {
            return Err(crate::dynview_error!(
                query,
                format!("列 '{}' 的过滤值必须是标量", condition.field)
            ));
        }
    };

    params.push(bind);
    Ok(format!("{} {} ?", column, condition.operator.as_sql()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DynViewError;
    use serde_json::json;

    const COLUMNS: &[&str] = &["id", "price", "tag", "data", "created_at", "updated_at"];

    #[test]
    fn test_default_query_orders_by_id() {
        let (sql, params) = ProjectionQuery::new().build_sql("products_view", "id", COLUMNS).unwrap();
        assert_eq!(sql, "SELECT * FROM \"products_view\" ORDER BY \"id\"");
        assert!(params.is_empty());
    }

    #[test]
    fn test_filters_are_bound_and_sort_appended() {
        let query = ProjectionQuery::new()
            .filter("Price", FilterOperator::Gte, json!(2.5))
            .filter("tag", FilterOperator::Eq, json!("red"))
            .filter("tag", FilterOperator::Ne, Value::Null)
            .order_by("price", SortDirection::Desc);

        let (sql, params) = query.build_sql("products_view", "id", COLUMNS).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"products_view\" WHERE \"price\" >= ? AND \"tag\" = ? AND \"tag\" IS NOT NULL \
             ORDER BY \"price\" DESC, \"id\""
        );
        assert_eq!(params, vec![BindValue::Real(2.5), BindValue::Text("red".to_string())]);
    }

    #[test]
    fn test_unknown_column_and_bad_values_rejected() {
        let unknown = ProjectionQuery::new()
            .filter("price; DROP TABLE products", FilterOperator::Eq, json!(1))
            .build_sql("products_view", "id", COLUMNS);
        assert!(matches!(unknown.unwrap_err(), DynViewError::QueryError { .. }));

        let unknown_sort = ProjectionQuery::new()
            .order_by("weight", SortDirection::Asc)
            .build_sql("products_view", "id", COLUMNS);
        assert!(unknown_sort.is_err());

        let array = ProjectionQuery::new()
            .filter("tag", FilterOperator::Eq, json!(["a"]))
            .build_sql("products_view", "id", COLUMNS);
        assert!(array.is_err());

        let null_range = ProjectionQuery::new()
            .filter("price", FilterOperator::Gt, Value::Null)
            .build_sql("products_view", "id", COLUMNS);
        assert!(null_range.is_err());
    }

    #[test]
    fn test_boolean_binds_as_integer() {
        let (_, params) = ProjectionQuery::new()
            .filter("tag", FilterOperator::Eq, json!(true))
            .build_sql("products_view", "id", COLUMNS)
            .unwrap();
        assert_eq!(params, vec![BindValue::Int(1)]);
    }
}
