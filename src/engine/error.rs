// ==========================================
// 设备台账分类汇总 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 引擎错误均可恢复,调用方降级为原表透传
// ==========================================

use crate::domain::ColumnRole;
use thiserror::Error;

/// 表结构错误（列角色无法解析）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("缺少必需列: {}", format_roles(.missing))]
    MissingColumns { missing: Vec<ColumnRole> },
}

impl SchemaError {
    pub fn missing_roles(&self) -> &[ColumnRole] {
        match self {
            SchemaError::MissingColumns { missing } => missing,
        }
    }
}

fn format_roles(roles: &[ColumnRole]) -> String {
    roles
        .iter()
        .map(|r| r.keyword())
        .collect::<Vec<_>>()
        .join("/")
}

/// Result 类型别名
pub type SchemaResult<T> = Result<T, SchemaError>;
