// ==========================================
// 设备台账分类汇总 - 表格规范化器
// ==========================================
// 职责: 表头识别 → 列清理 → 列角色解析
// 流程: 首行含关键字则提升为表头; 去重列、去无名列; 解析 customer/device/qty
// ==========================================

use crate::domain::{ColumnRole, ColumnRoleMap, NormalizedSheet, RawTable};
use crate::engine::error::{SchemaError, SchemaResult};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct SheetNormalizer;

impl SheetNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// 规范化原始表
    ///
    /// # 返回
    /// - Ok(NormalizedSheet): 清理后的表 + 列角色映射
    /// - Err(SchemaError): 任一角色缺失,调用方应透传原表
    pub fn normalize(&self, raw: &RawTable) -> SchemaResult<NormalizedSheet> {
        // === 步骤 1: 表头识别 ===
        let (columns, rows) = match raw.rows.first() {
            Some(first) if looks_like_header(first.iter().map(|c| c.display_text())) => {
                debug!("首行识别为表头,提升为列名");
                let columns: Vec<String> =
                    first.iter().map(|c| c.display_text().trim().to_string()).collect();
                (columns, &raw.rows[1..])
            }
            _ => (raw.columns.clone(), &raw.rows[..]),
        };

        // === 步骤 2: 列清理（重复列保留首个,无名列丢弃）===
        let mut kept: Vec<usize> = Vec::new();
        for (idx, label) in columns.iter().enumerate() {
            if is_unnamed(label) {
                continue;
            }
            if kept.iter().any(|&k| columns[k] == *label) {
                continue;
            }
            kept.push(idx);
        }

        let table = RawTable::new(
            kept.iter().map(|&k| columns[k].clone()).collect(),
            rows.iter()
                .map(|row| kept.iter().map(|&k| row.get(k).cloned().unwrap_or_default()).collect())
                .collect(),
        );

        // === 步骤 3: 列角色解析（每个角色取首个命中列）===
        let find = |role: ColumnRole| -> Option<String> {
            table
                .columns
                .iter()
                .find(|label| label.to_lowercase().contains(role.keyword()))
                .cloned()
        };

        let missing: Vec<ColumnRole> = ColumnRole::ALL
            .iter()
            .copied()
            .filter(|role| find(*role).is_none())
            .collect();

        match (find(ColumnRole::Customer), find(ColumnRole::Device), find(ColumnRole::Qty)) {
            (Some(customer), Some(device), Some(qty)) => {
                debug!(%customer, %device, %qty, columns = table.width(), "列角色解析完成");
                Ok(NormalizedSheet {
                    table,
                    roles: ColumnRoleMap {
                        customer,
                        device,
                        qty,
                    },
                })
            }
            _ => Err(SchemaError::MissingColumns { missing }),
        }
    }
}

/// 任一单元格包含角色关键字（忽略大小写）即视为表头
fn looks_like_header<I>(cells: I) -> bool
where
    I: IntoIterator<Item = String>,
{
    cells.into_iter().any(|text| {
        let lower = text.to_lowercase();
        ColumnRole::ALL.iter().any(|role| lower.contains(role.keyword()))
    })
}

/// 空列名 / "nan" / "unnamed" 开头
fn is_unnamed(label: &str) -> bool {
    let lower = label.trim().to_lowercase();
    lower.is_empty() || lower == "nan" || lower.starts_with("unnamed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CellValue;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_existing_labels_resolve() {
        let raw = RawTable::new(
            labels(&["Customer Code", "Device Name", "QTY"]),
            vec![vec!["Acme".into(), "BAC-I 100".into(), CellValue::Int(5)]],
        );
        let normalized = SheetNormalizer::new().normalize(&raw).unwrap();
        assert_eq!(normalized.roles.customer, "Customer Code");
        assert_eq!(normalized.roles.device, "Device Name");
        assert_eq!(normalized.roles.qty, "QTY");
        assert_eq!(normalized.table.height(), 1);
    }

    #[test]
    fn test_header_row_promoted() {
        // 标题行在上方,真实表头在第一数据行
        let raw = RawTable::new(
            labels(&["Inventory March", "Unnamed: 1", "Unnamed: 2"]),
            vec![
                vec!["Customer".into(), "Device".into(), "Qty".into()],
                vec!["Acme".into(), "I-CAB".into(), CellValue::Int(2)],
            ],
        );
        let normalized = SheetNormalizer::new().normalize(&raw).unwrap();
        assert_eq!(normalized.table.columns, labels(&["Customer", "Device", "Qty"]));
        assert_eq!(normalized.table.height(), 1);
        assert_eq!(normalized.table.rows[0][0], CellValue::text("Acme"));
    }

    #[test]
    fn test_duplicate_and_unnamed_columns_dropped() {
        let raw = RawTable::new(
            labels(&["Customer", "Unnamed: 1", "Device", "Customer", "nan", "Qty", ""]),
            vec![vec![
                "Acme".into(),
                "x".into(),
                "BEAME".into(),
                "Other".into(),
                "y".into(),
                CellValue::Int(1),
                "z".into(),
            ]],
        );
        let normalized = SheetNormalizer::new().normalize(&raw).unwrap();
        assert_eq!(normalized.table.columns, labels(&["Customer", "Device", "Qty"]));
        assert_eq!(
            normalized.table.rows[0],
            vec![CellValue::text("Acme"), CellValue::text("BEAME"), CellValue::Int(1)]
        );
    }

    #[test]
    fn test_first_matching_column_wins() {
        let raw = RawTable::new(
            labels(&["Customer", "Device Type", "Device Name", "Qty Ordered", "Qty Shipped"]),
            vec![],
        );
        let normalized = SheetNormalizer::new().normalize(&raw).unwrap();
        assert_eq!(normalized.roles.device, "Device Type");
        assert_eq!(normalized.roles.qty, "Qty Ordered");
    }

    #[test]
    fn test_missing_role_is_schema_error() {
        let raw = RawTable::new(
            labels(&["Customer", "Model"]),
            vec![vec!["Acme".into(), "I-CAB".into()]],
        );
        let err = SheetNormalizer::new().normalize(&raw).unwrap_err();
        assert_eq!(err.missing_roles(), &[ColumnRole::Device, ColumnRole::Qty]);
    }

    #[test]
    fn test_empty_table_is_schema_error() {
        let err = SheetNormalizer::new().normalize(&RawTable::default()).unwrap_err();
        assert_eq!(err.missing_roles().len(), 3);
    }
}
