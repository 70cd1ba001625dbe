// ==========================================
// 设备台账分类汇总 - 客户汇总器
// ==========================================
// 职责: 客户列向下填充 → 连续分组 → 类别数量合计 → 生成新输出表
// 红线: 不在遍历中修改输入表,输出表由分组结果重新构建
// ==========================================

use crate::domain::{
    CategoryTotals, CellValue, DeviceCategory, GroupSummary, NormalizedSheet, ProcessedSheet,
    RawRow, RawTable, NEW_QTY_COLUMN,
};
use crate::engine::classifier::DeviceClassifier;
use tracing::{debug, trace};

const EMPTY: &CellValue = &CellValue::Empty;

/// 连续客户分组（行区间 [start, end)）
#[derive(Debug, Clone, PartialEq)]
struct CustomerRun {
    start: usize,
    end: usize,
    customer: Option<CellValue>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerAggregator;

impl CustomerAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 汇总规范化后的表
    ///
    /// # 输出列
    /// customer, device, qty, NEW QTY, I-CAB, BAC-I, I-CAB H, I-CAB M, BEAME
    ///
    /// # 说明
    /// - 合计值只写在每组首行,其余行留空
    /// - 组内非首行的客户单元格置空
    /// - 首个客户出现之前的行不属于任何分组,原样保留
    pub fn aggregate(
        &self,
        sheet: &NormalizedSheet,
        classifier: &dyn DeviceClassifier,
    ) -> ProcessedSheet {
        let table = &sheet.table;
        let roles = &sheet.roles;
        let cell = |row: usize, label: &str| cell_at(table, row, label);

        // === 步骤 1: 客户列向下填充 ===
        let mut filled: Vec<Option<CellValue>> = Vec::with_capacity(table.height());
        let mut last: Option<CellValue> = None;
        for row in 0..table.height() {
            let customer = cell(row, &roles.customer);
            if !customer.is_blank() {
                last = Some(customer.clone());
            }
            filled.push(last.clone());
        }

        // === 步骤 2: 按连续相同客户分组 ===
        let runs = partition_runs(&filled);
        debug!(rows = table.height(), groups = runs.len(), "客户分组完成");

        // === 步骤 3-6: 逐组合计并构建输出行 ===
        let mut rows: Vec<RawRow> = Vec::with_capacity(table.height());
        let mut groups: Vec<GroupSummary> = Vec::new();

        for run in &runs {
            let Some(customer) = &run.customer else {
                // 无客户归属的前导行: 原样保留,汇总列为空
                for row in run.start..run.end {
                    rows.push(output_row(
                        cell(row, &roles.customer).clone(),
                        cell(row, &roles.device).clone(),
                        cell(row, &roles.qty).clone(),
                        None,
                    ));
                }
                continue;
            };

            let mut totals = CategoryTotals::default();
            for row in run.start..run.end {
                let qty_cell = cell(row, &roles.qty);
                let qty = qty_cell.to_quantity();
                if qty == 0 && !qty_cell.is_blank() {
                    trace!(row, value = %qty_cell, "数量无法解析,按 0 计");
                }
                if let Some(category) = classifier.classify(cell(row, &roles.device)) {
                    totals.add(category, qty);
                }
            }

            for row in run.start..run.end {
                let is_first = row == run.start;
                rows.push(output_row(
                    if is_first { customer.clone() } else { CellValue::Empty },
                    cell(row, &roles.device).clone(),
                    cell(row, &roles.qty).clone(),
                    is_first.then_some(&totals),
                ));
            }

            groups.push(GroupSummary {
                customer: customer.display_text(),
                first_row: run.start,
                row_count: run.end - run.start,
                totals,
                new_qty: totals.sum(),
            });
        }

        // === 步骤 7: 输出列顺序 ===
        let mut columns = vec![
            roles.customer.clone(),
            roles.device.clone(),
            roles.qty.clone(),
            NEW_QTY_COLUMN.to_string(),
        ];
        columns.extend(DeviceCategory::OUTPUT_ORDER.iter().map(|c| c.label().to_string()));

        ProcessedSheet {
            table: RawTable::new(columns, rows),
            roles: roles.clone(),
            groups,
        }
    }
}

fn cell_at<'a>(table: &'a RawTable, row: usize, label: &str) -> &'a CellValue {
    table.get(row, label).unwrap_or(EMPTY)
}

/// 填充后的客户值 → 连续区间
fn partition_runs(filled: &[Option<CellValue>]) -> Vec<CustomerRun> {
    let mut runs: Vec<CustomerRun> = Vec::new();
    for (idx, customer) in filled.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.customer == *customer => run.end = idx + 1,
            _ => runs.push(CustomerRun {
                start: idx,
                end: idx + 1,
                customer: customer.clone(),
            }),
        }
    }
    runs
}

/// 构建单个输出行; totals 为 None 时汇总列留空
fn output_row(
    customer: CellValue,
    device: CellValue,
    qty: CellValue,
    totals: Option<&CategoryTotals>,
) -> RawRow {
    let mut row = vec![customer, device, qty];
    match totals {
        Some(t) => {
            row.push(CellValue::Int(t.sum()));
            row.extend(DeviceCategory::OUTPUT_ORDER.iter().map(|c| CellValue::Int(t.get(*c))));
        }
        None => row.extend(std::iter::repeat(CellValue::Empty).take(1 + DeviceCategory::OUTPUT_ORDER.len())),
    }
    row
}
