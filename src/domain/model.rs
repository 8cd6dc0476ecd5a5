use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub const PRICE_FIELD: &str = "price";
pub const CATEGORIES_FIELD: &str = "categories";
pub const PRICE_RANGE_FIELD: &str = "price_range";
pub const ORIGINAL_PRICE_FIELD: &str = "original_price";
pub const ON_SALE_FIELD: &str = "on_sale";
pub const OBJECT_ID_FIELD: &str = "objectID";

/// Extract 階段取得的原始資料列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub data: Map<String, Value>,
}

/// 轉換前的商品資料，`extra` 保留所有未知欄位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub price: Number,
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductRecord {
    /// 將原始資料列解碼成商品；缺少或型別錯誤的欄位回傳 `MalformedRecord`
    pub fn try_from_record(index: usize, record: Record) -> Result<Self> {
        let mut data = record.data;

        let price = match data.remove(PRICE_FIELD) {
            Some(Value::Number(n)) => n,
            Some(other) => return Err(malformed(index, PRICE_FIELD, type_reason("a number", &other))),
            None => return Err(malformed(index, PRICE_FIELD, "is missing".to_string())),
        };
        match price.as_f64() {
            Some(p) if p >= 0.0 => {}
            _ => {
                return Err(malformed(
                    index,
                    PRICE_FIELD,
                    format!("must be non-negative, got {}", price),
                ))
            }
        }

        let categories = match data.remove(CATEGORIES_FIELD) {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(malformed(
                        index,
                        CATEGORIES_FIELD,
                        type_reason("a list of strings", &other),
                    )),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(malformed(
                    index,
                    CATEGORIES_FIELD,
                    type_reason("a list of strings", &other),
                ))
            }
            None => return Err(malformed(index, CATEGORIES_FIELD, "is missing".to_string())),
        };

        let price_range = match data.remove(PRICE_RANGE_FIELD) {
            Some(Value::String(label)) => Some(label),
            Some(Value::Null) => {
                // 未折扣的商品需原樣輸出 null
                data.insert(PRICE_RANGE_FIELD.to_string(), Value::Null);
                None
            }
            None => None,
            Some(other) => {
                return Err(malformed(
                    index,
                    PRICE_RANGE_FIELD,
                    type_reason("a string", &other),
                ))
            }
        };

        Ok(Self {
            price,
            categories,
            price_range,
            extra: data,
        })
    }

    pub fn price_value(&self) -> f64 {
        // try_from_record 已保證是非負數
        self.price.as_f64().unwrap_or(0.0)
    }

    pub fn object_id(&self) -> Option<&Value> {
        self.extra.get(OBJECT_ID_FIELD)
    }
}

fn malformed(index: usize, field: &str, reason: String) -> EtlError {
    EtlError::MalformedRecord {
        index,
        field: field.to_string(),
        reason,
    }
}

fn type_reason(expected: &str, found: &Value) -> String {
    let kind = match found {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    format!("must be {}, found {}", expected, kind)
}

/// 轉換後送往搜尋索引的商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedRecord {
    pub price: Number,
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Number>,
    pub on_sale: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransformedRecord {
    pub fn object_id(&self) -> Option<&Value> {
        self.extra.get(OBJECT_ID_FIELD)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformSummary {
    pub total: usize,
    pub discounted: usize,
    /// 折扣後價格找不到任何區間的商品數
    pub unmatched_prices: usize,
    pub unmatchable_labels: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<TransformedRecord>,
    pub summary: TransformSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub index_name: String,
    pub objects_uploaded: usize,
    pub batches: usize,
    pub task_ids: Vec<u64>,
    pub object_ids: Vec<String>,
    pub dry_run: bool,
    pub snapshot_path: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl UploadReport {
    pub fn dry_run(index_name: &str, snapshot_path: Option<String>) -> Self {
        Self {
            index_name: index_name.to_string(),
            objects_uploaded: 0,
            batches: 0,
            task_ids: Vec::new(),
            object_ids: Vec::new(),
            dry_run: true,
            snapshot_path,
            finished_at: Utc::now(),
        }
    }
}
