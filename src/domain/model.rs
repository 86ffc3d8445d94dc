use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 原始 CSV 資料列（欄位名稱 -> 儲存格文字）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }
}

/// 清洗後的食譜資料列，含比例欄位
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub diet_type: String,
    pub recipe_name: String,
    pub cuisine_type: String,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    /// 分母為 0 時沒有值
    pub protein_to_carbs: Option<f64>,
    pub carbs_to_fat: Option<f64>,
}

/// 每個飲食類型的平均宏量營養素
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietAverages {
    pub diet_type: String,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// 每個飲食類型最常見的料理類型與出現次數
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuisineLeader {
    pub diet_type: String,
    pub cuisine_type: String,
    pub count: usize,
}

/// Transform 階段的完整輸出
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub recipes: Vec<Recipe>,
    /// 依平均蛋白質由高到低排序
    pub diet_averages: Vec<DietAverages>,
    /// 每個飲食類型蛋白質最高的前 N 筆食譜
    pub top_protein: Vec<Recipe>,
    pub highest_protein_diet: String,
    pub highest_protein_avg: f64,
    pub cuisine_leaders: Vec<CuisineLeader>,
    pub generated_at: DateTime<Utc>,
}

/// 數值欄位缺值的填補策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStrategy {
    /// 以該欄位的平均值填補（預設）
    #[default]
    Mean,
    /// 以 0 填補
    Zero,
    /// 丟棄含缺值的資料列
    Drop,
}
