use crate::core::{charts, stats, ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    AnalysisReport, CuisineLeader, DietAverages, FillStrategy, RawRecord, Recipe,
};
use crate::utils::error::{EtlError, Result};
use chrono::Utc;
use reqwest::Client;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use url::Url;
use zip::write::{FileOptions, ZipWriter};

/// 資料集必須包含的數值欄位
pub const NUMERIC_COLUMNS: [&str; 3] = ["Protein(g)", "Carbs(g)", "Fat(g)"];
/// 資料集必須包含的分類欄位
pub const CATEGORY_COLUMNS: [&str; 3] = ["Diet_type", "Recipe_name", "Cuisine_type"];

pub struct AnalysisPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> AnalysisPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }
}

fn is_remote_source(source: &str) -> bool {
    Url::parse(source)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AnalysisPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawRecord>> {
        let source = self.config.csv_source();

        let bytes = if is_remote_source(source) {
            tracing::debug!("Fetching dataset from: {}", source);
            let response = self.client.get(source).send().await?.error_for_status()?;
            response.bytes().await?.to_vec()
        } else {
            tracing::debug!("Reading dataset from: {}", source);
            std::fs::read(source).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EtlError::ConfigError {
                        message: format!(
                            "Could not find CSV at '{}'. Put the dataset there or pass --csv-source",
                            source
                        ),
                    }
                } else {
                    EtlError::IoError(e)
                }
            })?
        };

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        // 驗證必要欄位，一次回報所有缺少的
        let present: HashSet<&str> = headers.iter().map(|s| s.as_str()).collect();
        let mut missing: Vec<String> = NUMERIC_COLUMNS
            .iter()
            .chain(CATEGORY_COLUMNS.iter())
            .filter(|c| !present.contains(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(EtlError::MissingColumnsError { columns: missing });
        }

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let mut fields = HashMap::new();
            for (header, cell) in headers.iter().zip(row.iter()) {
                fields.insert(header.clone(), cell.to_string());
            }
            records.push(RawRecord { fields });

            if let Some(cap) = self.config.max_records() {
                if records.len() >= cap {
                    tracing::warn!("Record cap reached, truncating extract at {} rows", cap);
                    break;
                }
            }
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<RawRecord>) -> Result<AnalysisReport> {
        if data.is_empty() {
            return Err(EtlError::ProcessingError {
                message: "dataset has no data rows".to_string(),
            });
        }

        // 數值欄位強制轉型，無法解析視為缺值
        let parsed: Vec<[Option<f64>; 3]> = data
            .iter()
            .map(|r| NUMERIC_COLUMNS.map(|c| r.field(c).and_then(stats::parse_numeric)))
            .collect();

        // 各欄平均值（忽略缺值），供填補使用
        let mut means = [0f64; 3];
        for (i, column) in NUMERIC_COLUMNS.iter().enumerate() {
            means[i] = stats::column_mean(parsed.iter().map(|row| row[i])).ok_or_else(|| {
                EtlError::ProcessingError {
                    message: format!("column '{}' has no numeric values to average", column),
                }
            })?;
        }

        let strategy = self.config.fill_strategy();
        let mut recipes = Vec::with_capacity(data.len());
        for (record, values) in data.iter().zip(parsed.iter()) {
            let filled = match strategy {
                FillStrategy::Drop => match (values[0], values[1], values[2]) {
                    (Some(p), Some(c), Some(f)) => [p, c, f],
                    _ => continue,
                },
                FillStrategy::Mean => [
                    values[0].unwrap_or(means[0]),
                    values[1].unwrap_or(means[1]),
                    values[2].unwrap_or(means[2]),
                ],
                FillStrategy::Zero => [
                    values[0].unwrap_or(0.0),
                    values[1].unwrap_or(0.0),
                    values[2].unwrap_or(0.0),
                ],
            };

            recipes.push(Recipe {
                diet_type: record.field("Diet_type").unwrap_or_default().to_string(),
                recipe_name: record.field("Recipe_name").unwrap_or_default().to_string(),
                cuisine_type: record.field("Cuisine_type").unwrap_or_default().to_string(),
                protein_g: filled[0],
                carbs_g: filled[1],
                fat_g: filled[2],
                protein_to_carbs: stats::safe_divide(filled[0], filled[1]),
                carbs_to_fat: stats::safe_divide(filled[1], filled[2]),
            });
        }

        if recipes.is_empty() {
            return Err(EtlError::ProcessingError {
                message: "no rows left after dropping incomplete records".to_string(),
            });
        }

        // 每個飲食類型的平均宏量營養素
        let mut sums: BTreeMap<&str, ([f64; 3], usize)> = BTreeMap::new();
        for r in &recipes {
            let entry = sums.entry(r.diet_type.as_str()).or_default();
            entry.0[0] += r.protein_g;
            entry.0[1] += r.carbs_g;
            entry.0[2] += r.fat_g;
            entry.1 += 1;
        }
        let mut diet_averages: Vec<DietAverages> = sums
            .into_iter()
            .map(|(diet, (totals, count))| DietAverages {
                diet_type: diet.to_string(),
                protein_g: totals[0] / count as f64,
                carbs_g: totals[1] / count as f64,
                fat_g: totals[2] / count as f64,
            })
            .collect();
        // 依平均蛋白質由高到低；穩定排序讓同分維持字典序
        diet_averages.sort_by(|a, b| b.protein_g.total_cmp(&a.protein_g));

        // 每個飲食類型蛋白質最高的前 N 筆
        let top_n = self.config.top_recipes();
        let mut by_protein: Vec<&Recipe> = recipes.iter().collect();
        by_protein.sort_by(|a, b| b.protein_g.total_cmp(&a.protein_g));
        let mut taken: HashMap<&str, usize> = HashMap::new();
        let mut top_protein = Vec::new();
        for recipe in by_protein {
            let count = taken.entry(recipe.diet_type.as_str()).or_insert(0);
            if *count < top_n {
                *count += 1;
                top_protein.push(recipe.clone());
            }
        }

        let leader = diet_averages
            .first()
            .ok_or_else(|| EtlError::ProcessingError {
                message: "no diet types found".to_string(),
            })?;
        let highest_protein_diet = leader.diet_type.clone();
        let highest_protein_avg = leader.protein_g;

        // 每個飲食類型最常見的料理類型；平手時取字典序較小者
        let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
        for r in &recipes {
            *counts
                .entry((r.diet_type.clone(), r.cuisine_type.clone()))
                .or_insert(0) += 1;
        }
        let mut cuisine_leaders: Vec<CuisineLeader> = Vec::new();
        for ((diet, cuisine), count) in counts {
            match cuisine_leaders.last_mut() {
                Some(last) if last.diet_type == diet => {
                    if count > last.count {
                        last.cuisine_type = cuisine;
                        last.count = count;
                    }
                }
                _ => cuisine_leaders.push(CuisineLeader {
                    diet_type: diet,
                    cuisine_type: cuisine,
                    count,
                }),
            }
        }

        tracing::debug!(
            "Transform complete: {} recipes, {} diet types",
            recipes.len(),
            diet_averages.len()
        );

        Ok(AnalysisReport {
            recipes,
            diet_averages,
            top_protein,
            highest_protein_diet,
            highest_protein_avg,
            cuisine_leaders,
            generated_at: Utc::now(),
        })
    }

    async fn load(&self, report: AnalysisReport) -> Result<String> {
        let formats = self.config.output_formats();
        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();

        if formats.iter().any(|f| f == "csv") {
            entries.push((
                "results/avg_macros_by_diet.csv".to_string(),
                render_diet_averages_csv(&report.diet_averages)?,
            ));
            entries.push((
                "results/top_protein_recipes_by_diet.csv".to_string(),
                render_recipes_csv(&report.top_protein)?,
            ));
            entries.push((
                "results/most_common_cuisine_by_diet.csv".to_string(),
                render_cuisine_csv(&report.cuisine_leaders)?,
            ));
        }

        if formats.iter().any(|f| f == "txt") {
            entries.push((
                "results/highest_protein_diet.txt".to_string(),
                format!(
                    "Highest average protein diet: {} ({:.2} g)\n",
                    report.highest_protein_diet, report.highest_protein_avg
                )
                .into_bytes(),
            ));
        }

        if formats.iter().any(|f| f == "json") {
            entries.push((
                "results/summary.json".to_string(),
                render_summary_json(&report)?,
            ));
        }

        if self.config.charts_enabled() {
            tracing::debug!("Rendering charts for {} diet types", report.diet_averages.len());
            entries.push((
                "charts/avg_macros_bar.svg".to_string(),
                charts::render_avg_macros_bar(&report.diet_averages)?,
            ));
            entries.push((
                "charts/avg_macros_heatmap.svg".to_string(),
                charts::render_avg_macros_heatmap(&report.diet_averages)?,
            ));
            entries.push((
                "charts/top_protein_scatter.svg".to_string(),
                charts::render_top_protein_scatter(&report.top_protein)?,
            ));
        }

        for (name, data) in &entries {
            self.storage.write_file(name, data).await?;
        }

        tracing::info!(
            "🥇 Highest average protein diet: {} ({:.2} g)",
            report.highest_protein_diet,
            report.highest_protein_avg
        );

        if self.config.archive_enabled() {
            // 打包所有輸出成單一 ZIP
            tracing::debug!("Creating ZIP archive with {} entries", entries.len());
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &entries {
                    zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                    zip.write_all(data)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };
            self.storage
                .write_file("analysis_output.zip", &zip_data)
                .await?;
            return Ok(format!("{}/analysis_output.zip", self.config.output_path()));
        }

        Ok(self.config.output_path().to_string())
    }
}

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    wtr.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("CSV buffer flush failed: {}", e),
    })
}

fn render_diet_averages_csv(rows: &[DietAverages]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["Diet_type", "Protein(g)", "Carbs(g)", "Fat(g)"])?;
    for row in rows {
        wtr.write_record(&[
            row.diet_type.clone(),
            row.protein_g.to_string(),
            row.carbs_g.to_string(),
            row.fat_g.to_string(),
        ])?;
    }
    finish_csv(wtr)
}

fn render_recipes_csv(rows: &[Recipe]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "Diet_type",
        "Recipe_name",
        "Cuisine_type",
        "Protein(g)",
        "Carbs(g)",
        "Fat(g)",
    ])?;
    for row in rows {
        wtr.write_record(&[
            row.diet_type.clone(),
            row.recipe_name.clone(),
            row.cuisine_type.clone(),
            row.protein_g.to_string(),
            row.carbs_g.to_string(),
            row.fat_g.to_string(),
        ])?;
    }
    finish_csv(wtr)
}

fn render_cuisine_csv(rows: &[CuisineLeader]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["Diet_type", "Cuisine_type", "Count"])?;
    for row in rows {
        wtr.write_record(&[
            row.diet_type.clone(),
            row.cuisine_type.clone(),
            row.count.to_string(),
        ])?;
    }
    finish_csv(wtr)
}

fn render_summary_json(report: &AnalysisReport) -> Result<Vec<u8>> {
    let summary = serde_json::json!({
        "rows": report.recipes.len(),
        "diet_types": report.diet_averages.len(),
        "highest_protein_diet": report.highest_protein_diet,
        "highest_protein_avg_g": report.highest_protein_avg,
        "cuisine_leaders": &report.cuisine_leaders,
        "generated_at": report.generated_at.to_rfc3339(),
    });
    Ok(serde_json::to_vec_pretty(&summary)?)
}
