use crate::domain::model::{AnalysisReport, FillStrategy, RawRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// 本地路徑或 http(s) URL
    fn csv_source(&self) -> &str;
    fn output_path(&self) -> &str;
    fn top_recipes(&self) -> usize;
    fn charts_enabled(&self) -> bool;
    fn archive_enabled(&self) -> bool;

    fn fill_strategy(&self) -> FillStrategy {
        FillStrategy::Mean
    }

    fn max_records(&self) -> Option<usize> {
        None
    }

    fn output_formats(&self) -> Vec<String> {
        vec!["csv".to_string(), "json".to_string(), "txt".to_string()]
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawRecord>>;
    async fn transform(&self, data: Vec<RawRecord>) -> Result<AnalysisReport>;
    async fn load(&self, report: AnalysisReport) -> Result<String>;
}
