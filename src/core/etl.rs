use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        println!("Starting analysis process...");

        // Extract
        println!("Extracting data...");
        let raw_data = self.pipeline.extract().await?;
        println!("Extracted {} records", raw_data.len());
        self.monitor.log_stats("Extract");

        // Transform
        println!("Transforming data...");
        let report = self.pipeline.transform(raw_data).await?;
        println!(
            "Analyzed {} recipes across {} diet types",
            report.recipes.len(),
            report.diet_averages.len()
        );
        self.monitor.log_stats("Transform");

        // Load
        println!("Loading data...");
        let output_path = self.pipeline.load(report).await?;
        println!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
