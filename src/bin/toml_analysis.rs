use clap::Parser;
use diet_etl::config::toml_config::TomlConfig;
use diet_etl::core::ConfigProvider;
use diet_etl::utils::{logger, validation::Validate};
use diet_etl::{AnalysisPipeline, EtlEngine, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-analysis")]
#[command(about = "Diet dataset analysis with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "analysis-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override top-recipes-per-diet setting from config
    #[arg(long)]
    top: Option<usize>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based analysis tool");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(top) = args.top {
        config.transform.top_recipes = Some(top);
        tracing::info!("🔧 Top recipes per diet overridden to: {}", top);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = AnalysisPipeline::new(storage, config);

    // 創建 ETL 引擎並運行
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Analysis completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Analysis completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                diet_etl::utils::error::ErrorSeverity::Low => 0,
                diet_etl::utils::error::ErrorSeverity::Medium => 2,
                diet_etl::utils::error::ErrorSeverity::High => 1,
                diet_etl::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    println!(
        "  Source: {} ({})",
        config.source.location, config.source.r#type
    );
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    println!("  Top recipes per diet: {}", config.top_recipes());
    println!("  Charts: {}", config.charts_enabled());

    if let Some(max_records) = config.max_records() {
        println!("  Max Records: {}", max_records);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    // 資料來源分析
    println!("📡 Data Source Analysis:");
    println!("  Type: {}", config.source.r#type);
    println!("  Location: {}", config.source.location);

    // 處理模式分析
    println!();
    println!("⚙️ Processing Mode:");
    println!("  Fill strategy: {:?}", config.fill_strategy());
    println!(
        "  📊 Top protein recipes kept per diet: {}",
        config.top_recipes()
    );
    if let Some(max) = config.max_records() {
        println!("  📊 Max records limit: {}", max);
    } else {
        println!("  📊 Will process all available records");
    }

    // 輸出分析
    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    if config.charts_enabled() {
        println!("  ✅ Chart rendering enabled (bar, heatmap, scatter)");
    }
    if config.archive_enabled() {
        println!("  Compression: analysis_output.zip");
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
