use diet_etl::{AnalysisPipeline, CliConfig, EtlEngine, LocalStorage};
use httpmock::prelude::*;
use tempfile::TempDir;

const SAMPLE_CSV: &str = "\
Diet_type,Recipe_name,Cuisine_type,Protein(g),Carbs(g),Fat(g)
keto,Grilled Steak,american,40,5,30
keto,Baked Eggs,american,30,1,25
keto,Miso Cod,asian,28,4,12
vegan,Tofu Bowl,asian,20,30,10
vegan,Lentil Curry,indian,18,40,8
paleo,Roast Chicken,american,35,2,15
";

fn config_for(csv_source: String, output_path: String) -> CliConfig {
    CliConfig {
        csv_source,
        output_path,
        top_recipes: 5,
        no_charts: false,
        archive: false,
        verbose: false,
        monitor: false,
        log_json: false,
    }
}

#[tokio::test]
async fn test_end_to_end_analysis_with_local_csv() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("outputs");
    let csv_path = temp_dir.path().join("All_Diets.csv");
    std::fs::write(&csv_path, SAMPLE_CSV).unwrap();

    let config = config_for(
        csv_path.to_str().unwrap().to_string(),
        output_path.to_str().unwrap().to_string(),
    );

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = AnalysisPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, false);

    let result = engine.run().await;
    assert!(result.is_ok());

    // All results and charts should exist on disk
    for file in [
        "results/avg_macros_by_diet.csv",
        "results/top_protein_recipes_by_diet.csv",
        "results/most_common_cuisine_by_diet.csv",
        "results/highest_protein_diet.txt",
        "results/summary.json",
        "charts/avg_macros_bar.svg",
        "charts/avg_macros_heatmap.svg",
        "charts/top_protein_scatter.svg",
    ] {
        assert!(output_path.join(file).exists(), "missing output {}", file);
    }

    // paleo's single recipe (35 g) beats keto's average (40+30+28)/3
    let txt = std::fs::read_to_string(output_path.join("results/highest_protein_diet.txt")).unwrap();
    assert_eq!(txt, "Highest average protein diet: paleo (35.00 g)\n");

    let averages =
        std::fs::read_to_string(output_path.join("results/avg_macros_by_diet.csv")).unwrap();
    let lines: Vec<&str> = averages.lines().collect();
    assert_eq!(lines[0], "Diet_type,Protein(g),Carbs(g),Fat(g)");
    assert!(lines[1].starts_with("paleo,"));
    assert!(lines[2].starts_with("keto,"));
    assert!(lines[3].starts_with("vegan,"));
}

#[tokio::test]
async fn test_end_to_end_with_http_source() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let csv_mock = server.mock(|when, then| {
        when.method(GET).path("/All_Diets.csv");
        then.status(200)
            .header("Content-Type", "text/csv")
            .body(SAMPLE_CSV);
    });

    let config = config_for(server.url("/All_Diets.csv"), output_path.clone());

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = AnalysisPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    let result = engine.run().await;
    assert!(result.is_ok());
    csv_mock.assert();

    assert!(std::path::Path::new(&output_path)
        .join("results/summary.json")
        .exists());
}

#[tokio::test]
async fn test_end_to_end_with_archive() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("outputs");
    let csv_path = temp_dir.path().join("All_Diets.csv");
    std::fs::write(&csv_path, SAMPLE_CSV).unwrap();

    let mut config = config_for(
        csv_path.to_str().unwrap().to_string(),
        output_path.to_str().unwrap().to_string(),
    );
    config.archive = true;
    config.no_charts = true;

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = AnalysisPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    let result = engine.run().await;
    assert!(result.is_ok());
    assert!(result.unwrap().contains("analysis_output.zip"));

    // Verify ZIP content
    let zip_data = std::fs::read(output_path.join("analysis_output.zip")).unwrap();
    let cursor = std::io::Cursor::new(zip_data);
    let mut archive = zip::ZipArchive::new(cursor).unwrap();

    let file_names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();

    assert!(file_names.contains(&"results/avg_macros_by_diet.csv".to_string()));
    assert!(file_names.contains(&"results/summary.json".to_string()));
    // Charts were disabled, none should be bundled
    assert!(!file_names.iter().any(|n| n.starts_with("charts/")));
}

#[tokio::test]
async fn test_end_to_end_missing_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let config = config_for(
        temp_dir
            .path()
            .join("nope.csv")
            .to_str()
            .unwrap()
            .to_string(),
        output_path.clone(),
    );

    let storage = LocalStorage::new(output_path);
    let pipeline = AnalysisPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    let result = engine.run().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_end_to_end_with_monitoring() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("outputs");
    let csv_path = temp_dir.path().join("All_Diets.csv");
    std::fs::write(&csv_path, SAMPLE_CSV).unwrap();

    let mut config = config_for(
        csv_path.to_str().unwrap().to_string(),
        output_path.to_str().unwrap().to_string(),
    );
    config.monitor = true;
    config.no_charts = true;

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = AnalysisPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, true);

    let result = engine.run().await;
    assert!(result.is_ok());
}
