use anyhow::Result;
use catalog_sale_etl::utils::validation::Validate;
use catalog_sale_etl::{AlgoliaIndex, EtlEngine, LocalStorage, SalePipeline, TomlConfig};
use httpmock::prelude::*;
use tempfile::TempDir;

/// 從 TOML 設定檔跑完整流程：自訂折扣、關鍵字與 batch 大小
#[tokio::test]
async fn test_toml_configured_sale() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let temp_path = temp_dir.path().to_str().unwrap().replace('\\', "/");

    tokio::fs::write(
        temp_dir.path().join("catalog.json"),
        serde_json::to_vec(&serde_json::json!([
            {"name": "Zoom lens", "price": 400, "categories": ["Lenses"], "price_range": "300-499"},
            {"name": "Body", "price": 900, "categories": ["Cameras"], "price_range": "500-999"},
            {
                "name": "Lens hood",
                "price": 30,
                "categories": ["LENS Accessories"],
                "price_range": "0-199"
            }
        ]))?,
    )
    .await?;

    let server = MockServer::start();
    std::env::set_var("TOML_SALE_TEST_API_KEY", "toml-key");

    let config_content = format!(
        r#"
[pipeline]
name = "lens-week"
description = "Half price on lenses"

[source]
input = "catalog.json"
base_dir = "{}"

[discount]
factor = 0.5
category_keyword = "lens"

[index]
app_id = "TOMLAPP"
api_key = "${{TOML_SALE_TEST_API_KEY}}"
index_name = "lens week"
host = "{}"
batch_size = 2

[load]
snapshot = "lens-week.json"
"#,
        temp_path,
        server.base_url()
    );

    let config_path = temp_dir.path().join("sale-config.toml");
    tokio::fs::write(&config_path, config_content).await?;
    let config = TomlConfig::from_file(&config_path)?;
    std::env::remove_var("TOML_SALE_TEST_API_KEY");
    config.validate()?;

    let batch_mock = server.mock(|when, then| {
        when.method(POST)
            .path_contains("/1/indexes/lens")
            .path_contains("/batch")
            .header("X-Algolia-API-Key", "toml-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"taskID": 9, "objectIDs": []}));
    });

    let index = AlgoliaIndex::new(config.index_settings())?;
    let storage = LocalStorage::new(config.base_dir().to_string());
    let engine = EtlEngine::new(SalePipeline::new(storage, config, index));

    let report = engine.run().await?;

    batch_mock.assert_hits(2);
    assert_eq!(report.batches, 2);
    assert_eq!(report.index_name, "lens week");

    let snapshot: Vec<serde_json::Value> =
        serde_json::from_slice(&tokio::fs::read(temp_dir.path().join("lens-week.json")).await?)?;

    // 400 * 0.5 = 200，沒有區間包含 200
    assert_eq!(snapshot[0]["price"], 200);
    assert!(snapshot[0].get("price_range").is_none());
    assert_eq!(snapshot[0]["on_sale"], true);

    assert_eq!(snapshot[1]["price"], 900);
    assert_eq!(snapshot[1]["on_sale"], false);

    // 30 * 0.5 = 15 -> "0-199"
    assert_eq!(snapshot[2]["price"], 15);
    assert_eq!(snapshot[2]["price_range"], "0-199");

    Ok(())
}
