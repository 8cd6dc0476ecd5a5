use catalog_sale_etl::utils::{logger, validation::Validate};
use catalog_sale_etl::{AlgoliaIndex, CliConfig, EtlEngine, LocalStorage, SalePipeline};
use clap::Parser;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting catalog-sale-etl");
    tracing::debug!(
        "Input: {}, base dir: {}, discount: {}, keyword: '{}', dry run: {}",
        config.input,
        config.base_dir,
        config.discount_factor,
        config.category_keyword,
        config.dry_run
    );

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let settings = if config.dry_run {
        // dry run 不會呼叫索引，僅需要一個合法的 client
        config.dry_run_settings()
    } else {
        match config.index_settings() {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(e.exit_code());
            }
        }
    };

    let index = match AlgoliaIndex::new(settings) {
        Ok(index) => index,
        Err(e) => {
            tracing::error!("❌ Failed to create search index client: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let storage = LocalStorage::new(config.base_dir.clone());
    let pipeline = SalePipeline::new(storage, config, index);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ ETL process completed successfully!");
            if report.dry_run {
                println!("✅ Dry run completed, nothing was uploaded");
            } else {
                println!(
                    "✅ Uploaded {} products to '{}' (tasks: {:?})",
                    report.objects_uploaded, report.index_name, report.task_ids
                );
            }
            if let Some(path) = &report.snapshot_path {
                println!("📁 Snapshot saved to: {}", path);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
