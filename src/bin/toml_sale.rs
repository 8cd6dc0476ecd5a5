use catalog_sale_etl::core::ConfigProvider;
use catalog_sale_etl::utils::{logger, validation::Validate};
use catalog_sale_etl::{
    AlgoliaIndex, AlgoliaSettings, EtlEngine, LocalStorage, SalePipeline, TomlConfig,
};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml_sale")]
#[command(about = "Camera sale ETL driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "sale-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Transform and write the snapshot without uploading
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based sale ETL '{}'", config.pipeline.name);
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 應用命令列覆蓋設定
    if args.dry_run {
        config.load.dry_run = Some(true);
        tracing::info!("🔧 Dry run enabled from command line");
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let settings = if config.dry_run() {
        // 憑證在 dry run 時可能未設定，給 client 一組佔位值
        AlgoliaSettings::dry_run(config.index_name())
    } else {
        config.index_settings()
    };
    let index = match AlgoliaIndex::new(settings) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    let storage = LocalStorage::new(config.base_dir().to_string());
    let pipeline = SalePipeline::new(storage, config, index);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ ETL process completed successfully!");
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!("Unable to render upload report: {}", e),
            }
        }
        Err(e) => {
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

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    if let Some(description) = &config.pipeline.description {
        tracing::info!("   Description: {}", description);
    }
    tracing::info!("   Source: {}", config.source());
    tracing::info!(
        "   Discount: {:.0}% on categories containing '{}'",
        config.discount_factor() * 100.0,
        config.category_keyword()
    );
    tracing::info!("   Index: {}", config.index_name());
    if let Some(snapshot) = config.snapshot_file() {
        tracing::info!("   Snapshot: {}", snapshot);
    }
    if config.dry_run() {
        tracing::info!("   Mode: dry run");
    }
}
