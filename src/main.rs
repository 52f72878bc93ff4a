use clap::Parser;
use sector_forecast::config::Command;
use sector_forecast::core::Storage;
use sector_forecast::render::{render, render_sectors};
use sector_forecast::utils::error::{ErrorSeverity, ForecastError};
use sector_forecast::utils::{logger, validation::Validate};
use sector_forecast::{
    CliConfig, ExtractionService, ForecastEngine, ForecastRequest, LocalStorage, ScenarioStore,
    TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting sector-forecast");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Some(path) = config.config.clone() {
        tracing::info!("📁 Loading configuration from: {}", path);
        let toml = match TomlConfig::from_file(&path).and_then(|t| t.validate().map(|_| t)) {
            Ok(toml) => toml,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 {}", e.recovery_suggestion());
                std::process::exit(1);
            }
        };
        config.apply_toml(&toml);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let format = config.format;
    let output = config.output.clone();
    let command = config.command.clone();
    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.data_dir.clone());
    let output_storage = storage.clone();
    let store = ScenarioStore::new(storage, config);
    let engine = ForecastEngine::new_with_monitoring(ExtractionService::new(store), monitor_enabled);

    let rendered = match command {
        Command::Sectors => engine
            .sectors()
            .await
            .and_then(|sectors| render_sectors(&sectors, format)),
        Command::Extract {
            forecast,
            scenario,
            sectors,
        } => {
            let request = ForecastRequest::new(forecast, scenario, sectors);
            engine
                .run(&request)
                .await
                .and_then(|result| render(&result, format))
        }
    };

    match rendered {
        Ok(text) => match output {
            Some(path) => {
                output_storage
                    .write_file(&path, text.as_bytes())
                    .await
                    .map_err(|e| anyhow::anyhow!("failed to write {}: {}", path, e))?;
                tracing::info!("📁 Output saved to: {}", path);
            }
            None => print!("{}", text),
        },
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: ForecastError) {
    tracing::error!(
        "❌ Forecast request failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}
