use std::env;
use std::io::{self, Write};

use clap::Parser;
use nas_metrics::{logging, metrics, report, NasPlugin, PluginConfig, PluginOptions};
use tracing::{debug, error, Level};

#[tokio::main]
async fn main() {
    if let Err(e) = logging::init_logger(Level::INFO) {
        eprintln!("{}", e);
    }

    let options = PluginOptions::parse();
    let config = match PluginConfig::try_from(options) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let plugin = match NasPlugin::from_config(&config) {
        Ok(plugin) => plugin,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let output = if env::var(report::META_ENV).as_deref() == Ok("1") {
        format!(
            "# mackerel-agent-plugin\n{}\n",
            report::graph_definition_json(plugin.catalog())
        )
    } else {
        let result = plugin.fetch_metrics().await;
        let lines = report::value_lines(plugin.catalog(), &result, chrono::Utc::now().timestamp());
        debug!(self_metrics = %metrics::render(), "cycle telemetry");
        lines.into_iter().map(|line| line + "\n").collect()
    };

    if let Err(e) = io::stdout().lock().write_all(output.as_bytes()) {
        error!("failed to write output: {}", e);
        std::process::exit(1);
    }
}
