mod handlers;
mod models;
mod server;
mod services;

use anyhow::Result;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;

use handlers::AnalysisHandler;
use server::create_router;
use services::{CalorieTable, DetectorService, MockDetector, RemoteDetector};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Food Calorie API...");

    // Calorie table: built-in vocabulary unless a JSON override is given.
    let table = match env::var("CALORIE_TABLE_PATH") {
        Ok(path) => {
            let table = CalorieTable::from_json_file(&path)
                .map_err(|e| anyhow::anyhow!("failed to load calorie table {}: {}", path, e))?;
            log::info!("✅ Calorie table loaded from {} ({} foods)", path, table.len());
            table
        }
        Err(_) => {
            let table = CalorieTable::builtin();
            log::info!("✅ Built-in calorie table loaded ({} foods)", table.len());
            table
        }
    };
    let table = Arc::new(table);

    // Detector collaborator
    let backend = env::var("DETECTOR_BACKEND").unwrap_or_else(|_| "remote".to_string());
    let detector: Arc<dyn DetectorService> = match backend.as_str() {
        "mock" => {
            log::warn!("⚠️ Using mock detector, every image yields zero detections");
            Arc::new(MockDetector::empty())
        }
        "remote" => {
            let detector_url = env::var("DETECTOR_URL")
                .expect("DETECTOR_URL must be set (or DETECTOR_BACKEND=mock)");
            Arc::new(RemoteDetector::new(detector_url))
        }
        other => anyhow::bail!("unsupported DETECTOR_BACKEND: {}", other),
    };

    // Refuse traffic without a reachable detector.
    if let Err(e) = detector.health_check().await {
        log::error!("❌ Detector health check failed: {}", e);
        anyhow::bail!("detector unavailable: {}", e);
    }
    log::info!("✅ Detector ready ({})", backend);

    let inference_size: u32 = env::var("INFERENCE_SIZE")
        .unwrap_or_else(|_| "640".to_string())
        .parse()
        .expect("INFERENCE_SIZE must be a positive integer");

    let handler = Arc::new(AnalysisHandler::new(detector, table, inference_size));
    log::info!("✅ Analysis handler initialized");

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let app = create_router(handler);

    log::info!("🌐 Server starting on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("🛑 Shutting down...");
        })
        .await?;

    Ok(())
}
