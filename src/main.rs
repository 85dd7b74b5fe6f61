use std::sync::Arc;

use attendance::config::AppConfig;
use attendance::net::api::RouteLog;
use attendance::net::firestore::FirestoreClient;
use attendance::pages::dashboard::{Dashboard, DashboardDeps};
use attendance::scan::engine::ScanConfig;
use attendance::scan::headless::NoCamera;
use attendance::services::auth::SessionAuth;
use attendance::services::qr::UrlQrGenerator;
use attendance::state::dashboard::{QrView, RecordsView, Tab};
use chrono::FixedOffset;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    let session = Arc::new(RwLock::new(config.session.clone()));
    let firestore = Arc::new(FirestoreClient::new(config.firestore.clone(), config.timeouts, Arc::clone(&session))?);
    let routes = RouteLog::new();

    let deps = DashboardDeps {
        auth: Arc::new(SessionAuth::new(Arc::clone(&session), Arc::clone(&firestore))),
        store: firestore,
        qr: Arc::new(UrlQrGenerator::new(config.qr.clone())),
        navigator: Arc::new(routes.clone()),
        scanner: Arc::new(NoCamera),
        attendance_collection: config.firestore.attendance_collection.clone(),
        scan_config: ScanConfig::default(),
    };

    let mut dashboard = Dashboard::new(deps);
    dashboard.load().await;

    if let Some(route) = routes.last() {
        tracing::info!(%route, "redirected; nothing to show");
        return Ok(());
    }

    let state = dashboard.snapshot().await;
    if let Some(error) = &state.error {
        tracing::error!(%error, "dashboard failed to load");
        return Ok(());
    }
    if let Some(profile) = &state.profile {
        tracing::info!(id_number = %profile.id_number, email = %profile.email, role = ?profile.role, "profile loaded");
    }
    match state.qr_view() {
        QrView::Image(src) => tracing::info!(%src, "qr code ready"),
        QrView::Failed(message) => tracing::warn!(%message, "qr code unavailable"),
    }

    let offset = FixedOffset::east_opt(0).ok_or("invalid display offset")?;
    match state.records_view(&offset) {
        RecordsView::Loading => tracing::info!("attendance records still loading"),
        RecordsView::Error(error) => tracing::error!(%error, "attendance records unavailable"),
        RecordsView::Empty(message) => tracing::info!(%message),
        RecordsView::Rows(rows) => {
            for row in rows {
                tracing::info!(date = %row.date, time = %row.time, status = %row.status, "attendance");
            }
        }
    }

    // An admin may pass an ID number to record it through the manual scan path.
    if let Some(code) = std::env::args().nth(1) {
        record_manual_scan(&mut dashboard, &code).await;
    }

    dashboard.shutdown().await;
    Ok(())
}

async fn record_manual_scan(dashboard: &mut Dashboard, code: &str) {
    if !dashboard.select_tab(Tab::Scan).await {
        tracing::warn!("scanning requires an administrator profile");
        return;
    }
    let Some(scanner) = dashboard.scanner() else {
        return;
    };
    scanner.set_manual_code(code);
    if !scanner.submit_manual().await {
        let view = scanner.view();
        tracing::warn!(error = ?view.error_message(), "manual scan rejected");
        return;
    }
    let recorded = dashboard.snapshot().await.scan_result;
    tracing::info!(scan_result = ?recorded, "manual scan recorded");
}
