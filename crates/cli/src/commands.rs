use std::sync::Arc;

use anyhow::Context;
use trafficeye_auth::{AuthService, FileStore, SupabaseClient, SupabaseConfig};
use trafficeye_core::location::{Coordinates, ResolvedLocation};
use trafficeye_events::AuthEventBus;
use trafficeye_pipeline::{Geocoder, GeocoderConfig, NominatimGeocoder};
use trafficeye_session::SessionController;
use trafficeye_vision::{ExtractionClient, GeminiApi, GeminiConfig, ViolationAnalyzer};

fn auth_service(store_path: &str) -> anyhow::Result<Arc<AuthService>> {
    let config = SupabaseConfig::from_env()?;
    tracing::info!(url = %config.url, store = store_path, "Loaded identity configuration");

    let provider = Arc::new(SupabaseClient::new(&config));
    let store = Arc::new(FileStore::new(store_path));
    Ok(Arc::new(AuthService::new(
        provider,
        store,
        Arc::new(AuthEventBus::default()),
        config.reset_redirect_to,
    )))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn analyze(image: &str) -> anyhow::Result<()> {
    let config = GeminiConfig::from_env()?;
    tracing::info!(model = %config.model, "Loaded vision configuration");

    let api = GeminiApi::new(&config).context("Failed to build vision client")?;
    let client = ExtractionClient::new(api).with_timeout(config.timeout);
    let result = client.analyze(image).await;

    print_json(&serde_json::json!({
        "result": result,
        "confidenceBand": format!("{:?}", result.confidence_band()),
    }))
}

pub async fn sign_in(store: &str, email: &str, password: &str) -> anyhow::Result<()> {
    let auth = auth_service(store)?;
    let session = auth.sign_in(email, password).await?;
    tracing::info!(user_id = %session.user.id, "Session stored");
    route_with(auth).await
}

pub async fn sign_in_badge(store: &str, badge: &str, password: &str) -> anyhow::Result<()> {
    let auth = auth_service(store)?;
    let session = auth.sign_in_with_badge(badge, password).await?;
    tracing::info!(user_id = %session.user.id, "Session stored");
    route_with(auth).await
}

pub async fn sign_out(store: &str) -> anyhow::Result<()> {
    auth_service(store)?.sign_out().await?;
    Ok(())
}

pub async fn reset_password(store: &str, email: &str) -> anyhow::Result<()> {
    auth_service(store)?.reset_password(email).await?;
    println!("Password reset email sent to {}", email.trim());
    Ok(())
}

pub async fn geocode(lat: f64, lon: f64) -> anyhow::Result<()> {
    let geocoder = NominatimGeocoder::new(&GeocoderConfig::from_env()?)?;
    let coordinates = Coordinates::new(lat, lon);

    let location = match geocoder.reverse_geocode(coordinates).await {
        Ok(candidates) => ResolvedLocation::from_candidates(coordinates, &candidates),
        Err(e) => {
            tracing::warn!(error = %e, "Reverse geocoding failed, using coordinates");
            ResolvedLocation::fallback(coordinates)
        }
    };
    print_json(&location)
}

pub async fn onboard(store: &str) -> anyhow::Result<()> {
    let auth = auth_service(store)?;
    let handle = SessionController::new(auth).start().await;
    handle.controller().acknowledge_onboarding().await?;
    print_route(handle.controller())?;
    handle.shutdown().await;
    Ok(())
}

pub async fn route(store: &str) -> anyhow::Result<()> {
    route_with(auth_service(store)?).await
}

async fn route_with(auth: Arc<AuthService>) -> anyhow::Result<()> {
    let handle = SessionController::new(auth).start().await;
    print_route(handle.controller())?;
    handle.shutdown().await;
    Ok(())
}

fn print_route(controller: &SessionController) -> anyhow::Result<()> {
    let snapshot = controller.snapshot();
    print_json(&serde_json::json!({
        "view": snapshot.view,
        "entryScreen": snapshot.view.entry_screen(),
        "authScreens": snapshot.view.auth_screens(),
        "user": snapshot.user,
        "role": snapshot.profile.as_ref().map(|p| p.role),
        "points": snapshot.profile.as_ref().and_then(|p| p.points_balance()),
        "referralCode": snapshot.profile.as_ref().and_then(|p| p.referral_code()),
    }))
}
