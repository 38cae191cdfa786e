use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryEmailLog, InMemoryNotificationRepository, InMemoryOrderRepository,
    InMemoryPreferenceRepository, InMemorySubmissionRepository,
};
use crate::routes::{application_router, AppServices};
use crate::seed::SeedData;
use axum_prometheus::PrometheusMetricLayer;
use charity_market::assistant::ListingAssistant;
use charity_market::config::{AppConfig, AssistantProvider, ModerationConfig};
use charity_market::email::{EmailDispatcher, EmailNotificationService};
use charity_market::error::AppError;
use charity_market::listing::{ModelPricingAssistant, ModerationGate, SubmissionModerationService};
use charity_market::payments::PaymentService;
use charity_market::providers::{
    http_client, ChatModel, GeminiClient, OpenAiCompatibleClient, ResendClient, StripeClient,
};
use charity_market::telemetry;
use charity_market::vision::ProductImageAnalyzer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(seed) = args.seed.take() {
        config.storage.seed_path = Some(seed);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let seed = SeedData::load(config.storage.seed_path.as_deref())?;
    if seed.is_empty() {
        warn!("no seed data loaded; submission and order lookups will answer 404");
    } else {
        info!(
            submissions = seed.submissions.len(),
            orders = seed.orders.len(),
            preferences = seed.preferences.len(),
            "seeded in-memory stores"
        );
    }

    let services = build_services(&config, seed)?;
    let app = application_router(services, app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        assistant = ?config.providers.assistant_provider,
        "charity market api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn moderation_gate(config: &ModerationConfig) -> ModerationGate {
    match &config.denylist_override {
        Some(terms) => ModerationGate::new(terms.iter().map(String::as_str)),
        None => ModerationGate::default(),
    }
}

/// Provider clients plus in-memory storage; storage is the external database in production.
pub(crate) fn build_services(config: &AppConfig, seed: SeedData) -> Result<AppServices, AppError> {
    let providers = &config.providers;
    let http = http_client(providers.request_timeout)?;

    let openai = OpenAiCompatibleClient::openai(providers, http.clone());
    let gemini = GeminiClient::new(providers, http.clone());
    let assistant: Arc<dyn ChatModel> = match providers.assistant_provider {
        AssistantProvider::Groq => Arc::new(OpenAiCompatibleClient::groq(providers, http.clone())),
        AssistantProvider::OpenAi => Arc::new(openai.clone()),
        AssistantProvider::Gemini => Arc::new(gemini.clone()),
    };

    let submissions = Arc::new(InMemorySubmissionRepository::default());
    let orders = Arc::new(InMemoryOrderRepository::default());
    let preferences = Arc::new(InMemoryPreferenceRepository::default());
    seed.apply(&submissions, &orders, &preferences);

    let moderation = SubmissionModerationService::new(
        Arc::new(moderation_gate(&config.moderation)),
        Arc::new(ModelPricingAssistant::new(Arc::new(openai.clone()))),
        submissions.clone(),
        Arc::new(InMemoryNotificationRepository::default()),
    )
    .with_fallback_price(config.moderation.fallback_price);

    let payments = PaymentService::new(
        Arc::new(StripeClient::new(providers, http.clone())),
        orders.clone(),
        providers.stripe_currency.clone(),
        providers.max_payment_amount,
    );

    let email = EmailNotificationService::new(
        EmailDispatcher::new(
            Arc::new(ResendClient::new(providers, http)),
            preferences,
            Arc::new(InMemoryEmailLog::default()),
        ),
        orders,
        submissions,
        providers.stripe_currency.clone(),
    );

    Ok(AppServices {
        moderation: Arc::new(moderation),
        assistant: Arc::new(ListingAssistant::new(assistant)),
        vision_openai: Arc::new(ProductImageAnalyzer::new(Arc::new(openai))),
        vision_gemini: Arc::new(ProductImageAnalyzer::new(Arc::new(gemini))),
        payments: Arc::new(payments),
        email: Arc::new(email),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use charity_market::config::{
        AppEnvironment, ProviderConfig, ServerConfig, StorageConfig, TelemetryConfig,
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::{json, Value};
    use std::path::Path;
    use std::time::Duration;
    use tower::ServiceExt;

    /// Configuration with no provider keys, so nothing leaves the process.
    fn offline_config() -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            providers: ProviderConfig {
                openai_api_key: None,
                openai_base_url: "https://api.openai.com/v1".to_string(),
                openai_model: "gpt-4o-mini".to_string(),
                openai_vision_model: "gpt-4o".to_string(),
                groq_api_key: None,
                groq_model: "llama-3.3-70b-versatile".to_string(),
                gemini_api_key: None,
                gemini_model: "gemini-2.0-flash".to_string(),
                assistant_provider: AssistantProvider::Groq,
                stripe_secret_key: None,
                stripe_currency: "usd".to_string(),
                max_payment_amount: 10000.0,
                resend_api_key: None,
                email_from: "Charity Market <noreply@charity.market>".to_string(),
                request_timeout: Duration::from_secs(5),
            },
            moderation: ModerationConfig {
                denylist_override: None,
                fallback_price: 10.0,
            },
            storage: StorageConfig::default(),
        }
    }

    fn seeded_router() -> Router {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/seed.json");
        let seed = SeedData::load(Some(fixture.as_path())).expect("fixture parses");
        let services = build_services(&offline_config(), seed).expect("services build");
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        application_router(services, state)
    }

    async fn post(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds");
        let response = router.oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn seeded_submission_is_moderated_through_the_live_wiring() {
        let router = seeded_router();

        let (status, body) = post(
            router.clone(),
            "/moderate-submission",
            json!({
                "submission_id": "sub-2",
                "title": "Picture books bundle",
                "category": "Books",
                "user_price": 0.0
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["approved"], json!(true));
        assert_eq!(body["suggested_price"], json!(0.0));
        assert_eq!(body["pricing_confidence"], json!("low"));

        let (status, _) = post(
            router,
            "/moderate-submission",
            json!({ "submission_id": "sub-404", "title": "Lamp" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn seeded_order_reaches_the_payment_gateway() {
        let (status, body) = post(
            seeded_router(),
            "/create-payment-intent",
            json!({ "amount": 15.0, "orderId": "order-1" }),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .is_some_and(|message| message.contains("STRIPE_SECRET_KEY")));
    }

    #[tokio::test]
    async fn seeded_preferences_skip_listing_mail() {
        let (status, body) = post(
            seeded_router(),
            "/send-listing-status-email",
            json!({ "submissionId": "sub-2" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "skipped": true }));
    }

    #[test]
    fn denylist_override_replaces_defaults() {
        let gate = moderation_gate(&ModerationConfig {
            denylist_override: Some(vec!["Fireworks".to_string()]),
            fallback_price: 10.0,
        });
        assert!(!gate.evaluate("box of fireworks").approved);
        assert!(gate.evaluate("craft beer glasses").approved);

        let default_gate = moderation_gate(&ModerationConfig {
            denylist_override: None,
            fallback_price: 10.0,
        });
        assert!(!default_gate.evaluate("craft beer glasses").approved);
    }
}
