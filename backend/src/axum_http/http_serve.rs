use crate::{
    auth::AuthSettings,
    axum_http::{
        default_routers,
        routers::{self, admin::AdminState},
    },
    config::config_model::DotEnvyConfig,
    usecases::{
        admin::AdminUseCase,
        coupons::CouponUseCase,
        estimates::EstimateUseCase,
        geocoding::GeocodingUseCase,
        gift_cards::GiftCardUseCase,
        notifications::{NotificationSettings, OrderNotifier},
        orders::{CheckoutServices, OrderUseCase},
        products::ProductCatalogUseCase,
        whatsapp_webhook::WhatsappWebhookUseCase,
    },
};
use anyhow::Result;
use axum::{
    Extension, Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use crates::infra::{
    db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            discount_codes::DiscountCodePostgres, gift_cards::GiftCardPostgres,
            orders::OrderPostgres, outgoing_messages::OutgoingMessagePostgres,
            products::ProductPostgres, profiles::ProfilePostgres,
            store_settings::StoreSettingsPostgres, whatsapp_messages::WhatsappMessagePostgres,
        },
    },
    geocoding::google_places::{GooglePlacesClient, GooglePlacesConfig},
    whatsapp::cloud_api_client::{WhatsAppCloudClient, WhatsAppCloudConfig},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let business = &config.business;

    let messaging_client = Arc::new(WhatsAppCloudClient::new(WhatsAppCloudConfig {
        api_base_url: config.whatsapp.api_base_url.clone(),
        phone_number_id: config.whatsapp.phone_number_id.clone(),
        access_token: config.whatsapp.access_token.clone(),
    })?);

    let geocoding_client = match config.geocoding.api_key.clone() {
        Some(api_key) => Some(Arc::new(GooglePlacesClient::new(GooglePlacesConfig {
            api_key,
            country: config.geocoding.country.clone(),
            language: config.geocoding.language.clone(),
        })?)),
        None => {
            warn!("GEOCODING_API_KEY is not set, autocomplete and zone geocoding are disabled");
            None
        }
    };

    let order_repository = Arc::new(OrderPostgres::new(Arc::clone(&db_pool)));
    let product_repository = Arc::new(ProductPostgres::new(Arc::clone(&db_pool)));

    // One catalog instance so admin toggles invalidate the cache the menu reads.
    let product_catalog_usecase = Arc::new(ProductCatalogUseCase::new(
        Arc::clone(&product_repository),
        business.product_cache_ttl,
    ));
    let estimate_usecase = Arc::new(EstimateUseCase::new(
        Arc::new(StoreSettingsPostgres::new(Arc::clone(&db_pool))),
        business.utc_offset,
    ));
    let coupon_usecase = Arc::new(CouponUseCase::new(
        Arc::new(DiscountCodePostgres::new(Arc::clone(&db_pool))),
        Arc::new(ProfilePostgres::new(Arc::clone(&db_pool))),
        business.utc_offset,
        business.birthday_discount_percent,
    ));
    let gift_card_usecase = Arc::new(GiftCardUseCase::new(Arc::new(GiftCardPostgres::new(
        Arc::clone(&db_pool),
    ))));
    let geocoding_usecase = Arc::new(GeocodingUseCase::new(
        geocoding_client,
        business.delivery_zone,
    ));
    let notifier = Arc::new(OrderNotifier::new(
        Arc::clone(&messaging_client),
        NotificationSettings {
            order_template: config.notifications.order_template.clone(),
            template_language: config.notifications.template_language.clone(),
            staff_phone: config.notifications.staff_phone.clone(),
            restaurant_phone: config.notifications.restaurant_phone.clone(),
            default_country_code: config.notifications.default_country_code.clone(),
        },
    ));

    let order_usecase = Arc::new(OrderUseCase::new(
        Arc::clone(&product_repository),
        Arc::clone(&order_repository),
        CheckoutServices {
            coupons: Arc::clone(&coupon_usecase),
            gift_cards: Arc::clone(&gift_card_usecase),
            estimates: Arc::clone(&estimate_usecase),
            geocoding: Arc::clone(&geocoding_usecase),
            notifier,
        },
        business.delivery_fee_minor,
        config.notifications.default_country_code.clone(),
    ));

    let webhook_usecase = Arc::new(WhatsappWebhookUseCase::new(
        Arc::new(WhatsappMessagePostgres::new(Arc::clone(&db_pool))),
        config.whatsapp.verify_token.clone(),
        config.whatsapp.app_secret.clone(),
    ));
    if config.whatsapp.app_secret.is_none() {
        warn!("WHATSAPP_APP_SECRET is not set, webhook signatures will not be verified");
    }

    let admin_state = AdminState {
        admin: Arc::new(AdminUseCase::new(
            Arc::clone(&order_repository),
            Arc::new(WhatsappMessagePostgres::new(Arc::clone(&db_pool))),
            Arc::new(OutgoingMessagePostgres::new(Arc::clone(&db_pool))),
            config.notifications.default_country_code.clone(),
        )),
        products: Arc::clone(&product_catalog_usecase),
        estimates: Arc::clone(&estimate_usecase),
        gift_cards: Arc::clone(&gift_card_usecase),
    };

    let auth_settings = Arc::new(AuthSettings {
        jwt_secret: config.supabase.jwt_secret.clone(),
        admin_emails: config.admin.emails.clone(),
    });

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/products",
            routers::products::routes(product_catalog_usecase),
        )
        .nest(
            "/api/v1/estimates",
            routers::estimates::routes(estimate_usecase),
        )
        .nest("/api/v1/orders", routers::orders::routes(order_usecase))
        .nest("/api/v1/coupons", routers::coupons::routes(coupon_usecase))
        .nest(
            "/api/v1/gift-cards",
            routers::gift_cards::routes(gift_card_usecase),
        )
        .nest(
            "/api/v1/geocoding",
            routers::geocoding::routes(geocoding_usecase),
        )
        .nest(
            "/api/v1/whatsapp/webhook",
            routers::whatsapp_webhook::routes(webhook_usecase),
        )
        .nest("/api/v1/admin", routers::admin::routes(admin_state))
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(Extension(auth_settings))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(
        stage = %config.stage,
        "Server is running on port {}", config.backend_server.port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
