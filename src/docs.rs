// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Restaurant Analytics API",
        description = "🚀 Analytics Foodservice Backend API",
        version = "0.1.0"
    ),
    paths(
        // --- Metadata ---
        handlers::metadata::get_stores,
        handlers::metadata::get_channels,
        handlers::metadata::get_customers,

        // --- Sales ---
        handlers::sales::sales_overview,
        handlers::sales::top_products,
        handlers::sales::top_customizations,
        handlers::sales::products_margin,
        handlers::sales::delivery_regions,
        handlers::sales::payment_mix,
        handlers::sales::timeseries_daily,
        handlers::sales::timeseries_monthly,
        handlers::sales::anomaly_detection,
        handlers::sales::topstats,
        handlers::sales::recent_orders,
        handlers::sales::lost_customers,
        handlers::sales::ticket_avg,
        handlers::sales::delivery_performance,
        handlers::sales::trending_products,
        handlers::sales::trending_products_hourly,
        handlers::sales::products_not_selling,

        // --- Insights ---
        handlers::insights::generate_insights,
    ),
    components(
        schemas(
            // --- Metadata ---
            models::metadata::Store,
            models::metadata::Channel,
            models::metadata::CustomerSummary,

            // --- Sales ---
            models::sales::SalesOverview,
            models::sales::TopProduct,
            models::sales::TopCustomization,
            models::sales::ProductMargin,
            models::sales::DeliveryRegion,
            models::sales::PaymentMixEntry,
            models::sales::DailySalesPoint,
            models::sales::MonthlySalesPoint,
            models::sales::AnomalyPoint,
            models::sales::AnomalyReport,
            models::sales::TopStats,
            models::sales::RecentSale,
            models::sales::RecentSaleProduct,
            models::sales::LostCustomer,
            models::sales::TicketAvg,
            models::sales::DeliveryHeatCell,
            models::sales::TrendingProduct,
            models::sales::BucketProduct,
            models::sales::HourlyTrendingBucket,
            models::sales::NotSellingProduct,

            // --- Insights ---
            models::insights::InsightsRequest,
            models::insights::InsightsResponse,
            models::insights::InsightBlocks,
            models::insights::TrendingSnapshot,
            models::insights::PerformanceSnapshot,
            models::insights::RiskSnapshot,
            models::insights::ProductRef,
            models::insights::StalledProduct,
        )
    )
)]
pub struct ApiDoc;
