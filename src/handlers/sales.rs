// src/handlers/sales.rs
//
// Um handler por relatório: valida parâmetros, monta o SqlFilter do
// endpoint (a semântica do limite de data varia por relatório e é mantida
// assim de propósito) e delega ao serviço.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::Query;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::{dates::parse_opt_date, error::AppError},
    config::AppState,
    db::SqlFilter,
    models::sales::{
        AnomalyReport, DailySalesPoint, DeliveryHeatCell, DeliveryRegion, HourlyTrendingBucket,
        LostCustomer, MonthlySalesPoint, NotSellingProduct, PaymentMixEntry, ProductMargin,
        RecentSale, SalesOverview, TicketAvg, TopCustomization, TopProduct, TopStats,
        TrendingProduct,
    },
    services::sales_service::previous_window,
};

// =============================================================================
//  Overview e rankings (filtro por nome de canal)
// =============================================================================

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OverviewParams {
    /// YYYY-MM-DD (início inclusivo)
    pub start: Option<String>,
    /// YYYY-MM-DD (fim exclusivo)
    pub end: Option<String>,
    #[serde(default)]
    pub store_id: Option<Vec<i32>>,
    #[serde(default)]
    pub channel_name: Option<Vec<String>>,
}

// GET /api/sales/overview
#[utoipa::path(
    get,
    path = "/api/sales/overview",
    tag = "Sales",
    params(OverviewParams),
    responses(
        (status = 200, description = "Faturamento, pedidos, ticket médio e tempos médios", body = SalesOverview),
        (status = 400, description = "Parâmetro inválido")
    )
)]
pub async fn sales_overview(
    State(app_state): State<AppState>,
    Query(params): Query<OverviewParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let start = parse_opt_date(&params.start)?;
    let end = parse_opt_date(&params.end)?;

    let filter = SqlFilter::completed()
        .date_from(start)
        .date_before(end)
        .store_ids(params.store_id)
        .channel_names(params.channel_name);

    let overview = app_state.sales_service.overview(&filter).await?;
    Ok((StatusCode::OK, Json(overview)))
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RankedParams {
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub store_id: Option<Vec<i32>>,
    #[serde(default)]
    pub channel_name: Option<Vec<String>>,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
}

impl RankedParams {
    fn filter(&self) -> Result<SqlFilter, AppError> {
        Ok(SqlFilter::completed()
            .date_from(parse_opt_date(&self.start)?)
            .date_before(parse_opt_date(&self.end)?)
            .store_ids(self.store_id.clone())
            .channel_names(self.channel_name.clone()))
    }
}

// GET /api/sales/products/top
#[utoipa::path(
    get,
    path = "/api/sales/products/top",
    tag = "Sales",
    params(RankedParams),
    responses(
        (status = 200, description = "Produtos mais vendidos por receita", body = Vec<TopProduct>)
    )
)]
pub async fn top_products(
    State(app_state): State<AppState>,
    Query(params): Query<RankedParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let filter = params.filter()?;
    let products = app_state
        .sales_service
        .top_products(&filter, params.limit.unwrap_or(10))
        .await?;
    Ok((StatusCode::OK, Json(products)))
}

// GET /api/sales/customizations/top
#[utoipa::path(
    get,
    path = "/api/sales/customizations/top",
    tag = "Sales",
    params(RankedParams),
    responses(
        (status = 200, description = "Customizações mais adicionadas", body = Vec<TopCustomization>)
    )
)]
pub async fn top_customizations(
    State(app_state): State<AppState>,
    Query(params): Query<RankedParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let filter = params.filter()?;
    let customizations = app_state
        .sales_service
        .top_customizations(&filter, params.limit.unwrap_or(20))
        .await?;
    Ok((StatusCode::OK, Json(customizations)))
}

// GET /api/sales/products/margin
#[utoipa::path(
    get,
    path = "/api/sales/products/margin",
    tag = "Sales",
    params(RankedParams),
    responses(
        (status = 200, description = "Margem por produto (custo aproximado pelo base_price)", body = Vec<ProductMargin>)
    )
)]
pub async fn products_margin(
    State(app_state): State<AppState>,
    Query(params): Query<RankedParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let filter = params.filter()?;
    let margins = app_state
        .sales_service
        .product_margins(&filter, params.limit.unwrap_or(20))
        .await?;
    Ok((StatusCode::OK, Json(margins)))
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RegionParams {
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub store_id: Option<Vec<i32>>,
    #[serde(default)]
    pub channel_name: Option<Vec<String>>,
    #[validate(range(min = 1))]
    pub min_orders: Option<i64>,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
}

// GET /api/sales/delivery/regions
#[utoipa::path(
    get,
    path = "/api/sales/delivery/regions",
    tag = "Sales",
    params(RegionParams),
    responses(
        (status = 200, description = "Entregas e tempo médio por cidade/bairro", body = Vec<DeliveryRegion>)
    )
)]
pub async fn delivery_regions(
    State(app_state): State<AppState>,
    Query(params): Query<RegionParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let filter = SqlFilter::completed()
        .date_from(parse_opt_date(&params.start)?)
        .date_before(parse_opt_date(&params.end)?)
        .store_ids(params.store_id)
        .channel_names(params.channel_name);

    let regions = app_state
        .sales_service
        .delivery_regions(
            &filter,
            params.min_orders.unwrap_or(10),
            params.limit.unwrap_or(100),
        )
        .await?;
    Ok((StatusCode::OK, Json(regions)))
}

// GET /api/sales/payment/mix
#[utoipa::path(
    get,
    path = "/api/sales/payment/mix",
    tag = "Sales",
    params(OverviewParams),
    responses(
        (status = 200, description = "Mix de pagamento por tipo", body = Vec<PaymentMixEntry>)
    )
)]
pub async fn payment_mix(
    State(app_state): State<AppState>,
    Query(params): Query<OverviewParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let filter = SqlFilter::completed()
        .date_from(parse_opt_date(&params.start)?)
        .date_before(parse_opt_date(&params.end)?)
        .store_ids(params.store_id)
        .channel_names(params.channel_name);

    let mix = app_state.sales_service.payment_mix(&filter).await?;
    Ok((StatusCode::OK, Json(mix)))
}

// =============================================================================
//  Séries temporais (filtro por id de canal)
// =============================================================================

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SeriesParams {
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub store_id: Option<Vec<i32>>,
    #[serde(default)]
    pub channel_id: Option<Vec<i32>>,
    /// true = mesmo período anterior (mesma duração, deslocado para trás)
    pub previous: Option<bool>,
}

// GET /api/sales/timeseries/daily
#[utoipa::path(
    get,
    path = "/api/sales/timeseries/daily",
    tag = "Sales",
    params(SeriesParams),
    responses(
        (status = 200, description = "Vendas por dia, canal e loja", body = Vec<DailySalesPoint>)
    )
)]
pub async fn timeseries_daily(
    State(app_state): State<AppState>,
    Query(params): Query<SeriesParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let mut start = parse_opt_date(&params.start)?;
    let mut end = parse_opt_date(&params.end)?;

    // período anterior: desloca as duas pontas pela própria duração
    if params.previous.unwrap_or(false)
        && let (Some(s), Some(e)) = (start, end)
    {
        let (prev_start, prev_end) = previous_window(s, e);
        start = Some(prev_start);
        end = Some(prev_end);
    }

    // limites inclusivos nas duas pontas, como sempre foi neste relatório
    let filter = SqlFilter::completed()
        .date_from(start)
        .date_until(end)
        .store_ids(params.store_id)
        .channel_ids(params.channel_id);

    let series = app_state.sales_service.timeseries_daily(&filter).await?;
    Ok((StatusCode::OK, Json(series)))
}

// GET /api/sales/timeseries/monthly
#[utoipa::path(
    get,
    path = "/api/sales/timeseries/monthly",
    tag = "Sales",
    params(SeriesParams),
    responses(
        (status = 200, description = "Vendas por mês, canal e loja", body = Vec<MonthlySalesPoint>)
    )
)]
pub async fn timeseries_monthly(
    State(app_state): State<AppState>,
    Query(params): Query<SeriesParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let filter = SqlFilter::completed()
        .date_from(parse_opt_date(&params.start)?)
        .date_before(parse_opt_date(&params.end)?)
        .store_ids(params.store_id)
        .channel_ids(params.channel_id);

    let series = app_state.sales_service.timeseries_monthly(&filter).await?;
    Ok((StatusCode::OK, Json(series)))
}

// =============================================================================
//  Anomalias, topstats e vendas recentes
// =============================================================================

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnomalyParams {
    #[validate(range(min = 1))]
    pub min_orders_threshold: Option<i64>,
}

// GET /api/sales/anomaly-detection
#[utoipa::path(
    get,
    path = "/api/sales/anomaly-detection",
    tag = "Sales",
    params(AnomalyParams),
    responses(
        (status = 200, description = "Semanas com receita além de 2 desvios padrão", body = AnomalyReport)
    )
)]
pub async fn anomaly_detection(
    State(app_state): State<AppState>,
    Query(params): Query<AnomalyParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let report = app_state
        .sales_service
        .anomaly_detection(params.min_orders_threshold.unwrap_or(50))
        .await?;
    Ok((StatusCode::OK, Json(report)))
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopStatsParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

// GET /api/sales/topstats
#[utoipa::path(
    get,
    path = "/api/sales/topstats",
    tag = "Sales",
    params(TopStatsParams),
    responses(
        (status = 200, description = "Receita do período e variação contra o anterior", body = TopStats)
    )
)]
pub async fn topstats(
    State(app_state): State<AppState>,
    Query(params): Query<TopStatsParams>,
) -> Result<impl IntoResponse, AppError> {
    let start = parse_opt_date(&params.start)?;
    let end = parse_opt_date(&params.end)?;
    let stats = app_state.sales_service.topstats(start, end).await?;
    Ok((StatusCode::OK, Json(stats)))
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentParams {
    /// YYYY-MM-DD (obrigatório)
    pub start: String,
    /// YYYY-MM-DD (obrigatório, inclusivo)
    pub end: String,
    #[serde(default)]
    pub store_id: Option<Vec<i32>>,
    #[serde(default)]
    pub channel_id: Option<Vec<i32>>,
    /// ex.: COMPLETED, CANCELED (normalizado para maiúsculo)
    #[serde(default)]
    pub status: Option<Vec<String>>,
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

// GET /api/sales/recent
#[utoipa::path(
    get,
    path = "/api/sales/recent",
    tag = "Sales",
    params(RecentParams),
    responses(
        (status = 200, description = "Últimas vendas com cliente, canal, status e produtos", body = Vec<RecentSale>),
        (status = 400, description = "Parâmetro inválido")
    )
)]
pub async fn recent_orders(
    State(app_state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let start = parse_opt_date(&Some(params.start.clone()))?;
    let end = parse_opt_date(&Some(params.end.clone()))?;

    let filter = SqlFilter::any()
        .date_between(start, end)
        .store_ids(params.store_id)
        .channel_ids(params.channel_id)
        .statuses(params.status);

    let sales = app_state
        .sales_service
        .recent_sales(
            &filter,
            params.limit.unwrap_or(20),
            params.offset.unwrap_or(0),
        )
        .await?;
    Ok((StatusCode::OK, Json(sales)))
}

// =============================================================================
//  Clientes, ticket e entrega
// =============================================================================

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LostCustomersParams {
    #[validate(range(min = 1))]
    pub min_orders: Option<i64>,
    #[validate(range(min = 1))]
    pub inactive_days: Option<i32>,
}

// GET /api/sales/customers/lost
#[utoipa::path(
    get,
    path = "/api/sales/customers/lost",
    tag = "Sales",
    params(LostCustomersParams),
    responses(
        (status = 200, description = "Clientes recorrentes inativos há N dias", body = Vec<LostCustomer>)
    )
)]
pub async fn lost_customers(
    State(app_state): State<AppState>,
    Query(params): Query<LostCustomersParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let customers = app_state
        .sales_service
        .lost_customers(
            params.min_orders.unwrap_or(3),
            params.inactive_days.unwrap_or(30),
        )
        .await?;
    Ok((StatusCode::OK, Json(customers)))
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TicketParams {
    #[serde(default)]
    pub store_id: Option<Vec<i32>>,
    #[serde(default)]
    pub channel_id: Option<Vec<i32>>,
}

// GET /api/sales/ticket
#[utoipa::path(
    get,
    path = "/api/sales/ticket",
    tag = "Sales",
    params(TicketParams),
    responses(
        (status = 200, description = "Ticket médio por loja e canal", body = Vec<TicketAvg>)
    )
)]
pub async fn ticket_avg(
    State(app_state): State<AppState>,
    Query(params): Query<TicketParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = SqlFilter::any()
        .store_ids(params.store_id)
        .channel_ids(params.channel_id);

    let tickets = app_state.sales_service.ticket_avg(&filter).await?;
    Ok((StatusCode::OK, Json(tickets)))
}

// GET /api/sales/delivery/performance
#[utoipa::path(
    get,
    path = "/api/sales/delivery/performance",
    tag = "Sales",
    params(SeriesParams),
    responses(
        (status = 200, description = "Tempo médio de entrega por dia da semana e hora", body = Vec<DeliveryHeatCell>)
    )
)]
pub async fn delivery_performance(
    State(app_state): State<AppState>,
    Query(params): Query<SeriesParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let filter = SqlFilter::any()
        .raw("s.delivery_seconds IS NOT NULL")
        .date_between(parse_opt_date(&params.start)?, parse_opt_date(&params.end)?)
        .store_ids(params.store_id)
        .channel_ids(params.channel_id);

    let cells = app_state.sales_service.delivery_performance(&filter).await?;
    Ok((StatusCode::OK, Json(cells)))
}

// =============================================================================
//  Trending e produtos parados
// =============================================================================

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendingParams {
    pub start: Option<String>,
    pub end: Option<String>,
    /// 0 = domingo ... 6 = sábado
    #[validate(range(min = 0, max = 6))]
    pub weekday: Option<i32>,
    #[validate(range(min = 0, max = 23))]
    pub start_hour: Option<i32>,
    #[validate(range(min = 0, max = 23))]
    pub end_hour: Option<i32>,
    #[serde(default)]
    pub store_id: Option<Vec<i32>>,
    #[serde(default)]
    pub channel_id: Option<Vec<i32>>,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
}

// GET /api/sales/products/trending
#[utoipa::path(
    get,
    path = "/api/sales/products/trending",
    tag = "Sales",
    params(TrendingParams),
    responses(
        (status = 200, description = "Produtos mais vendidos por período, dia da semana e horário", body = Vec<TrendingProduct>)
    )
)]
pub async fn trending_products(
    State(app_state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let filter = SqlFilter::any()
        .date_between(parse_opt_date(&params.start)?, parse_opt_date(&params.end)?)
        .weekday(params.weekday)
        .hour_between(params.start_hour, params.end_hour)
        .store_ids(params.store_id)
        .channel_ids(params.channel_id);

    let products = app_state
        .sales_service
        .trending_products(&filter, params.limit.unwrap_or(100))
        .await?;
    Ok((StatusCode::OK, Json(products)))
}

// GET /api/sales/products/trending/hourly
#[utoipa::path(
    get,
    path = "/api/sales/products/trending/hourly",
    tag = "Sales",
    params(SeriesParams),
    responses(
        (status = 200, description = "Produto mais e menos vendido por bucket de horário", body = Vec<HourlyTrendingBucket>)
    )
)]
pub async fn trending_products_hourly(
    State(app_state): State<AppState>,
    Query(params): Query<SeriesParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;
    let buckets = app_state
        .sales_service
        .hourly_trending(
            parse_opt_date(&params.start)?,
            parse_opt_date(&params.end)?,
            params.store_id,
            params.channel_id,
        )
        .await?;
    Ok((StatusCode::OK, Json(buckets)))
}

// GET /api/sales/products/not-selling
#[utoipa::path(
    get,
    path = "/api/sales/products/not-selling",
    tag = "Sales",
    params(TicketParams),
    responses(
        (status = 200, description = "Produtos sem venda há mais de 30 dias", body = Vec<NotSellingProduct>)
    )
)]
pub async fn products_not_selling(
    State(app_state): State<AppState>,
    Query(params): Query<TicketParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = SqlFilter::any()
        .store_ids(params.store_id)
        .channel_ids(params.channel_id);

    let products = app_state
        .sales_service
        .not_selling_products(&filter)
        .await?;
    Ok((StatusCode::OK, Json(products)))
}
