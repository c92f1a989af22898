// src/services/sales_service.rs
//
// Camada entre handlers e repositório. A maior parte delega direto; a
// lógica que roda em processo mora aqui: estatística de anomalias, janela
// do período anterior, margem e montagem das vendas recentes.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::{
    common::error::AppError,
    db::{SalesRepository, SqlFilter},
    models::sales::{
        AnomalyPoint, AnomalyReport, DailySalesPoint, DeliveryHeatCell, DeliveryRegion,
        HourlyTrendingBucket, LostCustomer, MonthlySalesPoint, NotSellingProduct,
        PaymentMixEntry, ProductMargin, ProductMarginRow, RecentLineItemRow, RecentSale,
        RecentSaleProduct, RecentSaleRow, SalesOverview, TicketAvg, TopCustomization,
        TopProduct, TopStats, TrendingProduct, WeeklyRevenue,
    },
};

// Buckets fixos do dia para o trending por horário.
pub const HOUR_BUCKETS: [(i32, i32); 6] = [(0, 6), (6, 11), (11, 15), (15, 19), (19, 23), (23, 24)];

/// Janela anterior de mesma duração: [start - (end-start), end - (end-start)].
pub fn previous_window(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let len = end - start;
    (start - len, end - len)
}

/// Média e desvio padrão populacional sobre TODAS as semanas; uma semana só
/// vira anomalia se tiver pedidos suficientes E a receita passar de 2σ
/// (estritamente) da média.
pub fn detect_anomalies(weeks: &[WeeklyRevenue], min_orders_threshold: i64) -> AnomalyReport {
    if weeks.is_empty() {
        return AnomalyReport::Empty {
            message: "No data available".to_string(),
        };
    }

    let revenues: Vec<f64> = weeks
        .iter()
        .map(|w| w.revenue.to_f64().unwrap_or(0.0))
        .collect();
    let n = revenues.len() as f64;
    let mean = revenues.iter().sum::<f64>() / n;
    let std_dev = (revenues.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();

    let mut anomalies = Vec::new();
    for (week, revenue) in weeks.iter().zip(&revenues) {
        if week.orders < min_orders_threshold {
            continue;
        }
        if *revenue > mean + 2.0 * std_dev {
            anomalies.push(AnomalyPoint {
                week: week.week,
                kind: "peak".to_string(),
                value: *revenue,
            });
        } else if *revenue < mean - 2.0 * std_dev {
            anomalies.push(AnomalyPoint {
                week: week.week,
                kind: "drop".to_string(),
                value: *revenue,
            });
        }
    }

    AnomalyReport::Stats {
        mean_revenue: mean,
        std_dev,
        anomalies,
    }
}

/// margem = receita - custo aproximado (quantity * base_price).
pub fn compute_margin(row: ProductMarginRow) -> ProductMargin {
    let margin = row.revenue - row.total_cost;
    ProductMargin {
        product_name: row.product_name,
        total_sold: row.total_sold,
        revenue: row.revenue,
        total_cost: row.total_cost,
        margin,
    }
}

/// Variação percentual arredondada em 2 casas; 0 quando não há base de comparação.
pub fn performance_pct(current: Decimal, previous: Decimal) -> Decimal {
    if previous > Decimal::ZERO {
        ((current - previous) / previous * Decimal::from(100)).round_dp(2)
    } else {
        Decimal::ZERO
    }
}

/// Agrupa os itens (já ordenados por sale_id) em cada venda da página.
pub fn attach_products(
    sales: Vec<RecentSaleRow>,
    items: Vec<RecentLineItemRow>,
) -> Vec<RecentSale> {
    let mut by_sale: HashMap<i64, Vec<RecentSaleProduct>> = HashMap::new();
    for item in items {
        by_sale.entry(item.sale_id).or_default().push(RecentSaleProduct {
            name: item.name,
            qty: item.qty,
            total: item.total,
        });
    }

    sales
        .into_iter()
        .map(|row| {
            let products = by_sale.remove(&row.sale_id).unwrap_or_default();
            RecentSale {
                sale_id: row.sale_id,
                date: row.date,
                amount: row.amount,
                customer: row.customer,
                channel: row.channel,
                store: row.store,
                status: row.status,
                products,
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct SalesService {
    repo: SalesRepository,
}

impl SalesService {
    pub fn new(repo: SalesRepository) -> Self {
        Self { repo }
    }

    pub async fn overview(&self, filter: &SqlFilter) -> Result<SalesOverview, AppError> {
        self.repo.overview(filter).await
    }

    pub async fn top_products(
        &self,
        filter: &SqlFilter,
        limit: i64,
    ) -> Result<Vec<TopProduct>, AppError> {
        self.repo.top_products(filter, limit).await
    }

    pub async fn top_customizations(
        &self,
        filter: &SqlFilter,
        limit: i64,
    ) -> Result<Vec<TopCustomization>, AppError> {
        self.repo.top_customizations(filter, limit).await
    }

    pub async fn delivery_regions(
        &self,
        filter: &SqlFilter,
        min_orders: i64,
        limit: i64,
    ) -> Result<Vec<DeliveryRegion>, AppError> {
        self.repo.delivery_regions(filter, min_orders, limit).await
    }

    pub async fn payment_mix(&self, filter: &SqlFilter) -> Result<Vec<PaymentMixEntry>, AppError> {
        self.repo.payment_mix(filter).await
    }

    pub async fn timeseries_daily(
        &self,
        filter: &SqlFilter,
    ) -> Result<Vec<DailySalesPoint>, AppError> {
        self.repo.timeseries_daily(filter).await
    }

    pub async fn timeseries_monthly(
        &self,
        filter: &SqlFilter,
    ) -> Result<Vec<MonthlySalesPoint>, AppError> {
        self.repo.timeseries_monthly(filter).await
    }

    pub async fn product_margins(
        &self,
        filter: &SqlFilter,
        limit: i64,
    ) -> Result<Vec<ProductMargin>, AppError> {
        let rows = self.repo.product_margins(filter, limit).await?;
        Ok(rows.into_iter().map(compute_margin).collect())
    }

    pub async fn anomaly_detection(
        &self,
        min_orders_threshold: i64,
    ) -> Result<AnomalyReport, AppError> {
        let weeks = self.repo.weekly_revenue().await?;
        Ok(detect_anomalies(&weeks, min_orders_threshold))
    }

    // Receita do período contra o período anterior de mesma duração; sem
    // datas, compara os últimos 30 dias com os 30 anteriores.
    pub async fn topstats(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<TopStats, AppError> {
        let (current, previous) = match (start, end) {
            (Some(start), Some(end)) => {
                let (prev_start, prev_end) = previous_window(start, end);
                let current = self.repo.revenue_between(start, end).await?;
                let previous = self.repo.revenue_between(prev_start, prev_end).await?;
                (current, previous)
            }
            _ => {
                let current = self.repo.revenue_rolling_window(30, 0).await?;
                let previous = self.repo.revenue_rolling_window(60, 30).await?;
                (current, previous)
            }
        };

        Ok(TopStats {
            sales: current,
            performance: performance_pct(current, previous),
        })
    }

    pub async fn recent_sales(
        &self,
        filter: &SqlFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RecentSale>, AppError> {
        let sales = self.repo.recent_sales(filter, limit, offset).await?;
        if sales.is_empty() {
            // página vazia: não dispara a busca de itens
            return Ok(Vec::new());
        }

        let sale_ids: Vec<i64> = sales.iter().map(|s| s.sale_id).collect();
        let items = self.repo.line_items_for_sales(&sale_ids).await?;
        Ok(attach_products(sales, items))
    }

    pub async fn lost_customers(
        &self,
        min_orders: i64,
        inactive_days: i32,
    ) -> Result<Vec<LostCustomer>, AppError> {
        self.repo.lost_customers(min_orders, inactive_days).await
    }

    pub async fn ticket_avg(&self, filter: &SqlFilter) -> Result<Vec<TicketAvg>, AppError> {
        self.repo.ticket_avg(filter).await
    }

    pub async fn delivery_performance(
        &self,
        filter: &SqlFilter,
    ) -> Result<Vec<DeliveryHeatCell>, AppError> {
        self.repo.delivery_performance(filter).await
    }

    pub async fn trending_products(
        &self,
        filter: &SqlFilter,
        limit: i64,
    ) -> Result<Vec<TrendingProduct>, AppError> {
        self.repo.trending_products(filter, limit).await
    }

    // Para cada bucket do dia, duas consultas extremais independentes.
    pub async fn hourly_trending(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        store_ids: Option<Vec<i32>>,
        channel_ids: Option<Vec<i32>>,
    ) -> Result<Vec<HourlyTrendingBucket>, AppError> {
        let mut results = Vec::with_capacity(HOUR_BUCKETS.len());

        for (start_hour, end_hour) in HOUR_BUCKETS {
            let filter = SqlFilter::any()
                .date_between(start, end)
                .hour_between(Some(start_hour), Some(end_hour - 1))
                .store_ids(store_ids.clone())
                .channel_ids(channel_ids.clone());

            let top_product = self.repo.bucket_extreme(&filter, true).await?;
            let worst_product = self.repo.bucket_extreme(&filter, false).await?;

            results.push(HourlyTrendingBucket {
                start_hour,
                end_hour,
                top_product,
                worst_product,
            });
        }

        Ok(results)
    }

    pub async fn not_selling_products(
        &self,
        filter: &SqlFilter,
    ) -> Result<Vec<NotSellingProduct>, AppError> {
        self.repo.not_selling_products(filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn week(d: u32, revenue: i64, orders: i64) -> WeeklyRevenue {
        WeeklyRevenue {
            week: date(2025, 1, d),
            revenue: Decimal::from(revenue),
            orders,
        }
    }

    #[test]
    fn janela_anterior_tem_a_mesma_duracao() {
        let (prev_start, prev_end) = previous_window(date(2025, 1, 10), date(2025, 1, 20));
        assert_eq!(prev_start, date(2024, 12, 31));
        assert_eq!(prev_end, date(2025, 1, 10));
        assert_eq!(prev_end - prev_start, date(2025, 1, 20) - date(2025, 1, 10));
    }

    #[test]
    fn serie_de_referencia_fica_exatamente_no_limite() {
        // [100,100,100,100,1000]: média 280, σ populacional 360.
        // 1000 == média + 2σ, e o corte é estrito, então nada é sinalizado.
        let weeks = vec![
            week(6, 100, 60),
            week(13, 100, 60),
            week(20, 100, 60),
            week(27, 100, 60),
            week(31, 1000, 60),
        ];
        match detect_anomalies(&weeks, 50) {
            AnomalyReport::Stats {
                mean_revenue,
                std_dev,
                anomalies,
            } => {
                assert!((mean_revenue - 280.0).abs() < 1e-9);
                assert!((std_dev - 360.0).abs() < 1e-9);
                assert!(anomalies.is_empty());
            }
            AnomalyReport::Empty { .. } => panic!("esperava estatísticas"),
        }
    }

    #[test]
    fn pico_acima_de_dois_sigmas_e_sinalizado() {
        // [100 x5, 1000]: média 250, σ ≈ 335.41, limite ≈ 920.8 < 1000.
        let weeks = vec![
            week(1, 100, 60),
            week(6, 100, 60),
            week(13, 100, 60),
            week(20, 100, 60),
            week(27, 100, 60),
            week(31, 1000, 60),
        ];
        match detect_anomalies(&weeks, 50) {
            AnomalyReport::Stats { anomalies, .. } => {
                assert_eq!(anomalies.len(), 1);
                assert_eq!(anomalies[0].kind, "peak");
                assert_eq!(anomalies[0].week, date(2025, 1, 31));
            }
            AnomalyReport::Empty { .. } => panic!("esperava estatísticas"),
        }
    }

    #[test]
    fn queda_abaixo_de_dois_sigmas_e_sinalizada() {
        let mut weeks: Vec<WeeklyRevenue> = (1..=5).map(|i| week(i, 1000, 60)).collect();
        weeks.push(week(31, 100, 60));
        match detect_anomalies(&weeks, 50) {
            AnomalyReport::Stats { anomalies, .. } => {
                assert_eq!(anomalies.len(), 1);
                assert_eq!(anomalies[0].kind, "drop");
            }
            AnomalyReport::Empty { .. } => panic!("esperava estatísticas"),
        }
    }

    #[test]
    fn semana_com_poucos_pedidos_entra_na_media_mas_nao_e_sinalizada() {
        let weeks = vec![
            week(1, 100, 60),
            week(6, 100, 60),
            week(13, 100, 60),
            week(20, 100, 60),
            week(27, 100, 60),
            week(31, 1000, 10), // abaixo do threshold de pedidos
        ];
        match detect_anomalies(&weeks, 50) {
            AnomalyReport::Stats {
                mean_revenue,
                anomalies,
                ..
            } => {
                assert!((mean_revenue - 250.0).abs() < 1e-9);
                assert!(anomalies.is_empty());
            }
            AnomalyReport::Empty { .. } => panic!("esperava estatísticas"),
        }
    }

    #[test]
    fn serie_vazia_vira_mensagem() {
        assert_eq!(
            detect_anomalies(&[], 50),
            AnomalyReport::Empty {
                message: "No data available".to_string()
            }
        );
    }

    #[test]
    fn margem_e_receita_menos_custo() {
        let row = ProductMarginRow {
            product_name: "X-Burger".to_string(),
            total_sold: 10,
            revenue: Decimal::from(80),
            total_cost: Decimal::from(50),
        };
        let margin = compute_margin(row);
        assert_eq!(margin.total_cost, Decimal::from(50));
        assert_eq!(margin.margin, Decimal::from(30));
    }

    #[test]
    fn performance_sem_base_de_comparacao_e_zero() {
        assert_eq!(
            performance_pct(Decimal::from(100), Decimal::ZERO),
            Decimal::ZERO
        );
        assert_eq!(
            performance_pct(Decimal::from(150), Decimal::from(100)),
            Decimal::from(50)
        );
    }

    #[test]
    fn itens_sao_agrupados_por_venda() {
        let ts = |d: u32| -> NaiveDateTime {
            date(2025, 1, d).and_hms_opt(12, 0, 0).unwrap()
        };
        let sale = |id: i64, d: u32| RecentSaleRow {
            sale_id: id,
            date: ts(d),
            amount: Decimal::from(42),
            customer: None,
            channel: "iFood".to_string(),
            store: "Centro".to_string(),
            status: "COMPLETED".to_string(),
        };
        let item = |sale_id: i64, name: &str| RecentLineItemRow {
            sale_id,
            name: name.to_string(),
            qty: 1,
            total: Decimal::from(10),
        };

        let result = attach_products(
            vec![sale(1, 2), sale(2, 3)],
            vec![item(1, "Pizza"), item(1, "Refrigerante"), item(2, "Burger")],
        );

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].products.len(), 2);
        assert_eq!(result[0].products[0].name, "Pizza");
        assert_eq!(result[1].products.len(), 1);

        // venda sem itens fica com lista vazia
        let orphan = attach_products(vec![sale(3, 4)], vec![]);
        assert!(orphan[0].products.is_empty());
    }
}
