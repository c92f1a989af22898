// src/db/sales_repo.rs
//
// Uma consulta parametrizada por relatório. O WHERE dinâmico vem sempre do
// SqlFilter; os binds extras (LIMIT/OFFSET etc.) continuam a numeração a
// partir de filter.next_placeholder(). Agregações monetárias usam COALESCE
// para tratar null como zero.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::filter::SqlFilter,
    models::sales::{
        BucketProduct, DailySalesPoint, DeliveryHeatCell, DeliveryRegion, LostCustomer,
        MonthlySalesPoint, NotSellingProduct, PaymentMixEntry, ProductMarginRow,
        RecentLineItemRow, RecentSaleRow, SalesOverview, TicketAvg, TopCustomization,
        TopProduct, TrendingProduct, WeeklyRevenue,
    },
};

#[derive(Clone)]
pub struct SalesRepository {
    pool: PgPool,
}

impl SalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn overview(&self, filter: &SqlFilter) -> Result<SalesOverview, AppError> {
        let sql = format!(
            r#"
            SELECT
                COALESCE(SUM(s.total_amount), 0)::numeric AS faturamento,
                COUNT(*)::int8 AS pedidos,
                COALESCE(AVG(s.total_amount), 0)::numeric AS ticket_medio,
                COALESCE(AVG(s.production_seconds), 0)::float8 AS p90_prep_seconds,
                COALESCE(AVG(s.delivery_seconds), 0)::float8 AS p90_delivery_seconds
            FROM sales s
            JOIN channels ch ON ch.id = s.channel_id
            {}
            "#,
            filter.where_clause()
        );

        let row = filter
            .bind_query_as(sqlx::query_as::<_, SalesOverview>(&sql))
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn top_products(
        &self,
        filter: &SqlFilter,
        limit: i64,
    ) -> Result<Vec<TopProduct>, AppError> {
        let sql = format!(
            r#"
            SELECT
                p.name AS product,
                SUM(ps.quantity)::int8 AS qty,
                COALESCE(SUM(ps.total_price), 0)::numeric AS revenue
            FROM product_sales ps
            JOIN products p ON p.id = ps.product_id
            JOIN sales s ON s.id = ps.sale_id
            JOIN channels ch ON ch.id = s.channel_id
            {}
            GROUP BY p.name
            ORDER BY revenue DESC
            LIMIT ${}
            "#,
            filter.where_clause(),
            filter.next_placeholder()
        );

        let rows = filter
            .bind_query_as(sqlx::query_as::<_, TopProduct>(&sql))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn top_customizations(
        &self,
        filter: &SqlFilter,
        limit: i64,
    ) -> Result<Vec<TopCustomization>, AppError> {
        let sql = format!(
            r#"
            SELECT
                i.name AS item,
                COUNT(*)::int8 AS times_added,
                COALESCE(SUM(ips.additional_price), 0)::numeric AS revenue_generated
            FROM item_product_sales ips
            JOIN items i ON i.id = ips.item_id
            JOIN product_sales ps ON ps.id = ips.product_sale_id
            JOIN sales s ON s.id = ps.sale_id
            JOIN channels ch ON ch.id = s.channel_id
            {}
            GROUP BY i.name
            ORDER BY times_added DESC
            LIMIT ${}
            "#,
            filter.where_clause(),
            filter.next_placeholder()
        );

        let rows = filter
            .bind_query_as(sqlx::query_as::<_, TopCustomization>(&sql))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn delivery_regions(
        &self,
        filter: &SqlFilter,
        min_orders: i64,
        limit: i64,
    ) -> Result<Vec<DeliveryRegion>, AppError> {
        let sql = format!(
            r#"
            SELECT
                COALESCE(da.city, 'N/A') AS city,
                COALESCE(da.neighborhood, 'N/A') AS neighborhood,
                COUNT(*)::int8 AS deliveries,
                COALESCE(AVG(s.delivery_seconds) / 60.0, 0)::float8 AS avg_delivery_minutes
            FROM delivery_addresses da
            JOIN sales s ON s.id = da.sale_id
            JOIN channels ch ON ch.id = s.channel_id
            {}
            GROUP BY city, neighborhood
            HAVING COUNT(*) >= ${}
            ORDER BY avg_delivery_minutes DESC
            LIMIT ${}
            "#,
            filter.where_clause(),
            filter.next_placeholder(),
            filter.next_placeholder() + 1
        );

        let rows = filter
            .bind_query_as(sqlx::query_as::<_, DeliveryRegion>(&sql))
            .bind(min_orders)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn payment_mix(&self, filter: &SqlFilter) -> Result<Vec<PaymentMixEntry>, AppError> {
        let sql = format!(
            r#"
            SELECT
                COALESCE(pt.description, 'N/A') AS payment_type,
                COUNT(*)::int8 AS count,
                COALESCE(SUM(pay.value), 0)::numeric AS total
            FROM payments pay
            JOIN sales s ON s.id = pay.sale_id
            LEFT JOIN payment_types pt ON pt.id = pay.payment_type_id
            JOIN channels ch ON ch.id = s.channel_id
            {}
            GROUP BY payment_type
            ORDER BY total DESC
            "#,
            filter.where_clause()
        );

        let rows = filter
            .bind_query_as(sqlx::query_as::<_, PaymentMixEntry>(&sql))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn timeseries_daily(
        &self,
        filter: &SqlFilter,
    ) -> Result<Vec<DailySalesPoint>, AppError> {
        let sql = format!(
            r#"
            SELECT
                DATE(s.created_at) AS day,
                ch.name AS channel,
                st.name AS store_name,
                COALESCE(SUM(s.total_amount), 0)::numeric AS revenue,
                COUNT(*)::int8 AS orders
            FROM sales s
            JOIN channels ch ON ch.id = s.channel_id
            JOIN stores st ON st.id = s.store_id
            {}
            GROUP BY day, channel, store_name
            ORDER BY day, channel, store_name
            "#,
            filter.where_clause()
        );

        let rows = filter
            .bind_query_as(sqlx::query_as::<_, DailySalesPoint>(&sql))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn timeseries_monthly(
        &self,
        filter: &SqlFilter,
    ) -> Result<Vec<MonthlySalesPoint>, AppError> {
        let sql = format!(
            r#"
            SELECT
                TO_CHAR(s.created_at, 'YYYY-MM') AS month,
                ch.name AS channel,
                st.name AS store_name,
                COALESCE(SUM(s.total_amount), 0)::numeric AS revenue,
                COUNT(*)::int8 AS orders
            FROM sales s
            JOIN channels ch ON ch.id = s.channel_id
            JOIN stores st ON st.id = s.store_id
            {}
            GROUP BY month, channel, store_name
            ORDER BY month, channel, store_name
            "#,
            filter.where_clause()
        );

        let rows = filter
            .bind_query_as(sqlx::query_as::<_, MonthlySalesPoint>(&sql))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn weekly_revenue(&self) -> Result<Vec<WeeklyRevenue>, AppError> {
        let rows = sqlx::query_as::<_, WeeklyRevenue>(
            r#"
            SELECT
                DATE_TRUNC('week', created_at)::date AS week,
                COALESCE(SUM(total_amount), 0)::numeric AS revenue,
                COUNT(*)::int8 AS orders
            FROM sales
            WHERE sale_status_desc = 'COMPLETED'
            GROUP BY week
            ORDER BY week
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // Soma de vendas concluídas num intervalo fechado de datas.
    pub async fn revenue_between(
        &self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Decimal, AppError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(total_amount), 0)::numeric
            FROM sales
            WHERE DATE(created_at) BETWEEN $1 AND $2
              AND sale_status_desc = 'COMPLETED'
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    // Janela móvel em dias, contada para trás a partir de agora.
    // Sem filtro de status: o /topstats sem datas conta todas as vendas.
    pub async fn revenue_rolling_window(
        &self,
        from_days_ago: i32,
        to_days_ago: i32,
    ) -> Result<Decimal, AppError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(total_amount), 0)::numeric
            FROM sales
            WHERE created_at >= NOW() - make_interval(days => $1)
              AND created_at < NOW() - make_interval(days => $2)
            "#,
        )
        .bind(from_days_ago)
        .bind(to_days_ago)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    pub async fn recent_sales(
        &self,
        filter: &SqlFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RecentSaleRow>, AppError> {
        let sql = format!(
            r#"
            SELECT
                s.id::int8 AS sale_id,
                s.created_at::timestamp AS date,
                COALESCE(s.total_amount, 0)::numeric AS amount,
                c.customer_name AS customer,
                ch.name AS channel,
                st.name AS store,
                s.sale_status_desc AS status
            FROM sales s
            LEFT JOIN customers c ON c.id = s.customer_id
            JOIN channels ch ON ch.id = s.channel_id
            JOIN stores st ON st.id = s.store_id
            {}
            ORDER BY s.created_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            filter.where_clause(),
            filter.next_placeholder(),
            filter.next_placeholder() + 1
        );

        let rows = filter
            .bind_query_as(sqlx::query_as::<_, RecentSaleRow>(&sql))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    // Busca em lote os itens de uma página de vendas (um único round-trip).
    pub async fn line_items_for_sales(
        &self,
        sale_ids: &[i64],
    ) -> Result<Vec<RecentLineItemRow>, AppError> {
        let rows = sqlx::query_as::<_, RecentLineItemRow>(
            r#"
            SELECT
                ps.sale_id::int8 AS sale_id,
                p.name,
                COALESCE(ps.quantity, 0)::int8 AS qty,
                COALESCE(ps.total_price, 0)::numeric AS total
            FROM product_sales ps
            JOIN products p ON p.id = ps.product_id
            WHERE ps.sale_id = ANY($1)
            ORDER BY ps.sale_id
            "#,
        )
        .bind(sale_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn lost_customers(
        &self,
        min_orders: i64,
        inactive_days: i32,
    ) -> Result<Vec<LostCustomer>, AppError> {
        let rows = sqlx::query_as::<_, LostCustomer>(
            r#"
            SELECT
                c.customer_name AS customer,
                COUNT(s.id)::int8 AS total_orders,
                MAX(s.created_at)::date AS last_order
            FROM sales s
            JOIN customers c ON c.id = s.customer_id
            GROUP BY c.customer_name
            HAVING COUNT(s.id) >= $1
               AND MAX(s.created_at) <= NOW() - make_interval(days => $2)
            ORDER BY last_order ASC
            "#,
        )
        .bind(min_orders)
        .bind(inactive_days)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn ticket_avg(&self, filter: &SqlFilter) -> Result<Vec<TicketAvg>, AppError> {
        let sql = format!(
            r#"
            SELECT
                st.name AS store,
                ch.name AS channel,
                ROUND(COALESCE(AVG(s.total_amount), 0), 2)::numeric AS ticket
            FROM sales s
            JOIN stores st ON st.id = s.store_id
            JOIN channels ch ON ch.id = s.channel_id
            {}
            GROUP BY st.name, ch.name
            ORDER BY ticket DESC
            "#,
            filter.where_clause()
        );

        let rows = filter
            .bind_query_as(sqlx::query_as::<_, TicketAvg>(&sql))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn delivery_performance(
        &self,
        filter: &SqlFilter,
    ) -> Result<Vec<DeliveryHeatCell>, AppError> {
        let sql = format!(
            r#"
            SELECT
                EXTRACT(DOW FROM s.created_at)::int AS weekday,
                EXTRACT(HOUR FROM s.created_at)::int AS hour,
                ROUND(AVG(s.delivery_seconds) / 60.0, 2)::float8 AS avg_delivery_minutes
            FROM sales s
            {}
            GROUP BY weekday, hour
            ORDER BY weekday, hour
            "#,
            filter.where_clause()
        );

        let rows = filter
            .bind_query_as(sqlx::query_as::<_, DeliveryHeatCell>(&sql))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn trending_products(
        &self,
        filter: &SqlFilter,
        limit: i64,
    ) -> Result<Vec<TrendingProduct>, AppError> {
        let sql = format!(
            r#"
            SELECT
                p.name AS product,
                SUM(ps.quantity)::int8 AS qty,
                COALESCE(SUM(ps.total_price), 0)::numeric AS revenue
            FROM product_sales ps
            JOIN products p ON p.id = ps.product_id
            JOIN sales s ON s.id = ps.sale_id
            {}
            GROUP BY p.name
            ORDER BY qty DESC
            LIMIT ${}
            "#,
            filter.where_clause(),
            filter.next_placeholder()
        );

        let rows = filter
            .bind_query_as(sqlx::query_as::<_, TrendingProduct>(&sql))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    // Extremo de quantidade dentro de um bucket de horário: o mais vendido
    // (descending = true) ou o menos vendido (descending = false).
    pub async fn bucket_extreme(
        &self,
        filter: &SqlFilter,
        descending: bool,
    ) -> Result<Option<BucketProduct>, AppError> {
        let direction = if descending { "DESC" } else { "ASC" };
        let sql = format!(
            r#"
            SELECT
                p.name AS product,
                SUM(ps.quantity)::int8 AS qty
            FROM product_sales ps
            JOIN products p ON p.id = ps.product_id
            JOIN sales s ON s.id = ps.sale_id
            {}
            GROUP BY p.name
            ORDER BY qty {}
            LIMIT 1
            "#,
            filter.where_clause(),
            direction
        );

        let row = filter
            .bind_query_as(sqlx::query_as::<_, BucketProduct>(&sql))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn product_margins(
        &self,
        filter: &SqlFilter,
        limit: i64,
    ) -> Result<Vec<ProductMarginRow>, AppError> {
        let sql = format!(
            r#"
            SELECT
                p.name AS product_name,
                SUM(ps.quantity)::int8 AS total_sold,
                COALESCE(SUM(ps.total_price), 0)::numeric AS revenue,
                COALESCE(SUM(ps.quantity * ps.base_price), 0)::numeric AS total_cost
            FROM product_sales ps
            JOIN products p ON p.id = ps.product_id
            JOIN sales s ON s.id = ps.sale_id
            JOIN channels ch ON ch.id = s.channel_id
            {}
            GROUP BY p.id, p.name
            ORDER BY (COALESCE(SUM(ps.total_price), 0) - COALESCE(SUM(ps.quantity * ps.base_price), 0)) DESC
            LIMIT ${}
            "#,
            filter.where_clause(),
            filter.next_placeholder()
        );

        let rows = filter
            .bind_query_as(sqlx::query_as::<_, ProductMarginRow>(&sql))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    // Produtos sem venda há mais de 30 dias. O filtro entra no ON do LEFT
    // JOIN para que produtos jamais vendidos continuem aparecendo; para
    // esses, os dias sem venda contam desde a época Unix (ordenam primeiro).
    pub async fn not_selling_products(
        &self,
        filter: &SqlFilter,
    ) -> Result<Vec<NotSellingProduct>, AppError> {
        let sql = format!(
            r#"
            WITH last_sales AS (
                SELECT
                    p.id::int AS id,
                    p.name,
                    MAX(s.created_at)::timestamp AS last_sale
                FROM products p
                LEFT JOIN product_sales ps ON ps.product_id = p.id
                LEFT JOIN sales s ON s.id = ps.sale_id AND {}
                GROUP BY p.id, p.name
            )
            SELECT
                id,
                name AS product,
                last_sale,
                COALESCE(
                    DATE_PART('day', NOW()::timestamp - last_sale),
                    DATE_PART('day', NOW()::timestamp - TIMESTAMP '1970-01-01')
                )::int8 AS days_without_sale
            FROM last_sales
            WHERE last_sale IS NULL OR last_sale < NOW()::timestamp - INTERVAL '30 days'
            ORDER BY days_without_sale DESC
            "#,
            filter.conditions()
        );

        let rows = filter
            .bind_query_as(sqlx::query_as::<_, NotSellingProduct>(&sql))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
