// src/db/filter.rs
//
// Montagem compartilhada do WHERE dinâmico dos relatórios. Cada relatório
// parte de um predicado base ('COMPLETED' ou '1=1') e os filtros opcionais
// são sempre prefixados com AND, então nunca sobra operador pendurado.

use chrono::NaiveDate;
use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;

/// Valor a ser vinculado a um placeholder `$n`, na ordem em que o
/// placeholder aparece no fragmento SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Int(i32),
    BigInt(i64),
    Text(String),
    Date(NaiveDate),
    IntArray(Vec<i32>),
    TextArray(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct SqlFilter {
    clauses: Vec<String>,
    params: Vec<BindValue>,
}

macro_rules! bind_param {
    ($query:expr, $value:expr) => {
        match $value {
            BindValue::Int(v) => $query.bind(v),
            BindValue::BigInt(v) => $query.bind(v),
            BindValue::Text(v) => $query.bind(v),
            BindValue::Date(v) => $query.bind(v),
            BindValue::IntArray(v) => $query.bind(v),
            BindValue::TextArray(v) => $query.bind(v),
        }
    };
}

impl SqlFilter {
    /// Relatórios de receita só olham vendas concluídas.
    pub fn completed() -> Self {
        Self::with_base("s.sale_status_desc = 'COMPLETED'")
    }

    /// Relatórios que ignoram o status partem de uma tautologia.
    pub fn any() -> Self {
        Self::with_base("1=1")
    }

    fn with_base(base: &str) -> Self {
        Self {
            clauses: vec![base.to_string()],
            params: Vec::new(),
        }
    }

    fn push(&mut self, clause: String, value: BindValue) {
        self.clauses.push(clause);
        self.params.push(value);
    }

    /// Cláusula sem parâmetro (ex.: "s.delivery_seconds IS NOT NULL").
    pub fn raw(mut self, clause: &str) -> Self {
        self.clauses.push(clause.to_string());
        self
    }

    pub fn date_from(mut self, start: Option<NaiveDate>) -> Self {
        if let Some(start) = start {
            let clause = format!("DATE(s.created_at) >= ${}", self.next_placeholder());
            self.push(clause, BindValue::Date(start));
        }
        self
    }

    /// Limite superior exclusivo (`<`).
    pub fn date_before(mut self, end: Option<NaiveDate>) -> Self {
        if let Some(end) = end {
            let clause = format!("DATE(s.created_at) < ${}", self.next_placeholder());
            self.push(clause, BindValue::Date(end));
        }
        self
    }

    /// Limite superior inclusivo (`<=`).
    pub fn date_until(mut self, end: Option<NaiveDate>) -> Self {
        if let Some(end) = end {
            let clause = format!("DATE(s.created_at) <= ${}", self.next_placeholder());
            self.push(clause, BindValue::Date(end));
        }
        self
    }

    /// BETWEEN inclusivo, só entra quando as duas pontas estão presentes.
    pub fn date_between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        if let (Some(start), Some(end)) = (start, end) {
            let clause = format!(
                "DATE(s.created_at) BETWEEN ${} AND ${}",
                self.next_placeholder(),
                self.next_placeholder() + 1
            );
            self.clauses.push(clause);
            self.params.push(BindValue::Date(start));
            self.params.push(BindValue::Date(end));
        }
        self
    }

    pub fn store_ids(mut self, ids: Option<Vec<i32>>) -> Self {
        if let Some(ids) = ids.filter(|ids| !ids.is_empty()) {
            let clause = format!("s.store_id = ANY(${})", self.next_placeholder());
            self.push(clause, BindValue::IntArray(ids));
        }
        self
    }

    pub fn channel_ids(mut self, ids: Option<Vec<i32>>) -> Self {
        if let Some(ids) = ids.filter(|ids| !ids.is_empty()) {
            let clause = format!("s.channel_id = ANY(${})", self.next_placeholder());
            self.push(clause, BindValue::IntArray(ids));
        }
        self
    }

    /// Filtra pelo nome do canal (requer JOIN com channels no SQL).
    pub fn channel_names(mut self, names: Option<Vec<String>>) -> Self {
        if let Some(names) = names.filter(|names| !names.is_empty()) {
            let clause = format!("ch.name ILIKE ANY(${})", self.next_placeholder());
            self.push(clause, BindValue::TextArray(names));
        }
        self
    }

    /// Status são normalizados para maiúsculo antes da comparação.
    pub fn statuses(mut self, statuses: Option<Vec<String>>) -> Self {
        if let Some(statuses) = statuses.filter(|statuses| !statuses.is_empty()) {
            let normalized = statuses.into_iter().map(|s| s.to_uppercase()).collect();
            let clause = format!(
                "UPPER(s.sale_status_desc) = ANY(${})",
                self.next_placeholder()
            );
            self.push(clause, BindValue::TextArray(normalized));
        }
        self
    }

    /// Dia da semana no padrão Postgres: 0 = domingo ... 6 = sábado.
    pub fn weekday(mut self, weekday: Option<i32>) -> Self {
        if let Some(weekday) = weekday {
            let clause = format!(
                "EXTRACT(DOW FROM s.created_at)::int = ${}",
                self.next_placeholder()
            );
            self.push(clause, BindValue::Int(weekday));
        }
        self
    }

    /// Faixa de horário inclusiva, só entra quando as duas pontas existem.
    pub fn hour_between(mut self, start_hour: Option<i32>, end_hour: Option<i32>) -> Self {
        if let (Some(start_hour), Some(end_hour)) = (start_hour, end_hour) {
            let clause = format!(
                "EXTRACT(HOUR FROM s.created_at)::int BETWEEN ${} AND ${}",
                self.next_placeholder(),
                self.next_placeholder() + 1
            );
            self.clauses.push(clause);
            self.params.push(BindValue::Int(start_hour));
            self.params.push(BindValue::Int(end_hour));
        }
        self
    }

    /// Só as condições unidas por AND, para usar dentro de um JOIN ... ON.
    pub fn conditions(&self) -> String {
        self.clauses.join(" AND ")
    }

    /// Fragmento completo, seguro para concatenar após o FROM.
    pub fn where_clause(&self) -> String {
        format!("WHERE {}", self.conditions())
    }

    /// Próximo índice `$n` livre; usado pelos repositórios para LIMIT/OFFSET.
    pub fn next_placeholder(&self) -> usize {
        self.params.len() + 1
    }

    pub fn params(&self) -> &[BindValue] {
        &self.params
    }

    pub fn bind_query_as<'q, O>(
        &self,
        mut query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for value in self.params.clone() {
            query = bind_param!(query, value);
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sem_filtros_reduz_ao_predicado_base() {
        let filter = SqlFilter::completed()
            .date_from(None)
            .date_before(None)
            .store_ids(None)
            .channel_ids(None);

        assert_eq!(
            filter.where_clause(),
            "WHERE s.sale_status_desc = 'COMPLETED'"
        );
        assert!(filter.params().is_empty());
    }

    #[test]
    fn tautologia_para_relatorios_sem_status() {
        let filter = SqlFilter::any();
        assert_eq!(filter.where_clause(), "WHERE 1=1");
        assert_eq!(filter.next_placeholder(), 1);
    }

    #[test]
    fn placeholders_casam_com_parametros_na_ordem() {
        let filter = SqlFilter::completed()
            .date_from(Some(date(2025, 1, 1)))
            .date_before(Some(date(2025, 2, 1)))
            .store_ids(Some(vec![1, 2]))
            .channel_ids(Some(vec![3]));

        let clause = filter.where_clause();
        let placeholders = clause.matches('$').count();
        assert_eq!(placeholders, filter.params().len());
        assert_eq!(
            clause,
            "WHERE s.sale_status_desc = 'COMPLETED' \
             AND DATE(s.created_at) >= $1 \
             AND DATE(s.created_at) < $2 \
             AND s.store_id = ANY($3) \
             AND s.channel_id = ANY($4)"
        );
        assert_eq!(
            filter.params(),
            &[
                BindValue::Date(date(2025, 1, 1)),
                BindValue::Date(date(2025, 2, 1)),
                BindValue::IntArray(vec![1, 2]),
                BindValue::IntArray(vec![3]),
            ]
        );
        assert_eq!(filter.next_placeholder(), 5);
    }

    #[test]
    fn lista_vazia_nao_filtra_nada() {
        let filter = SqlFilter::any()
            .store_ids(Some(vec![]))
            .statuses(Some(vec![]));
        assert_eq!(filter.where_clause(), "WHERE 1=1");
        assert!(filter.params().is_empty());
    }

    #[test]
    fn status_normalizado_para_maiusculo() {
        let filter =
            SqlFilter::any().statuses(Some(vec!["completed".into(), "Canceled".into()]));
        assert_eq!(
            filter.params(),
            &[BindValue::TextArray(vec![
                "COMPLETED".into(),
                "CANCELED".into()
            ])]
        );
        assert_eq!(
            filter.where_clause(),
            "WHERE 1=1 AND UPPER(s.sale_status_desc) = ANY($1)"
        );
    }

    #[test]
    fn between_exige_as_duas_pontas() {
        let so_inicio = SqlFilter::any().date_between(Some(date(2025, 1, 1)), None);
        assert_eq!(so_inicio.where_clause(), "WHERE 1=1");

        let completo =
            SqlFilter::any().date_between(Some(date(2025, 1, 1)), Some(date(2025, 1, 31)));
        assert_eq!(
            completo.where_clause(),
            "WHERE 1=1 AND DATE(s.created_at) BETWEEN $1 AND $2"
        );
        assert_eq!(completo.params().len(), 2);
    }

    #[test]
    fn condicoes_para_join_nao_levam_where() {
        let filter = SqlFilter::any().store_ids(Some(vec![7]));
        assert_eq!(filter.conditions(), "1=1 AND s.store_id = ANY($1)");
    }

    #[test]
    fn faixa_de_horario_gera_dois_placeholders() {
        let filter = SqlFilter::any().weekday(Some(4)).hour_between(Some(11), Some(14));
        assert_eq!(
            filter.where_clause(),
            "WHERE 1=1 AND EXTRACT(DOW FROM s.created_at)::int = $1 \
             AND EXTRACT(HOUR FROM s.created_at)::int BETWEEN $2 AND $3"
        );
        assert_eq!(filter.params().len(), 3);
    }
}
