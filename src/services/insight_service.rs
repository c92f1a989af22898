// src/services/insight_service.rs
//
// Narrador de insights: tenta a API da Groq (compatível com OpenAI) com um
// prompt fixo por bloco; qualquer falha (timeout, quota, chave ausente,
// resposta malformada) cai no template determinístico com os mesmos dados.
// O narrador nunca devolve erro ao chamador.

use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    config::Settings,
    models::insights::{
        InsightBlocks, InsightsRequest, PerformanceSnapshot, RiskSnapshot, TrendingSnapshot,
    },
};

const SYSTEM_PROMPT: &str = "Você é um consultor de BI especialista em restaurantes.";

pub const PROMPT_TRENDING: &str = r#"Você é um consultor sênior de BI para restaurantes.

Use SOMENTE os dados enviados e responda:
➡️ "Qual produto vende mais por canal, dia da semana e horário?"

Formato (markdown):

## 🚀 Destaques (Produtos mais vendidos)
- Produto X é o mais vendido no canal Y às quintas à noite.
- Se houver tendência por horário ou comportamento, repita.

⚠️ Não explique o processo. Se os dados forem insuficientes, FAÇA inferência.
Dados recebidos:
{{DATA}}"#;

pub const PROMPT_PERFORMANCE: &str = r#"Você é um consultor sênior de BI especializado em performance.

Use SOMENTE os dados enviados.
➡️ O ticket médio está subindo ou caindo? Por canal ou por loja?

Formato (markdown):

## 📊 Performance (Ticket / Receita / Comparação)
- Ticket médio está (subindo/caindo) no canal X.
- Loja Y está performando melhor.
- Explique em 1 frase a tendência.

Dados recebidos:
{{DATA}}"#;

pub const PROMPT_ALERTAS: &str = r#"Você é consultor sênior de BI.

Use SOMENTE os dados enviados.
➡️ Quais produtos estão sem venda e quais clientes estão com risco de churn?

Formato (markdown):

## ⚠️ Alertas (Riscos Identificados)
- Produto X está sem vender há N dias.
- Y clientes compraram 3+ vezes e não voltam há 30 dias.
- Cancelamentos elevados no canal Z.

Dados recebidos:
{{DATA}}"#;

pub const INSIGHTS_UNAVAILABLE: &str = "⚠️ Não foi possível gerar insights.";

pub(crate) fn fallback_trending(block: &TrendingSnapshot) -> String {
    let produto_dia = block.best_today.clone().unwrap_or_else(|| "—".to_string());
    let produto_mes = block
        .trending_month
        .first()
        .and_then(|p| p.product.clone())
        .or_else(|| block.trending_products.first().and_then(|p| p.product.clone()))
        .unwrap_or_else(|| "—".to_string());
    let entrega = block
        .delivery_time
        .map(|min| format!("{min:.0}"))
        .unwrap_or_else(|| "—".to_string());

    format!(
        "## ✅ Destaques do dia (Oportunidades)\n\
         - 🥇 Produto mais vendido hoje: **{produto_dia}**\n\
         - 📅 Mais vendido no período: **{produto_mes}**\n\
         - 🚚 Tempo médio de entrega: **{entrega} min**"
    )
}

pub(crate) fn fallback_performance(block: &PerformanceSnapshot) -> String {
    let trend = if block.performance > 0.0 {
        "⬆️ aumento"
    } else {
        "⬇️ queda"
    };

    format!(
        "## 📊 Performance (Ticket / Receita)\n\
         - Faturamento total: **R$ {:.2}**\n\
         - Ticket médio: **R$ {:.2}**\n\
         - Variação do período: **{}% ({trend})**",
        block.total_revenue, block.avg_ticket, block.performance
    )
}

pub(crate) fn fallback_alerts(block: &RiskSnapshot) -> String {
    let mut text = String::from("## ⚠️ Alertas (Riscos Identificados)\n");

    if let Some(parado) = block
        .not_selling_products
        .first()
        .and_then(|p| p.product_name.clone())
    {
        text.push_str(&format!("- 🚫 Produto parado: **{parado}**\n"));
    }

    if block.canceled_orders > 3 {
        text.push_str(&format!(
            "- ❗ Cancelamentos elevados: **{} pedidos**\n",
            block.canceled_orders
        ));
    }

    if block.retention_risk_clients > 0 {
        text.push_str(&format!(
            "- 👥 Clientes em risco de churn: **{}**\n",
            block.retention_risk_clients
        ));
    }

    text.trim_end().to_string()
}

#[derive(Clone)]
pub struct InsightService {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl InsightService {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        // timeout explícito: estouro conta como falha e cai no fallback
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Falha ao construir o cliente HTTP dos insights")?;

        Ok(Self {
            http,
            api_key: settings.groq_api_key.clone(),
            model: settings.groq_model.clone(),
            base_url: settings.groq_base_url.clone(),
        })
    }

    pub async fn generate(&self, request: &InsightsRequest) -> InsightBlocks {
        InsightBlocks {
            highlights: self
                .narrate_or_fallback(PROMPT_TRENDING, &request.block1, fallback_trending)
                .await,
            performance: self
                .narrate_or_fallback(PROMPT_PERFORMANCE, &request.block2, fallback_performance)
                .await,
            alerts: self
                .narrate_or_fallback(PROMPT_ALERTAS, &request.block3, fallback_alerts)
                .await,
        }
    }

    async fn narrate_or_fallback<T, F>(&self, template: &str, block: &T, fallback: F) -> String
    where
        T: Serialize,
        F: FnOnce(&T) -> String,
    {
        match self.narrate(template, block).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback(block),
            Err(e) => {
                tracing::warn!("IA indisponível, usando fallback: {e:#}");
                let rendered = fallback(block);
                if rendered.trim().is_empty() {
                    INSIGHTS_UNAVAILABLE.to_string()
                } else {
                    rendered
                }
            }
        }
    }

    async fn narrate<T: Serialize>(&self, template: &str, block: &T) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow!("GROQ_API_KEY ausente"))?;

        let data = serde_json::to_string(block)?;
        let prompt = template.replace("{{DATA}}", &data);

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": 0.4,
        });

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("API de insights respondeu {}", response.status());
        }

        let value = response.json::<Value>().await?;
        value
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("resposta da API de insights sem conteúdo"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::insights::{ProductRef, StalledProduct};

    #[test]
    fn fallback_de_destaques_usa_os_campos_conhecidos() {
        let block = TrendingSnapshot {
            best_today: Some("X-Burger".to_string()),
            trending_month: vec![ProductRef {
                product: Some("Pizza Calabresa".to_string()),
            }],
            trending_products: vec![],
            delivery_time: Some(32.4),
        };
        let text = fallback_trending(&block);
        assert!(text.contains("**X-Burger**"));
        assert!(text.contains("**Pizza Calabresa**"));
        assert!(text.contains("**32 min**"));
    }

    #[test]
    fn fallback_de_destaques_sem_dados_usa_travessao() {
        let text = fallback_trending(&TrendingSnapshot::default());
        assert!(text.contains("hoje: **—**"));
        assert!(text.contains("período: **—**"));
        assert!(text.contains("**— min**"));
    }

    #[test]
    fn fallback_de_performance_indica_tendencia() {
        let subindo = fallback_performance(&PerformanceSnapshot {
            total_revenue: 1234.5,
            avg_ticket: 56.78,
            performance: 12.3,
            total_clients: 10,
        });
        assert!(subindo.contains("R$ 1234.50"));
        assert!(subindo.contains("R$ 56.78"));
        assert!(subindo.contains("12.3% (⬆️ aumento)"));

        let caindo = fallback_performance(&PerformanceSnapshot {
            performance: -4.0,
            ..Default::default()
        });
        assert!(caindo.contains("⬇️ queda"));
    }

    #[test]
    fn alerta_de_cancelamento_so_aparece_acima_de_tres() {
        let com_alerta = fallback_alerts(&RiskSnapshot {
            canceled_orders: 5,
            ..Default::default()
        });
        assert!(com_alerta.contains("Cancelamentos elevados: **5 pedidos**"));

        let sem_alerta = fallback_alerts(&RiskSnapshot {
            canceled_orders: 2,
            ..Default::default()
        });
        assert!(!sem_alerta.contains("Cancelamentos"));
    }

    #[test]
    fn alerta_lista_produto_parado_e_churn() {
        let block = RiskSnapshot {
            not_selling_products: vec![StalledProduct {
                product_name: Some("Suco Detox".to_string()),
            }],
            canceled_orders: 0,
            retention_risk_clients: 7,
        };
        let text = fallback_alerts(&block);
        assert!(text.contains("Produto parado: **Suco Detox**"));
        assert!(text.contains("churn: **7**"));

        // sem nenhum risco só sobra o cabeçalho
        let vazio = fallback_alerts(&RiskSnapshot::default());
        assert_eq!(vazio, "## ⚠️ Alertas (Riscos Identificados)");
    }
}
