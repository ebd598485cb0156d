//! Prompt templates for the recommendation step
//!
//! The instruction is written in Brazilian Portuguese for Brazilian
//! investors. Quote data is embedded as JSON under `data`.

use crate::error::Result;
use crate::quote::QuoteMap;
use minijinja::{Environment, context};

/// Template name used in the environment
pub const RECOMMENDATION_PROMPT: &str = "stock.recommendation";

/// Buy/sell recommendations requested per side
pub const PICKS_PER_SIDE: usize = 3;

const RECOMMENDATION_TEMPLATE: &str = r#"Você é um analista sênior do mercado de ações brasileiro, com domínio de macroeconomia, análise técnica e fundamentalista, política monetária e geopolítica.
Sua tarefa é interpretar os dados de ações abaixo e produzir uma recomendação objetiva para investidores brasileiros.

Considere na análise:
- tendências de mercado e comportamento do setor;
- política monetária (juros, inflação, câmbio);
- contexto geopolítico (conflitos, eleições, política fiscal);
- desempenho histórico e projeções econômicas.

Dados de entrada (ticker, nome, data, variação percentual e preço, agrupados por ticker):

{{ data }}

A partir desses dados:
- escolha exatamente {{ picks }} ações para compra (buy);
- escolha exatamente {{ picks }} ações para venda (sell).

Para cada ação informe:
- "ticker": código da ação;
- "name": nome da empresa;
- "date": data no formato DD/MM;
- "change": variação percentual com sinal, por exemplo "+1.25%" ou "-0.80%";
- "price": preço atual;
- "description": justificativa breve baseada em fatores econômicos, setoriais e políticos;
- "type": "buy" ou "sell";
- "status": "bullish", "bearish" ou "neutral".

Regras:
- idioma português brasileiro, tom profissional, analítico e direto;
- não invente dados técnicos, apenas interprete os fornecidos;
- "buy" sempre com status "bullish" e "sell" sempre com status "bearish";
- a resposta deve ser somente um array JSON válido com {{ total }} objetos, sem nenhum texto fora do JSON.

Formato obrigatório:
[
  {"ticker": "PETR4", "name": "Petrobras", "date": "DD/MM", "change": "+X.XX%", "price": "XX.XX", "description": "...", "type": "buy", "status": "bullish"},
  {"ticker": "VALE3", "name": "Vale S.A.", "date": "DD/MM", "change": "-X.XX%", "price": "XX.XX", "description": "...", "type": "sell", "status": "bearish"}
]
"#;

/// Render the recommendation instruction for a set of quotes
pub fn render_recommendation_prompt(quotes: &QuoteMap) -> Result<String> {
    let data = serde_json::to_string_pretty(quotes)?;

    let mut env = Environment::new();
    env.add_template(RECOMMENDATION_PROMPT, RECOMMENDATION_TEMPLATE)?;

    let prompt = env.get_template(RECOMMENDATION_PROMPT)?.render(context! {
        data => data,
        picks => PICKS_PER_SIDE,
        total => PICKS_PER_SIDE * 2,
    })?;

    Ok(prompt)
}
