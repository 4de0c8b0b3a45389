use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

// ============================================================================
// ENUMS
// ============================================================================

/// Economic theme, one per dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Activity,  // Atividade & PIB
    Inflation, // Inflação & Juros
    Labor,     // Trabalho
    Fiscal,    // Fiscal
    External,  // Câmbio & Comércio
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Activity,
        Category::Inflation,
        Category::Labor,
        Category::Fiscal,
        Category::External,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Category::Activity => "Atividade & PIB",
            Category::Inflation => "Inflação & Juros",
            Category::Labor => "Trabalho",
            Category::Fiscal => "Fiscal",
            Category::External => "Câmbio & Comércio",
        }
    }
}

// ============================================================================
// METADATA STRUCT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorDefinition {
    pub key: String,
    pub series_id: u32,
    pub unit: String,
    pub label: String,
    pub description: String,
    pub category: Category,
    /// Label used above this indicator's chart inside its tab.
    pub chart_title: String,
}

/// A summary card. `trailing_sum` displays the 12-period sum instead of the
/// raw latest value (monthly inflation shown as its 12-month accumulation).
#[derive(Debug, Clone, Serialize)]
pub struct CardDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub trailing_sum: bool,
}

macro_rules! ind {
    ($key:expr, $id:expr, $unit:expr, $label:expr, $cat:expr, $chart:expr, $desc:expr) => {
        IndicatorDefinition {
            key: $key.to_string(),
            series_id: $id,
            unit: $unit.to_string(),
            label: $label.to_string(),
            description: $desc.to_string(),
            category: $cat,
            chart_title: $chart.to_string(),
        }
    };
}

// ============================================================================
// STATIC INDICATOR REGISTRY
// ============================================================================

static INDICATORS: Lazy<Vec<IndicatorDefinition>> = Lazy::new(|| {
    vec![
        ind!("IBC-Br", 24363, "índice", "IBC-Br — Atividade Econômica", Category::Activity,
             "IBC-Br — Índice de Atividade",
             "Proxy mensal do PIB calculado pelo Banco Central. Reflete a evolução da atividade econômica com base em indústria, serviços e agropecuária. É o termômetro mais rápido do crescimento brasileiro."),
        ind!("IPCA", 433, "% a.m.", "IPCA — Inflação Mensal", Category::Inflation,
             "IPCA — Variação Mensal (%)",
             "Inflação oficial do Brasil, medida pelo IBGE. Variação mensal do custo de vida. Quando acumulada em 12 meses, é o principal indicador usado pelo BCB para calibrar a política monetária."),
        ind!("Selic", 4189, "% a.a.", "Taxa Selic", Category::Inflation,
             "Taxa Selic (% a.a.)",
             "Taxa básica de juros da economia brasileira. Principal instrumento do Banco Central para controlar a inflação — quando a inflação acelera, o BCB eleva a Selic para desaquecer a demanda."),
        ind!("Desemprego", 24369, "%", "Desemprego — PNAD", Category::Labor,
             "Taxa de Desemprego — PNAD (%)",
             "Taxa de desocupação da PNAD Contínua (IBGE). Indicador defasado do ciclo econômico — costuma subir após recessões e cair com algum atraso nas recuperações."),
        ind!("Dívida", 4536, "% PIB", "Dívida Líquida do Setor Público", Category::Fiscal,
             "Dívida Líquida do Setor Público (% PIB)",
             "Dívida líquida do governo como % do PIB. Mede o endividamento público descontando os ativos financeiros. Indicador central da sustentabilidade fiscal brasileira."),
        ind!("PIB", 1207, "R$ mi", "PIB Nominal", Category::Activity,
             "PIB Nominal (R$ milhões)",
             "PIB a preços de mercado, em R$ milhões. Mede o valor total da produção da economia brasileira em determinado período."),
        ind!("Dólar", 3698, "R$/USD", "Câmbio USD/BRL", Category::External,
             "Câmbio USD/BRL",
             "Taxa de câmbio entre o dólar americano e o real brasileiro, cotação média mensal de venda. Reflete percepções de risco, fluxo de capitais e política monetária."),
        ind!("Balança", 22704, "US$ mi", "Balança Comercial", Category::External,
             "Balança Comercial (US$ milhões)",
             "Resultado entre exportações e importações em US$ milhões. Superávit quando positivo — indica que o Brasil exporta mais do que importa."),
    ]
});

static INDICATOR_MAP: Lazy<HashMap<String, usize>> = Lazy::new(|| {
    INDICATORS
        .iter()
        .enumerate()
        .map(|(idx, ind)| (ind.key.clone(), idx))
        .collect()
});

static CARDS: [CardDefinition; 6] = [
    CardDefinition { key: "IBC-Br", label: "IBC-Br — Atividade Econômica", unit: "índice", trailing_sum: false },
    CardDefinition { key: "IPCA", label: "IPCA — Acumulado 12m", unit: "%", trailing_sum: true },
    CardDefinition { key: "Selic", label: "Taxa Selic — Meta", unit: "% a.a.", trailing_sum: false },
    CardDefinition { key: "Dólar", label: "Câmbio USD/BRL", unit: "R$", trailing_sum: false },
    CardDefinition { key: "Desemprego", label: "Desemprego — PNAD", unit: "%", trailing_sum: false },
    CardDefinition { key: "Dívida", label: "Dívida Líquida", unit: "% PIB", trailing_sum: false },
];

// ============================================================================
// REGISTRY STRUCT & IMPL
// ============================================================================

pub struct Registry;

impl Registry {
    /// All indicators, in the fixed order used for table columns.
    pub fn get_all_indicators() -> &'static [IndicatorDefinition] {
        &INDICATORS
    }

    pub fn get_by_category(category: Category) -> Vec<&'static IndicatorDefinition> {
        INDICATORS.iter().filter(|i| i.category == category).collect()
    }

    /// O(1) lookup by key
    pub fn get_definition(key: &str) -> Option<&'static IndicatorDefinition> {
        INDICATOR_MAP.get(key).and_then(|&idx| INDICATORS.get(idx))
    }

    pub fn cards() -> &'static [CardDefinition] {
        &CARDS
    }
}
