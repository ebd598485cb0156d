//! Table rendering for terminal output

use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use radar_market::{DashboardItem, DashboardView, QuoteSet, Symbol, ViewStatus};

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h)));
    table
}

pub fn print_symbols(symbols: &[Symbol]) {
    if symbols.is_empty() {
        println!("Nenhum ativo listado.");
        return;
    }

    let mut table = table(&["#", "Ticker"]);
    for (i, symbol) in symbols.iter().enumerate() {
        table.add_row(vec![Cell::new(i + 1), Cell::new(symbol)]);
    }
    println!("{table}");
}

pub fn print_quotes(quotes: &QuoteSet) {
    let mut table = table(&["Ticker", "Nome", "Data", "Preço", "Variação"]);
    for quote in quotes {
        table.add_row(vec![
            Cell::new(&quote.symbol),
            Cell::new(&quote.long_name),
            Cell::new(quote.display_date().unwrap_or_else(|| "--/--".to_string())),
            Cell::new(quote.price.map_or_else(|| "-".to_string(), |p| format!("{p:.2}"))),
            Cell::new(quote.change_label().unwrap_or_else(|| "-".to_string())),
        ]);
    }
    println!("{table}");
}

fn print_items(title: &str, items: &[DashboardItem]) {
    println!("{title}");
    if items.is_empty() {
        println!("  (nenhuma recomendação)");
        return;
    }

    let mut table = table(&["Ticker", "Data", "Variação", "Preço", "Status", "Descrição"]);
    for item in items {
        table.add_row(vec![
            Cell::new(&item.ticker),
            Cell::new(&item.date),
            Cell::new(&item.change),
            Cell::new(&item.price),
            Cell::new(item.status),
            Cell::new(&item.description),
        ]);
    }
    println!("{table}");
}

pub fn print_dashboard(view: &DashboardView) {
    println!(
        "Atualizado em {}",
        view.generated_at.format("%d/%m/%Y %H:%M:%S UTC")
    );

    match view.status {
        ViewStatus::NoSymbols => println!("Nenhum ativo listado."),
        ViewStatus::NoQuotes => println!("Nenhuma cotação disponível no momento."),
        ViewStatus::NoRecommendations => println!("Nenhuma recomendação gerada."),
        ViewStatus::Ready => {
            print_items("Compra", &view.buy);
            print_items("Venda", &view.sell);
        }
    }
}
