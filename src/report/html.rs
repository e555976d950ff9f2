
use crate::dividends::Dividend;

use super::Totals;

const ROW_CELL: &str = "padding: 12px; border-bottom: 1px solid #e0e0e0;";
const HEADER_CELL: &str =
    "padding: 15px 12px; font-weight: 600; color: #2c3e50; border-bottom: 2px solid #e0e0e0;";
const CARD: &str = "background: white; padding: 20px; border-radius: 8px; \
    box-shadow: 0 2px 4px rgba(0,0,0,0.1);";

pub fn render_html(
    dividends: &[Dividend],
    dates_label: &str,
    totals: &Totals,
    exchange_rates: &[(String, f64)],
) -> String {
    let mut rows = String::new();
    for dividend in dividends {
        push_row(&mut rows, dividend);
    }

    let rates_text = if exchange_rates.is_empty() {
        "No se encontraron tipos de cambio.".to_string()
    } else {
        exchange_rates
            .iter()
            .map(|(currency, rate)| format!("1 {} = €{rate:.4}", escape(currency)))
            .collect::<Vec<_>>()
            .join(" • ")
    };

    let dates_label = escape(dates_label);
    let gross_card = card("Dividendo Bruto", totals.gross, "#27ae60");
    let tax_card = card("Impuestos", totals.tax, "#e74c3c");
    let net_card = card("Dividendo Neto", totals.net, "#2980b9");
    let count = dividends.len();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Resumen de Dividendos</title>
</head>
<body style="font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 20px; background-color: #f5f7fa;">
    <div style="max-width: 800px; margin: 0 auto; background-color: white; border-radius: 10px; box-shadow: 0 4px 6px rgba(0,0,0,0.1); overflow: hidden;">
        <div style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; text-align: center;">
            <h1 style="margin: 0; font-size: 28px; font-weight: 300;">💰 Resumen de Dividendos</h1>
            <p style="margin: 10px 0 0 0; font-size: 16px; opacity: 0.9;">{dates_label}</p>
        </div>
        <div style="padding: 30px; background-color: #f8f9fc;">
            <div style="display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 20px; margin-bottom: 30px;">
                {gross_card}
                {tax_card}
                {net_card}
            </div>
        </div>
        <div style="padding: 0 30px 30px 30px;">
            <h2 style="color: #2c3e50; margin: 0 0 20px 0; font-size: 20px; font-weight: 600;">Detalle por Acción</h2>
            <div style="overflow-x: auto;">
                <table style="width: 100%; border-collapse: collapse; background: white;">
                    <thead>
                        <tr style="background: #f8f9fc;">
                            <th style="{HEADER_CELL} text-align: left;">Ticker</th>
                            <th style="{HEADER_CELL} text-align: left;">Empresa</th>
                            <th style="{HEADER_CELL} text-align: right;">Dividendo Bruto</th>
                            <th style="{HEADER_CELL} text-align: right;">Impuestos</th>
                            <th style="{HEADER_CELL} text-align: right;">Dividendo Neto</th>
                        </tr>
                    </thead>
                    <tbody>{rows}
                    </tbody>
                </table>
            </div>
        </div>
        <div style="background: #f8f9fc; padding: 20px; text-align: center; border-top: 1px solid #e0e0e0;">
            <p style="margin: 0; color: #7f8c8d; font-size: 14px;">📊 Reporte generado automáticamente • {count} dividendos recibidos</p>
            <p style="margin: 5px 0 0 0; color: #7f8c8d; font-size: 12px;">{rates_text}</p>
        </div>
    </div>
</body>
</html>
"#
    )
}

fn card(title: &str, amount: f64, color: &str) -> String {
    format!(
        r#"<div style="{CARD} border-left: 4px solid {color};">
                    <h3 style="margin: 0 0 10px 0; color: #2c3e50; font-size: 14px; text-transform: uppercase; letter-spacing: 1px;">{title}</h3>
                    <p style="margin: 0; font-size: 24px; font-weight: 600; color: {color};">€{amount:.2}</p>
                </div>"#
    )
}

fn push_row(out: &mut String, dividend: &Dividend) {
    let symbol = currency_symbol(&dividend.currency);

    out.push_str(&format!(
        r#"
                        <tr>
                            <td style="{ROW_CELL} font-weight: 600; color: #2c3e50;">{ticker}</td>
                            <td style="{ROW_CELL} font-size: 12px; color: #7f8c8d; max-width: 200px;">{description}</td>
                            <td style="{ROW_CELL} text-align: right; font-weight: 600; color: #27ae60;">{symbol}{gross:.2}<br><span style="font-size: 12px; color: #7f8c8d;">€{gross_base:.2}</span></td>
                            <td style="{ROW_CELL} text-align: right; color: #e74c3c;">{symbol}{tax:.2}<br><span style="font-size: 12px; color: #7f8c8d;">€{tax_base:.2}</span></td>
                            <td style="{ROW_CELL} text-align: right; font-weight: 600; color: #2980b9;">{symbol}{net:.2}<br><span style="font-size: 12px; color: #7f8c8d;">€{net_base:.2}</span></td>
                        </tr>"#,
        ticker = escape(&dividend.symbol),
        description = escape(&dividend.description),
        gross = dividend.gross_amount.abs(),
        gross_base = dividend.gross_in_base(),
        tax = dividend.tax.abs(),
        tax_base = dividend.tax_in_base(),
        net = dividend.net_amount.abs(),
        net_base = dividend.net_in_base(),
    ));
}

fn currency_symbol(currency: &str) -> String {
    match currency {
        "USD" => "$".to_string(),
        other => escape(other),
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
