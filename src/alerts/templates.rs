//! Static alert texts, German first with an English line under each.
//!
//! The content only depends on the period kind; the sum and the limit are not
//! part of the message.

use crate::models::{AlertEvent, PeriodKind};

const FONT_STYLE: &str = "font-family: Segoe UI";

const TIPS: [(&str, &str); 7] = [
    ("Stoffbeutel statt Plastiktüten", "Cloth bags instead of plastic bags"),
    ("Keine Kaffeekapseln verwenden", "Skip coffee capsules"),
    ("Obst und Gemüse lose einkaufen", "Buy fruit and vegetables loose"),
    (
        "Eine große Packung statt vieler kleiner Packungen kaufen",
        "Buy one large pack instead of many small ones",
    ),
    ("Zahnbürsten aus Holz statt aus Plastik", "Wooden toothbrushes instead of plastic ones"),
    ("Milch und Joghurt im Glas", "Milk and yoghurt in glass jars"),
    ("Reparieren statt neu kaufen", "Repair instead of buying new"),
];

pub fn subject(kind: PeriodKind) -> &'static str {
    match kind {
        PeriodKind::Month => "Monatslimit erreicht / Monthly limit reached",
        PeriodKind::Year => "Jahreslimit erreicht / Yearly limit reached",
    }
}

fn heading(kind: PeriodKind) -> (&'static str, &'static str) {
    match kind {
        PeriodKind::Month => ("Monatliches Limit überschritten", "Monthly limit exceeded"),
        PeriodKind::Year => ("Jährliches Limit überschritten", "Yearly limit exceeded"),
    }
}

pub fn html_body(kind: PeriodKind) -> String {
    let (heading_de, heading_en) = heading(kind);
    let tips: String = TIPS
        .iter()
        .map(|(de, en)| format!("<li>{de}<br><small>{en}</small></li>"))
        .collect();

    format!(
        "<h1 style=\"{FONT_STYLE}\">{heading_de}</h1>\
         <p style=\"{FONT_STYLE}\">{heading_en}</p>\
         <h3 style=\"{FONT_STYLE}\">Tipps zur Müllreduzierung / Tips for reducing waste:</h3>\
         <ul style=\"{FONT_STYLE}\">{tips}</ul>"
    )
}

/// Subject and body for `kind`.
pub fn render(kind: PeriodKind) -> AlertEvent {
    AlertEvent {
        kind,
        subject: subject(kind).to_string(),
        body: html_body(kind),
    }
}
