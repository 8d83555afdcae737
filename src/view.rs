//! Plain-text rendering of navigation results

use std::fmt::Write as _;

use mono_client_notify::{Notification, NotificationKind};

use crate::format::{convert_progress_in_percent, convert_to_money_format, jar_progress, total_balance};
use crate::models::{Card, Jar, JarDetail, Transaction};
use crate::router::Navigation;

pub fn render(navigation: &Navigation) -> String {
    match navigation {
        Navigation::Redirect(route) => format!("-> {}\n", route),
        Navigation::LoginForm { error: None } => "Please sign in.\n".to_string(),
        Navigation::LoginForm { error: Some(error) } => format!("Sign-in failed: {}\n", error),
        Navigation::Home => "Signed in. Open /cards or /jars.\n".to_string(),
        Navigation::Cards(cards) => render_cards(cards.as_deref().unwrap_or_default()),
        Navigation::Jars(jars) => match jars {
            Some(jars) => render_jars(jars),
            None => String::new(),
        },
        Navigation::JarDetail(detail) => render_jar_detail(detail),
        Navigation::NotFound(path) => format!("Nothing at {}\n", path),
    }
}

fn render_cards(cards: &[Card]) -> String {
    let mut out = String::from("Credit Card List\n");
    for card in cards {
        let symbol = card.currency.display_symbol();
        let _ = writeln!(out, "  Type:         {}", card.card_type.label());
        let _ = writeln!(out, "  Balance:      {} {}", convert_to_money_format(card.balance), symbol);
        let _ = writeln!(out, "  Currency:     {}", card.currency.name);
        let _ = writeln!(
            out,
            "  Credit Limit: {} {}\n",
            convert_to_money_format(card.credit_limit),
            symbol
        );
    }
    out
}

fn render_jars(jars: &[Jar]) -> String {
    let mut out = String::from("Jars\n");
    let _ = writeln!(out, "Total balance in all your JARS: {} ₴", total_balance(jars));
    for jar in jars {
        let _ = write!(out, "  {} [{}]", jar.title, jar.id);
        if let Some(progress) = convert_progress_in_percent(jar.balance, jar.goal.filter(|g| *g != 0)) {
            let _ = write!(out, " {}", progress);
        }
        let _ = writeln!(
            out,
            " accumulated {} {}",
            convert_to_money_format(jar.balance),
            jar.currency.display_symbol()
        );
    }
    out
}

fn render_jar_detail(detail: &JarDetail) -> String {
    let mut out = String::new();

    if let Some(jar) = &detail.jar_details {
        let _ = writeln!(out, "{}", jar.title);
        let _ = writeln!(
            out,
            "Balance - {} {}",
            convert_to_money_format(jar.balance),
            jar.currency.display_symbol()
        );
        if let (true, Some(goal)) = (jar.has_goal(), jar.goal) {
            let _ = writeln!(out, "Goal - {}", convert_to_money_format(goal));
        }
        let _ = writeln!(out, "Progress - {}", jar_progress(jar));
        if let Some(link) = jar.donation_url() {
            let _ = writeln!(out, "Donate: {}", link);
        }
    }

    if let Some(transactions) = &detail.jar_transactions {
        let _ = writeln!(out, "Jar Transactions");
        for tx in transactions {
            out.push_str(&render_transaction(tx));
        }
    }

    out
}

fn render_transaction(tx: &Transaction) -> String {
    let symbol = tx.currency.display_symbol();
    let marker = if tx.is_income() { "+" } else { "-" };
    let date = tx
        .date()
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    format!(
        "  {} {} {} {} {} {}\n      {} [balance {} {}]\n",
        marker,
        date,
        tx.category_symbol.as_deref().unwrap_or(""),
        tx.category.as_deref().unwrap_or(""),
        convert_to_money_format(tx.amount),
        symbol,
        tx.description.as_deref().unwrap_or(""),
        convert_to_money_format(tx.balance),
        symbol
    )
}

pub fn render_notifications(notifications: &[Notification]) -> String {
    let mut out = String::new();
    for notification in notifications {
        let tag = match notification.kind {
            NotificationKind::Info => "info",
            NotificationKind::Error => "error",
        };
        let _ = writeln!(out, "[{}] {}", tag, notification.message);
    }
    out
}
