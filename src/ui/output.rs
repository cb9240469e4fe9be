use crate::model::ResourceKind;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

/// One progress line per record fetched during ingestion
pub fn resolved(kind: ResourceKind, line: &str) {
    let icon = match kind {
        ResourceKind::Pokemon => Icons::PACKAGE,
        ResourceKind::Type | ResourceKind::Move => Icons::LINK,
    };
    println!(
        "{} {} {}",
        icon,
        format!("{:<7}", kind.as_str()).style(theme().dim.clone()),
        line
    );
}
