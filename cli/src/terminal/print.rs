use colored::*;

pub const TOTAL_WIDTH: usize = 64;

/// Section header, e.g. `─────⟦ DEVICE INVENTORY ⟧─────`.
pub fn header(msg: &str) {
    let formatted = format!("⟦ {} ⟧", msg);
    let msg_len = formatted.chars().count();

    let dash_count = TOTAL_WIDTH.saturating_sub(msg_len);
    let left = dash_count / 2;
    let right = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    println!("{line}");
}

pub fn blank() {
    println!();
}

pub fn fat_separator() {
    println!("{}", "═".repeat(TOTAL_WIDTH).bright_black());
}

pub fn centerln(msg: &str) {
    let width = console::measure_text_width(msg);
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(width) / 2);
    println!("{space}{msg}");
}

pub fn tree_head(idx: usize, name: &str) {
    let idx_str = format!("[{}]", idx.to_string().cyan());
    println!("{} {}", idx_str.bright_black(), name.bold());
}

pub fn as_tree_one_level(details: Vec<(String, ColoredString)>) {
    let key_width = details
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);

    for (i, (key, value)) in details.iter().enumerate() {
        let last = i + 1 == details.len();
        let branch: ColoredString = if last {
            "└─".bright_black()
        } else {
            "├─".bright_black()
        };
        let dots = ".".repeat(key_width.saturating_sub(key.chars().count()) + 1);
        println!(
            " {} {}{}{} {}",
            branch,
            key,
            dots.bright_black(),
            ":".bright_black(),
            value
        );
    }
}

pub fn tally(label: ColoredString, count: usize) {
    println!(" {} {}", format!("{count:>3}").bold(), label);
}

pub fn no_results() {
    println!("{}", "inventory is empty".dimmed());
}
