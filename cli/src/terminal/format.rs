use colored::*;

use conncheck_common::device::{ConnectivityClass, DeviceRecord};

pub type Detail = (String, ColoredString);

pub fn flag(value: bool) -> ColoredString {
    if value { "yes".green() } else { "no".red() }
}

pub fn class_colored(class: ConnectivityClass) -> ColoredString {
    match class {
        ConnectivityClass::FullAccess => class.label().green().bold(),
        ConnectivityClass::PingPlusSsh => class.label().cyan(),
        ConnectivityClass::PingOnly => class.label().yellow(),
        ConnectivityClass::NoPing => class.label().red(),
        ConnectivityClass::Unknown => class.label().dimmed(),
    }
}

/// Everything worth showing about a record. Passwords never leave the file.
pub fn record_to_details(record: &DeviceRecord) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("Address".to_string(), record.address.normal()),
        (
            "Port".to_string(),
            record.effective_port().to_string().normal(),
        ),
    ];

    if !record.username.is_empty() {
        details.push(("User".to_string(), record.username.normal()));
    }

    details.push(("Ping".to_string(), flag(record.ping)));
    details.push(("SSH".to_string(), flag(record.ssh)));
    details.push(("Access".to_string(), flag(record.access)));
    details.push(("Class".to_string(), class_colored(record.connectivity())));

    details
}
