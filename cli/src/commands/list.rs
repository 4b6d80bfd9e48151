use std::path::Path;

use conncheck_common::device::ConnectivityClass;
use conncheck_common::inventory;

use crate::terminal::{format, print};

pub fn run(file: &Path) -> anyhow::Result<()> {
    let records = inventory::load(file)?;

    print::header("device inventory");
    if records.is_empty() {
        print::no_results();
        return Ok(());
    }

    for (idx, record) in records.iter().enumerate() {
        print::tree_head(idx, &record.name);
        print::as_tree_one_level(format::record_to_details(record));
        if idx + 1 != records.len() {
            print::blank();
        }
    }

    print::header("connectivity summary");
    for class in ConnectivityClass::ALL {
        let count = records
            .iter()
            .filter(|record| record.connectivity() == class)
            .count();
        if count > 0 {
            print::tally(format::class_colored(class), count);
        }
    }

    Ok(())
}
