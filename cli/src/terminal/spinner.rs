use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Per-device progress over the batch being probed.
///
/// The engine's progress callback drives `inc`; the message shows the most
/// recently finished device.
pub fn probe_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let style = ProgressStyle::with_template("{spinner:.blue} [{pos}/{len}] {msg}")
        .unwrap()
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ]);

    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
