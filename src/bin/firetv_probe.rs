use chrono::Utc;

use firetv_watcher::app::ProbeReport;
use firetv_watcher::domain::events::on_off;
use firetv_watcher::domain::models::{media_label, power_status_code};

fn main() {
    let report = match firetv_watcher::app::run_probe() {
        Ok(report) => report,
        Err(err) => {
            eprintln!("probe failed: {err}");
            std::process::exit(1);
        }
    };

    print_report(&report);

    if !report.link_up {
        std::process::exit(2);
    }
}

fn print_report(report: &ProbeReport) {
    println!("[{}] link: {}", Utc::now().to_rfc3339(), up_down(report.link_up));

    let Some(sample) = &report.sample else {
        println!("  device not reachable, no signals collected");
        return;
    };

    println!(
        "  Power status: {} | Display: {}",
        power_status_code(sample.power_status),
        match sample.display_on {
            Some(on) => on_off(on),
            None => "n/a",
        }
    );
    println!(
        "  Media: {} | App: {}",
        media_label(sample.media_state),
        sample.foreground_app.as_deref().unwrap_or("n/a")
    );

    match sample.net_counters {
        Some(counters) => println!(
            "  Counters: rx={} B tx={} B",
            counters.received_bytes, counters.sent_bytes
        ),
        None => println!("  Counters: n/a"),
    }

    println!(
        "  Traffic: in={:.1} kbps out={:.1} kbps",
        report.throughput.kbps_in, report.throughput.kbps_out
    );
    for warning in &report.throughput.warnings {
        println!("  Warning: {warning:?}");
    }

    if let Some(inference) = &report.inference {
        println!(
            "  TV: {} (via {:?})",
            on_off(inference.device_on),
            inference.reason
        );
    }
}

fn up_down(value: bool) -> &'static str {
    if value { "up" } else { "down" }
}
