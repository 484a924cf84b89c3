fn main() {
    if let Err(err) = firetv_watcher::app::run() {
        eprintln!("watcher startup failed: {err}");
        std::process::exit(1);
    }
}
