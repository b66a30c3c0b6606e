fn main() {
    if let Err(err) = evjoints_admin_api::app::run() {
        eprintln!("application startup failed: {err}");
        std::process::exit(1);
    }
}
