fn main() {
    schemorm_cli::init_logging();
    if let Err(e) = schemorm_cli::run(std::env::args().collect()) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
