mod cli;
mod schema_cmd;
mod sql_cmd;

/// Log to stderr so statement output on stdout stays clean.
///
/// The filter comes from `SCHEMORM_LOG`, then `RUST_LOG`, defaulting to `warn`.
pub fn init_logging() {
    let filter = std::env::var("SCHEMORM_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .with_env_filter(filter)
        .init();
}

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Sql(args) => {
            println!("{}", sql_cmd::render(&args)?);
            Ok(())
        }
        cli::Command::Schema(cmd) => match cmd {
            cli::SchemaCommand::Check(source) => schema_cmd::check(&source),
            cli::SchemaCommand::Validate(args) => schema_cmd::validate(&args),
        },
    }
}
