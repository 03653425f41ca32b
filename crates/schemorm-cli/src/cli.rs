use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Sql,
    Schema,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Sql(SqlArgs),
    Schema(SchemaCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "select" | "find" => Some(Self::Select),
            "insert" | "create" => Some(Self::Insert),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlArgs {
    pub kind: StatementKind,
    pub table: String,
    pub data: Option<String>,
    pub filter: Option<String>,
    pub hardened: bool,
}

#[derive(Debug, Clone)]
pub enum SchemaCommand {
    Check(SchemaSource),
    Validate(SchemaValidateArgs),
}

/// Where to load model schemas from: an explicit directory or a config file's `schema_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Dir(PathBuf),
    Config(PathBuf),
}

#[derive(Debug, Clone)]
pub struct SchemaValidateArgs {
    pub source: SchemaSource,
    pub model: String,
    pub data: String,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "sql" => parse_sql(it.map(|s| s.as_str())),
        "schema" => parse_schema(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Read the value of `--name <v>` or `--name=<v>`.
///
/// Returns `Ok(None)` when `token` is not this option.
fn option_value<'a>(
    name: &str,
    token: &'a str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<&'a str>> {
    if token == name {
        let Some(v) = it.next() else {
            anyhow::bail!("{name} requires a value");
        };
        return Ok(Some(v));
    }
    Ok(token
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('=')))
}

fn parse_sql<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut kind: Option<StatementKind> = None;
    let mut table: Option<String> = None;
    let mut data: Option<String> = None;
    let mut filter: Option<String> = None;
    let mut hardened = false;

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Sql));
        }
        if token == "--hardened" {
            hardened = true;
        } else if let Some(v) = option_value("--table", token, &mut it)? {
            table = Some(v.to_string());
        } else if let Some(v) = option_value("--data", token, &mut it)? {
            data = Some(v.to_string());
        } else if let Some(v) = option_value("--filter", token, &mut it)? {
            filter = Some(v.to_string());
        } else if token.starts_with('-') {
            anyhow::bail!("unknown argument: {token}");
        } else if kind.is_none() {
            kind = Some(
                StatementKind::parse(token)
                    .ok_or_else(|| anyhow::anyhow!("unknown statement kind: {token}"))?,
            );
        } else {
            anyhow::bail!("unexpected argument: {token}");
        }
    }

    let Some(kind) = kind else {
        if table.is_none() && data.is_none() && filter.is_none() && !hardened {
            return Ok(Command::Help(HelpTopic::Sql));
        }
        anyhow::bail!("missing statement kind: expected select, insert, update or delete");
    };
    let Some(table) = table else {
        anyhow::bail!("--table is required");
    };

    Ok(Command::Sql(SqlArgs {
        kind,
        table,
        data,
        filter,
        hardened,
    }))
}

fn parse_schema<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut subcmd: Option<&str> = None;
    let mut dir: Option<PathBuf> = None;
    let mut config: Option<PathBuf> = None;
    let mut model: Option<String> = None;
    let mut data: Option<String> = None;

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Schema));
        }
        if matches!(token, "check" | "validate") && subcmd.is_none() {
            subcmd = Some(token);
        } else if let Some(v) = option_value("--dir", token, &mut it)? {
            dir = Some(PathBuf::from(v));
        } else if let Some(v) = option_value("--config", token, &mut it)? {
            config = Some(PathBuf::from(v));
        } else if let Some(v) = option_value("--model", token, &mut it)? {
            model = Some(v.to_string());
        } else if let Some(v) = option_value("--data", token, &mut it)? {
            data = Some(v.to_string());
        } else {
            anyhow::bail!("unknown argument: {token}");
        }
    }

    let Some(subcmd) = subcmd else {
        return Ok(Command::Help(HelpTopic::Schema));
    };

    let source = match (dir, config) {
        (Some(_), Some(_)) => anyhow::bail!("--dir and --config are mutually exclusive"),
        (Some(dir), None) => SchemaSource::Dir(dir),
        (None, Some(config)) => SchemaSource::Config(config),
        (None, None) => SchemaSource::Config(PathBuf::from("schemorm.toml")),
    };

    let cmd = match subcmd {
        "check" => SchemaCommand::Check(source),
        _ => {
            let Some(model) = model else {
                anyhow::bail!("--model is required");
            };
            let Some(data) = data else {
                anyhow::bail!("--data is required");
            };
            SchemaCommand::Validate(SchemaValidateArgs {
                source,
                model,
                data,
            })
        }
    };

    Ok(Command::Schema(cmd))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
schemorm - statement preview and schema checks for schemorm

USAGE:
  schemorm <COMMAND> [OPTIONS]

COMMANDS:
  sql           Print the statement a filter/data pair compiles to
  schema        Load and check a directory of model schemas
  help          Print this help

Run `schemorm <command> --help` for more."
            );
        }
        HelpTopic::Sql => {
            println!(
                "\
USAGE:
  schemorm sql <select|insert|update|delete> --table <NAME> [OPTIONS]

OPTIONS:
  --table <NAME>        Target table (required)
  --data <JSON>         Column values for insert/update
  --filter <JSON>       Filter object; for select it may carry selectColumns
  --hardened            Escape literals, validate and quote identifiers
  -h, --help            Print help

EXAMPLE:
  schemorm sql select --table user --filter '{{\"or\":[{{\"firstName\":\"gayan\"}},{{\"age\":{{\">\":30}}}}]}}'"
            );
        }
        HelpTopic::Schema => {
            println!(
                "\
USAGE:
  schemorm schema check [--dir <DIR> | --config <FILE>]
  schemorm schema validate [--dir <DIR> | --config <FILE>] --model <NAME> --data <JSON>

OPTIONS:
  --dir <DIR>           Directory of *.json model schemas
  --config <FILE>       Config file whose schema_dir is used (default: schemorm.toml)
  --model <NAME>        Model title to validate against
  --data <JSON>         Payload to validate
  -h, --help            Print help"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("schemorm")
            .chain(v.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn no_args_is_help() {
        assert!(matches!(
            parse_args(&args(&[])).unwrap(),
            Command::Help(HelpTopic::Root)
        ));
        assert!(matches!(
            parse_args(&args(&["sql"])).unwrap(),
            Command::Help(HelpTopic::Sql)
        ));
    }

    #[test]
    fn parse_sql_select() {
        let cmd = parse_args(&args(&[
            "sql",
            "select",
            "--table",
            "user",
            "--filter={\"a\":\"b\"}",
            "--hardened",
        ]))
        .unwrap();
        let Command::Sql(sql) = cmd else {
            panic!("expected sql");
        };
        assert_eq!(sql.kind, StatementKind::Select);
        assert_eq!(sql.table, "user");
        assert_eq!(sql.filter.as_deref(), Some("{\"a\":\"b\"}"));
        assert!(sql.data.is_none());
        assert!(sql.hardened);
    }

    #[test]
    fn sql_requires_table_and_known_kind() {
        assert!(parse_args(&args(&["sql", "select"])).is_err());
        assert!(parse_args(&args(&["sql", "upsert", "--table", "t"])).is_err());
        assert!(parse_args(&args(&["sql", "select", "--table"])).is_err());
        assert!(parse_args(&args(&["sql", "select", "--tabel", "t"])).is_err());
    }

    #[test]
    fn parse_schema_validate() {
        let cmd = parse_args(&args(&[
            "schema",
            "validate",
            "--dir",
            "schemas",
            "--model",
            "user",
            "--data",
            "{}",
        ]))
        .unwrap();
        let Command::Schema(SchemaCommand::Validate(v)) = cmd else {
            panic!("expected schema validate");
        };
        assert_eq!(v.source, SchemaSource::Dir(PathBuf::from("schemas")));
        assert_eq!(v.model, "user");
        assert_eq!(v.data, "{}");
    }

    #[test]
    fn schema_check_defaults_to_config_file() {
        let Command::Schema(SchemaCommand::Check(source)) =
            parse_args(&args(&["schema", "check"])).unwrap()
        else {
            panic!("expected schema check");
        };
        assert_eq!(source, SchemaSource::Config(PathBuf::from("schemorm.toml")));

        assert!(
            parse_args(&args(&["schema", "check", "--dir", "a", "--config", "b"])).is_err()
        );
    }
}
