use crate::cli::{SqlArgs, StatementKind};
use anyhow::Context;
use schemorm::{Data, Filter, FindQuery, RenderMode, StatementBuilder};
use serde_json::Value;

fn parse_json(flag: &str, raw: Option<&str>) -> anyhow::Result<Value> {
    match raw {
        Some(raw) => serde_json::from_str(raw).with_context(|| format!("{flag} is not valid JSON")),
        None => Ok(Value::Null),
    }
}

/// Build the statement text for one `schemorm sql` invocation.
pub fn render(args: &SqlArgs) -> anyhow::Result<String> {
    let mode = if args.hardened {
        RenderMode::Hardened
    } else {
        RenderMode::Verbatim
    };
    let builder = StatementBuilder::with_mode(mode);

    if args.data.is_some() && matches!(args.kind, StatementKind::Select | StatementKind::Delete) {
        anyhow::bail!("--data is only used by insert and update");
    }
    if args.filter.is_some() && args.kind == StatementKind::Insert {
        anyhow::bail!("--filter is not used by insert");
    }

    let data = parse_json("--data", args.data.as_deref())?;
    let filter = parse_json("--filter", args.filter.as_deref())?;
    tracing::debug!(kind = ?args.kind, table = %args.table, ?mode, "building statement");

    let sql = match args.kind {
        StatementKind::Select => builder.build_select(&args.table, &FindQuery::from_json(&filter)?)?,
        StatementKind::Insert => builder.build_insert(&args.table, &Data::from_json(&data)?)?,
        StatementKind::Update => builder.build_update(
            &args.table,
            Some(&Data::from_json(&data)?),
            &Filter::from_json(&filter)?,
        )?,
        StatementKind::Delete => builder.build_delete(&args.table, &Filter::from_json(&filter)?)?,
    };
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(kind: StatementKind, data: Option<&str>, filter: Option<&str>) -> SqlArgs {
        SqlArgs {
            kind,
            table: "user".to_string(),
            data: data.map(String::from),
            filter: filter.map(String::from),
            hardened: false,
        }
    }

    #[test]
    fn renders_each_statement_kind() {
        assert_eq!(
            render(&args(
                StatementKind::Select,
                None,
                Some(r#"{"selectColumns":["id"],"or":[{"firstName":"gayan"},{"age":{">":30}}]}"#)
            ))
            .unwrap(),
            "SELECT id FROM user WHERE (firstName='gayan' OR age >'30')"
        );
        assert_eq!(
            render(&args(StatementKind::Insert, Some(r#"{"firstName":"gayan","age":31}"#), None))
                .unwrap(),
            "INSERT INTO user (firstName,age) VALUES ('gayan','31');"
        );
        assert_eq!(
            render(&args(
                StatementKind::Update,
                Some(r#"{"lastName":"witharana"}"#),
                Some(r#"{"firstName":"gayan"}"#)
            ))
            .unwrap(),
            "UPDATE user SET lastName='witharana' WHERE firstName='gayan';"
        );
        assert_eq!(
            render(&args(StatementKind::Delete, None, Some(r#"{"age":{"<":18}}"#))).unwrap(),
            "DELETE FROM user WHERE age <'18';"
        );
    }

    #[test]
    fn hardened_escapes_quotes() {
        let mut a = args(StatementKind::Delete, None, Some(r#"{"name":"o'brien"}"#));
        assert_eq!(render(&a).unwrap(), "DELETE FROM user WHERE name='o'brien';");
        a.hardened = true;
        assert_eq!(
            render(&a).unwrap(),
            r#"DELETE FROM "user" WHERE "name"='o''brien';"#
        );
    }

    #[test]
    fn rejects_misplaced_or_invalid_input() {
        assert!(render(&args(StatementKind::Select, Some("{}"), None)).is_err());
        assert!(render(&args(StatementKind::Insert, Some("{}"), Some("{}"))).is_err());
        assert!(render(&args(StatementKind::Delete, None, Some("{not json"))).is_err());
        assert!(render(&args(StatementKind::Delete, None, None)).is_err());
        assert!(render(&args(StatementKind::Update, None, Some(r#"{"a":1}"#))).is_err());
    }
}
