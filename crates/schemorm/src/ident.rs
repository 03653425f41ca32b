//! Table and column name validation for hardened statements.
//!
//! Model titles and filter keys are spliced into statement text, so in
//! [`RenderMode::Hardened`](crate::RenderMode::Hardened) every name must parse as an [`Ident`]:
//!
//! - unquoted parts match `[A-Za-z_][A-Za-z0-9_$]*`
//! - quoted parts (`"Some Name"`) may hold anything but NUL; `""` escapes a quote
//! - parts are joined with `.` (`schema.table`)
//!
//! Hardened statements write every part double-quoted ([`Ident::to_quoted_sql`]).

use crate::error::{OrmError, OrmResult};
use std::iter::Peekable;
use std::str::Chars;

/// One dot-separated segment of an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    Unquoted(String),
    Quoted(String),
}

/// A validated SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

fn invalid(name: &str, reason: impl std::fmt::Display) -> OrmError {
    OrmError::InvalidIdentifier(format!("{name:?}: {reason}"))
}

impl Ident {
    /// Parse a possibly dotted, possibly quoted identifier.
    pub fn parse(name: &str) -> OrmResult<Self> {
        if name.is_empty() {
            return Err(invalid(name, "identifier cannot be empty"));
        }
        if name.contains('\0') {
            return Err(invalid(name, "identifier cannot contain NUL"));
        }

        let mut parts = Vec::new();
        let mut chars = name.chars().peekable();
        loop {
            let part = if chars.peek() == Some(&'"') {
                chars.next();
                parse_quoted(name, &mut chars)?
            } else {
                parse_unquoted(name, &mut chars)?
            };
            parts.push(part);

            match chars.next() {
                None => break,
                Some('.') if chars.peek().is_some() => continue,
                Some('.') => return Err(invalid(name, "trailing '.'")),
                Some(c) => return Err(invalid(name, format!("unexpected character '{c}'"))),
            }
        }

        Ok(Self { parts })
    }

    /// Render the identifier back into SQL, re-escaping quoted parts.
    pub fn to_sql(&self) -> String {
        let rendered: Vec<String> = self
            .parts
            .iter()
            .map(|part| match part {
                IdentPart::Unquoted(s) => s.clone(),
                IdentPart::Quoted(s) => format!("\"{}\"", s.replace('"', "\"\"")),
            })
            .collect();
        rendered.join(".")
    }

    /// Render every part double-quoted, so reserved words and mixed case survive.
    ///
    /// `user` becomes `"user"` and `public.firstName` becomes `"public"."firstName"`.
    pub fn to_quoted_sql(&self) -> String {
        let rendered: Vec<String> = self
            .parts
            .iter()
            .map(|part| {
                let (IdentPart::Unquoted(s) | IdentPart::Quoted(s)) = part;
                format!("\"{}\"", s.replace('"', "\"\""))
            })
            .collect();
        rendered.join(".")
    }
}

fn parse_quoted(name: &str, chars: &mut Peekable<Chars<'_>>) -> OrmResult<IdentPart> {
    let mut out = String::new();
    loop {
        match chars.next() {
            Some('"') if chars.peek() == Some(&'"') => {
                chars.next();
                out.push('"');
            }
            Some('"') => break,
            Some(c) => out.push(c),
            None => return Err(invalid(name, "unclosed quoted identifier")),
        }
    }
    if out.is_empty() {
        return Err(invalid(name, "empty quoted identifier"));
    }
    Ok(IdentPart::Quoted(out))
}

fn parse_unquoted(name: &str, chars: &mut Peekable<Chars<'_>>) -> OrmResult<IdentPart> {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        let ok = if out.is_empty() {
            c == '_' || c.is_ascii_alphabetic()
        } else {
            c == '_' || c == '$' || c.is_ascii_alphanumeric()
        };
        if !ok {
            break;
        }
        out.push(c);
        chars.next();
    }
    if out.is_empty() {
        return match chars.peek() {
            Some(c) => Err(invalid(name, format!("invalid start character '{c}'"))),
            None => Err(invalid(name, "empty identifier segment")),
        };
    }
    Ok(IdentPart::Unquoted(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_camel_case() {
        assert_eq!(Ident::parse("user").unwrap().to_sql(), "user");
        assert_eq!(Ident::parse("firstName").unwrap().to_sql(), "firstName");
        assert_eq!(Ident::parse("col$1").unwrap().to_sql(), "col$1");
    }

    #[test]
    fn dotted() {
        let ident = Ident::parse("public.user").unwrap();
        assert_eq!(ident.parts.len(), 2);
        assert_eq!(ident.to_sql(), "public.user");
    }

    #[test]
    fn quoted_round_trips_escapes() {
        let ident = Ident::parse(r#"public."User ""Model""""#).unwrap();
        assert_eq!(
            ident.parts[1],
            IdentPart::Quoted(r#"User "Model""#.to_string())
        );
        assert_eq!(ident.to_sql(), r#"public."User ""Model""""#);
    }

    #[test]
    fn quoted_sql_quotes_every_part() {
        assert_eq!(Ident::parse("user").unwrap().to_quoted_sql(), r#""user""#);
        assert_eq!(Ident::parse("order").unwrap().to_quoted_sql(), r#""order""#);
        assert_eq!(
            Ident::parse("public.firstName").unwrap().to_quoted_sql(),
            r#""public"."firstName""#
        );
        assert_eq!(
            Ident::parse(r#"app."User ""Model""""#).unwrap().to_quoted_sql(),
            r#""app"."User ""Model""""#
        );
    }

    #[test]
    fn rejects_injection_shapes() {
        for bad in [
            "",
            "1user",
            "user name",
            "user;",
            "user'--",
            "a..b",
            "a.",
            ".a",
            r#""open"#,
            r#""""#,
        ] {
            let err = Ident::parse(bad).unwrap_err();
            assert!(
                matches!(err, OrmError::InvalidIdentifier(_)),
                "{bad:?} should be rejected"
            );
        }
    }
}
