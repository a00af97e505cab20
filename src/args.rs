//! Command-line argument grammar for the `osmpbfstat` binary (spec §6).
//!
//! This is the external CLI collaborator, not the decode core: it parses
//! flags into a [`Command`] and leaves everything else (opening files,
//! invoking the library, formatting output) to `main.rs`. Every malformed
//! invocation reported here must map to exit code 1, which rules out
//! deriving this from a general-purpose argument-parsing crate (see
//! `DESIGN.md`) — the grammar is walked by hand, the way the teacher's own
//! `args.rs` owns its argument grammar.

use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq)]
pub enum Query {
    Help,
    Summary,
    BBox,
    Node(i64),
    Way(i64, Vec<String>),
}

#[derive(Debug, PartialEq, Eq)]
pub struct Command {
    pub input: Option<PathBuf>,
    pub query: Query,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ArgsError(pub String);

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses a CLI invocation (excluding argv[0]) into a [`Command`].
///
/// `-h` takes priority over everything else and needs no input file. `-f` is
/// optional: omitting it means "read standard input" (spec §6), so a missing
/// `-f` is not by itself an error. Every other error — unknown flag,
/// duplicate `-f`, a flag missing its required argument, an extra positional
/// after `-s`/`-b`, or no query flag at all — is reported as an
/// [`ArgsError`]; the caller maps that to exit code 1.
pub fn parse(args: &[String]) -> Result<Command, ArgsError> {
    let mut input: Option<PathBuf> = None;
    let mut query: Option<Query> = None;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command { input: None, query: Query::Help }),
            "-f" => {
                if input.is_some() {
                    return Err(ArgsError("duplicate -f flag".into()));
                }
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| ArgsError("-f requires a PATH argument".into()))?;
                input = Some(PathBuf::from(path));
            }
            "-s" => {
                if query.is_some() {
                    return Err(ArgsError("conflicting query flags".into()));
                }
                query = Some(Query::Summary);
            }
            "-b" => {
                if query.is_some() {
                    return Err(ArgsError("conflicting query flags".into()));
                }
                query = Some(Query::BBox);
            }
            "-n" => {
                if query.is_some() {
                    return Err(ArgsError("conflicting query flags".into()));
                }
                i += 1;
                let id = args
                    .get(i)
                    .ok_or_else(|| ArgsError("-n requires an ID argument".into()))?;
                let id: i64 = id
                    .parse()
                    .map_err(|_| ArgsError(format!("-n argument `{}` is not a valid id", id)))?;
                query = Some(Query::Node(id));
            }
            "-w" => {
                if query.is_some() {
                    return Err(ArgsError("conflicting query flags".into()));
                }
                i += 1;
                let id = args
                    .get(i)
                    .ok_or_else(|| ArgsError("-w requires an ID argument".into()))?;
                let id: i64 = id
                    .parse()
                    .map_err(|_| ArgsError(format!("-w argument `{}` is not a valid id", id)))?;
                let mut keys = Vec::new();
                while i + 1 < args.len() && !args[i + 1].starts_with('-') {
                    i += 1;
                    keys.push(args[i].clone());
                }
                query = Some(Query::Way(id, keys));
            }
            other if other.starts_with('-') => {
                return Err(ArgsError(format!("unknown flag `{}`", other)));
            }
            other => {
                // an extra positional only makes sense following -s/-b,
                // which take no arguments of their own; any other bare
                // token at this point is unexpected.
                return Err(ArgsError(format!("unexpected extra argument `{}`", other)));
            }
        }
        i += 1;
    }

    let query = query.ok_or_else(|| ArgsError("no query flag given (-s, -b, -n, or -w)".into()))?;

    Ok(Command { input, query })
}

#[cfg(test)]
mod test {
    use super::*;

    fn s(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn help_short_circuits_everything() {
        let cmd = parse(&s(&["-s", "-h"])).unwrap();
        assert_eq!(cmd.query, Query::Help);
    }

    #[test]
    fn summary_query_with_input() {
        let cmd = parse(&s(&["-f", "map.pbf", "-s"])).unwrap();
        assert_eq!(cmd.input, Some(PathBuf::from("map.pbf")));
        assert_eq!(cmd.query, Query::Summary);
    }

    #[test]
    fn node_query_parses_id() {
        let cmd = parse(&s(&["-f", "map.pbf", "-n", "213352011"])).unwrap();
        assert_eq!(cmd.query, Query::Node(213352011));
    }

    #[test]
    fn way_query_with_no_keys() {
        let cmd = parse(&s(&["-f", "map.pbf", "-w", "20175414"])).unwrap();
        assert_eq!(cmd.query, Query::Way(20175414, vec![]));
    }

    #[test]
    fn way_query_with_keys() {
        let cmd = parse(&s(&["-f", "map.pbf", "-w", "20175414", "highway", "surface"])).unwrap();
        assert_eq!(
            cmd.query,
            Query::Way(20175414, vec!["highway".to_string(), "surface".to_string()])
        );
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert!(parse(&s(&["-z"])).is_err());
    }

    #[test]
    fn duplicate_f_is_an_error() {
        assert!(parse(&s(&["-f", "a.pbf", "-f", "b.pbf", "-s"])).is_err());
    }

    #[test]
    fn missing_argument_is_an_error() {
        assert!(parse(&s(&["-f"])).is_err());
        assert!(parse(&s(&["-f", "a.pbf", "-n"])).is_err());
    }

    #[test]
    fn extra_positional_after_summary_is_an_error() {
        assert!(parse(&s(&["-f", "a.pbf", "-s", "extra"])).is_err());
    }

    #[test]
    fn missing_f_falls_back_to_stdin() {
        let cmd = parse(&s(&["-s"])).unwrap();
        assert_eq!(cmd.input, None);
        assert_eq!(cmd.query, Query::Summary);
    }

    #[test]
    fn missing_query_flag_is_an_error() {
        assert!(parse(&s(&["-f", "a.pbf"])).is_err());
    }
}
