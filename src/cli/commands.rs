//! CLI command implementations
//!
//! Commands are thin dispatchers onto [`AdminClient`]; results are rendered
//! as pretty-printed JSON so they compose with the usual shell tooling.

use std::env;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::client::{AdminClient, AuthProvider};

use super::args::{BucketAction, Cli, Command, ConnectionArgs, KeyAction, UsageAction, UserAction};
use super::errors::{CliError, CliResult};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved connection settings: CLI flags merged over environment
/// variables.
#[derive(Debug)]
pub struct Connection {
    pub endpoint: String,
    pub auth: AuthProvider,
    pub timeout: Duration,
}

impl Connection {
    pub fn resolve(args: &ConnectionArgs) -> CliResult<Self> {
        Self::from_sources(args, |name| env::var(name).ok())
    }

    fn from_sources(
        args: &ConnectionArgs,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> CliResult<Self> {
        let endpoint = args
            .endpoint
            .clone()
            .or_else(|| lookup("RGW_ADMIN_ENDPOINT"))
            .ok_or_else(|| {
                CliError::Config("no endpoint; pass --endpoint or set RGW_ADMIN_ENDPOINT".into())
            })?;

        let basic = args.basic.clone().or_else(|| lookup("RGW_ADMIN_BASIC"));
        let bearer = args.bearer.clone().or_else(|| lookup("RGW_ADMIN_BEARER"));
        let auth = match (basic, bearer) {
            (Some(_), Some(_)) => {
                return Err(CliError::Config(
                    "choose either basic or bearer credentials, not both".into(),
                ))
            }
            (Some(pair), None) => {
                let (user, password) = pair.split_once(':').ok_or_else(|| {
                    CliError::Config("basic credentials must be user:password".into())
                })?;
                AuthProvider::basic(user, password)
            }
            (None, Some(token)) => AuthProvider::bearer(token),
            (None, None) => AuthProvider::None,
        };

        let timeout_secs = match args.timeout_secs {
            Some(secs) => secs,
            None => match lookup("RGW_ADMIN_TIMEOUT_SECS") {
                Some(raw) => raw.parse().map_err(|_| {
                    CliError::Config(format!("invalid RGW_ADMIN_TIMEOUT_SECS value {raw:?}"))
                })?,
                None => DEFAULT_TIMEOUT_SECS,
            },
        };

        Ok(Self {
            endpoint,
            auth,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    fn client(&self) -> CliResult<AdminClient> {
        Ok(AdminClient::builder()
            .endpoint(&self.endpoint)
            .auth(self.auth.clone())
            .timeout(self.timeout)
            .build()?)
    }
}

/// Resolves the connection and dispatches the parsed command.
pub async fn run_command(cli: Cli) -> CliResult<()> {
    let connection = Connection::resolve(&cli.connection)?;
    let client = connection.client()?;

    match cli.command {
        Command::User { action } => user_command(&client, action).await,
        Command::Bucket { action } => bucket_command(&client, action).await,
        Command::Key { action } => key_command(&client, action).await,
        Command::Usage { action } => usage_command(&client, action).await,
    }
}

async fn user_command(client: &AdminClient, action: UserAction) -> CliResult<()> {
    match action {
        UserAction::List => print_json(&client.list_user_ids().await?),
        UserAction::Show { uid } => print_json(&client.get_user(&uid).await?),
        UserAction::Create {
            uid,
            display_name,
            caps,
        } => {
            let caps = parse_caps(&caps)?;
            print_json(&client.create_user(&uid, &display_name, &caps).await?)
        }
        UserAction::Update { uid, display_name } => {
            print_json(&client.update_user(&uid, display_name.as_deref()).await?)
        }
        UserAction::Delete { uid, keep_data } => {
            client.delete_user(&uid, !keep_data).await?;
            Ok(())
        }
    }
}

async fn bucket_command(client: &AdminClient, action: BucketAction) -> CliResult<()> {
    match action {
        BucketAction::List { uid } => print_json(&client.list_bucket_names(uid.as_deref()).await?),
        BucketAction::Stats { uid } => print_json(&client.list_bucket_stats(uid.as_deref()).await?),
        BucketAction::Show { bucket } => match client.get_bucket_stats(&bucket).await? {
            Some(stats) => print_json(&stats),
            None => Err(CliError::InvalidArgument(format!(
                "no such bucket: {bucket}"
            ))),
        },
        BucketAction::Delete {
            bucket,
            purge_objects,
        } => {
            client.delete_bucket(&bucket, purge_objects).await?;
            Ok(())
        }
    }
}

async fn key_command(client: &AdminClient, action: KeyAction) -> CliResult<()> {
    match action {
        KeyAction::Create { uid, access_key } => {
            print_json(&client.create_key(&uid, access_key.as_deref()).await?)
        }
        KeyAction::Regenerate { uid, access_key } => {
            print_json(&client.generate_new_secret_key(&uid, &access_key).await?)
        }
        KeyAction::Delete { uid, access_key } => {
            client.delete_key(&uid, &access_key).await?;
            Ok(())
        }
    }
}

async fn usage_command(client: &AdminClient, action: UsageAction) -> CliResult<()> {
    match action {
        UsageAction::Show { uid, start, end } => {
            let start = start.as_deref().map(parse_window_bound).transpose()?;
            let end = end.as_deref().map(parse_window_bound).transpose()?;
            print_json(&client.get_usage(uid.as_deref(), start, end).await?)
        }
        UsageAction::Trim { until } => {
            let until = NaiveDate::parse_from_str(&until, "%Y-%m-%d").map_err(|_| {
                CliError::InvalidArgument(format!("not a YYYY-MM-DD date: {until:?}"))
            })?;
            client.delete_usage(until).await?;
            Ok(())
        }
    }
}

fn parse_caps(raw: &[String]) -> CliResult<Vec<(&str, &str)>> {
    raw.iter()
        .map(|cap| {
            cap.split_once('=').ok_or_else(|| {
                CliError::InvalidArgument(format!("capability must be type=rights: {cap:?}"))
            })
        })
        .collect()
}

fn parse_window_bound(raw: &str) -> CliResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|bound| bound.with_timezone(&Utc))
        .map_err(|_| CliError::InvalidArgument(format!("not an RFC 3339 timestamp: {raw:?}")))
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_none(_name: &str) -> Option<String> {
        None
    }

    #[test]
    fn endpoint_is_required() {
        let err = Connection::from_sources(&ConnectionArgs::default(), lookup_none).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn flags_override_the_environment() {
        let args = ConnectionArgs {
            endpoint: Some("http://flag.example.com/admin".into()),
            timeout_secs: Some(5),
            ..Default::default()
        };
        let lookup = |name: &str| match name {
            "RGW_ADMIN_ENDPOINT" => Some("http://env.example.com/admin".into()),
            "RGW_ADMIN_TIMEOUT_SECS" => Some("60".into()),
            _ => None,
        };

        let connection = Connection::from_sources(&args, lookup).unwrap();
        assert_eq!(connection.endpoint, "http://flag.example.com/admin");
        assert_eq!(connection.timeout, Duration::from_secs(5));
    }

    #[test]
    fn environment_fills_the_gaps() {
        let lookup = |name: &str| match name {
            "RGW_ADMIN_ENDPOINT" => Some("http://env.example.com/admin".into()),
            "RGW_ADMIN_BEARER" => Some("tok".into()),
            _ => None,
        };

        let connection = Connection::from_sources(&ConnectionArgs::default(), lookup).unwrap();
        assert_eq!(connection.endpoint, "http://env.example.com/admin");
        assert!(matches!(connection.auth, AuthProvider::Bearer(_)));
        assert_eq!(connection.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn conflicting_credentials_are_rejected() {
        let args = ConnectionArgs {
            endpoint: Some("http://example.com".into()),
            basic: Some("ops:secret".into()),
            bearer: Some("tok".into()),
            ..Default::default()
        };
        assert!(matches!(
            Connection::from_sources(&args, lookup_none),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn malformed_basic_credentials_are_rejected() {
        let args = ConnectionArgs {
            endpoint: Some("http://example.com".into()),
            basic: Some("no-colon".into()),
            ..Default::default()
        };
        assert!(matches!(
            Connection::from_sources(&args, lookup_none),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn bad_timeout_values_are_rejected_not_ignored() {
        let lookup = |name: &str| match name {
            "RGW_ADMIN_ENDPOINT" => Some("http://example.com".into()),
            "RGW_ADMIN_TIMEOUT_SECS" => Some("soon".into()),
            _ => None,
        };
        assert!(matches!(
            Connection::from_sources(&ConnectionArgs::default(), lookup),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn caps_parse_into_pairs() {
        let raw = vec!["usage=read,write".to_owned(), "buckets=read".to_owned()];
        assert_eq!(
            parse_caps(&raw).unwrap(),
            vec![("usage", "read,write"), ("buckets", "read")]
        );
        assert!(parse_caps(&["usage".to_owned()]).is_err());
    }

    #[test]
    fn window_bounds_parse_rfc3339() {
        let bound = parse_window_bound("2023-05-04T09:00:00Z").unwrap();
        assert_eq!(bound.timestamp(), 1683190800);
        assert!(parse_window_bound("yesterday").is_err());
    }
}
