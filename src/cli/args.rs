use std::convert::Infallible;

use clap::ArgAction;
use clap::Parser;
use humantime::Duration;
use tracing::Level;
use url::Url;

pub const DEFAULT_REGISTRY_URL: &str = "http://127.0.0.1:3000/v2/";

pub fn vec_of_string_from_str(value: &str) -> Result<Vec<String>, Infallible> {
    let trimmed = value.trim_matches('"').trim_matches('\''); // Remove surrounding quotes
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    Ok(trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(|t| {
            let s = t.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
        .collect::<Vec<String>>())
}

/// Parse the registry API base.
///
/// Paths are joined onto the base, so a missing trailing slash would
/// silently drop the last path segment. We add one instead.
pub fn try_parse_registry_url(value: &str) -> Result<Url, String> {
    let trimmed = value.trim().trim_matches('"');
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| format!("Invalid registry URL {trimmed}: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(format!(
            "Invalid registry URL {trimmed}: the scheme must be http or https, not {scheme}"
        )),
    }
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Input {
    /// The registry API base, e.g. https://registry.example.com/v2/
    #[arg(long, env = "REGISTRY_URL", value_parser = try_parse_registry_url, default_value = DEFAULT_REGISTRY_URL)]
    pub registry_url: Url,

    /// How old tags should be before being deleted
    #[arg(long, env = "CUT_OFF", default_value = "30d")]
    pub cut_off: Duration,

    /// The repository names to target. Supports `*`, `?` and `!` negation
    #[arg(long, env = "REPOSITORIES", value_parser = vec_of_string_from_str, default_value = "")]
    pub repositories: std::vec::Vec<String>,

    /// The tags to target. Supports `*`, `?` and `!` negation
    #[arg(long, env = "TAGS", value_parser = vec_of_string_from_str, default_value = "")]
    pub tags: std::vec::Vec<String>,

    /// Whether to only log what would be deleted
    #[arg(long, env = "DRY_RUN", action(ArgAction::Set), default_value = "false")]
    pub dry_run: bool,

    /// The log level to use when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: Level,
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use super::*;

    #[test]
    fn test_vec_of_string_from_str() {
        assert_eq!(
            vec_of_string_from_str("foo,bar").unwrap(),
            vec!["foo".to_string(), "bar".to_string()]
        );
        assert_eq!(
            vec_of_string_from_str("foo , bar").unwrap(),
            vec!["foo".to_string(), "bar".to_string()]
        );
        assert_eq!(
            vec_of_string_from_str("foo  bar baz").unwrap(),
            vec!["foo".to_string(), "bar".to_string(), "baz".to_string()]
        );
        assert_eq!(
            vec_of_string_from_str("\"!latest, v*\"").unwrap(),
            vec!["!latest".to_string(), "v*".to_string()]
        );
        assert!(vec_of_string_from_str("").unwrap().is_empty());
        assert!(vec_of_string_from_str("''").unwrap().is_empty());
    }

    #[test]
    fn test_try_parse_registry_url() {
        assert_eq!(
            try_parse_registry_url("http://127.0.0.1:3000/v2/").unwrap().as_str(),
            "http://127.0.0.1:3000/v2/"
        );
        // A trailing slash is added when missing
        assert_eq!(
            try_parse_registry_url("https://registry.example.com/v2").unwrap().as_str(),
            "https://registry.example.com/v2/"
        );
        assert!(try_parse_registry_url("registry.example.com/v2").is_err());
        assert!(try_parse_registry_url("ftp://registry.example.com/v2/").is_err());
        assert!(try_parse_registry_url("").is_err());
    }

    #[test]
    fn parse_defaults() {
        let input = Input::try_parse_from(["registry-retention"]).unwrap();
        assert_eq!(input.registry_url.as_str(), DEFAULT_REGISTRY_URL);
        assert_eq!(*input.cut_off, StdDuration::from_secs(30 * 24 * 60 * 60));
        assert!(input.repositories.is_empty());
        assert!(input.tags.is_empty());
        assert!(!input.dry_run);
        assert_eq!(input.log_level, Level::INFO);
    }

    #[test]
    fn parse_input() {
        let input = Input::try_parse_from([
            "registry-retention",
            "--registry-url=https://registry.example.com/v2",
            "--cut-off=1w",
            "--repositories=\"app, tools/*\"",
            "--tags=!latest",
            "--dry-run=true",
            "--log-level=debug",
        ])
        .unwrap();
        assert_eq!(input.registry_url.as_str(), "https://registry.example.com/v2/");
        assert_eq!(*input.cut_off, StdDuration::from_secs(7 * 24 * 60 * 60));
        assert_eq!(input.repositories, vec!["app".to_string(), "tools/*".to_string()]);
        assert_eq!(input.tags, vec!["!latest".to_string()]);
        assert!(input.dry_run);
        assert_eq!(input.log_level, Level::DEBUG);
    }

    #[test]
    fn parse_invalid_input() {
        assert!(Input::try_parse_from(["registry-retention", "--cut-off=soon"]).is_err());
        assert!(Input::try_parse_from(["registry-retention", "--dry-run=maybe"]).is_err());
        assert!(Input::try_parse_from(["registry-retention", "--registry-url=file:///tmp"]).is_err());
    }
}
