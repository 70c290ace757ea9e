use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::api::types::DatasetId;

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    List,
    Upload { file: Option<PathBuf> },
    Detail(DatasetId),
    /// Ids stay unvalidated here; the compare view rejects missing ones.
    Compare { base: Option<DatasetId>, target: Option<DatasetId> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteError {
    Malformed(String),
    Unknown(String),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::Malformed(s) => write!(f, "malformed route: {s}"),
            RouteError::Unknown(s) => write!(f, "no view for route: {s}"),
        }
    }
}

impl std::error::Error for RouteError {}

impl Route {
    pub fn parse(input: &str) -> Result<Self, RouteError> {
        // Routes are app-relative; resolve against a dummy origin to reuse URL parsing.
        let origin = Url::parse("http://prism.local/").map_err(|e| RouteError::Malformed(e.to_string()))?;
        let url = origin.join(input.trim()).map_err(|e| RouteError::Malformed(format!("{input}: {e}")))?;

        let query = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        };
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [] => Ok(Route::List),
            ["upload"] => Ok(Route::Upload { file: query("file").map(PathBuf::from) }),
            ["datasets", id] => id
                .parse::<DatasetId>()
                .map(Route::Detail)
                .map_err(|_| RouteError::Unknown(input.to_string())),
            ["compare"] => Ok(Route::Compare {
                base: query("base").as_deref().and_then(parse_id),
                target: query("target").as_deref().and_then(parse_id),
            }),
            _ => Err(RouteError::Unknown(input.to_string())),
        }
    }

    pub fn compare(base: DatasetId, target: DatasetId) -> Self {
        Route::Compare { base: Some(base), target: Some(target) }
    }
}

// Zero and non-numeric ids count as absent.
pub fn parse_id(raw: &str) -> Option<DatasetId> {
    raw.trim().parse::<DatasetId>().ok().filter(|id| *id != 0)
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::List => write!(f, "/"),
            Route::Upload { file: Some(p) } => write!(f, "/upload?file={}", p.display()),
            Route::Upload { file: None } => write!(f, "/upload"),
            Route::Detail(id) => write!(f, "/datasets/{id}"),
            Route::Compare { base, target } => {
                let b = base.map(|v| v.to_string()).unwrap_or_default();
                let t = target.map(|v| v.to_string()).unwrap_or_default();
                write!(f, "/compare?base={b}&target={t}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_routes() {
        assert_eq!(Route::parse("/").unwrap(), Route::List);
        assert_eq!(Route::parse("/upload").unwrap(), Route::Upload { file: None });
        assert_eq!(
            Route::parse("/upload?file=data.csv").unwrap(),
            Route::Upload { file: Some(PathBuf::from("data.csv")) }
        );
        assert_eq!(Route::parse("/datasets/42").unwrap(), Route::Detail(42));
        assert_eq!(Route::parse("/datasets/42/").unwrap(), Route::Detail(42));
        assert_eq!(Route::parse("/compare?base=1&target=2").unwrap(), Route::compare(1, 2));
    }

    #[test]
    fn compare_ids_that_are_missing_or_zero_are_absent() {
        assert_eq!(
            Route::parse("/compare?base=abc&target=0").unwrap(),
            Route::Compare { base: None, target: None }
        );
        assert_eq!(
            Route::parse("/compare?target=3").unwrap(),
            Route::Compare { base: None, target: Some(3) }
        );
    }

    #[test]
    fn unknown_routes_are_rejected() {
        assert!(matches!(Route::parse("/datasets/x"), Err(RouteError::Unknown(_))));
        assert!(matches!(Route::parse("/settings"), Err(RouteError::Unknown(_))));
    }

    #[test]
    fn display_round_trips_compare() {
        assert_eq!(Route::compare(3, 9).to_string(), "/compare?base=3&target=9");
        assert_eq!(Route::Detail(5).to_string(), "/datasets/5");
    }
}
