use super::Bundle;
use crate::error::{GlueError, Result};

/// Picks the bundles to build: the requested one, else the default one, else
/// every bundle in name order.
pub fn select_bundles<'a>(
    bundles: &'a [Bundle],
    requested: Option<&str>,
    default: Option<&str>,
) -> Result<Vec<&'a Bundle>> {
    if bundles.is_empty() {
        return Err(GlueError::Bundle("No bundles configured".to_string()));
    }

    match requested.or(default) {
        Some(name) => bundles
            .iter()
            .find(|bundle| bundle.name == name)
            .map(|bundle| vec![bundle])
            .ok_or_else(|| GlueError::Bundle(format!("Bundle '{}' not found", name))),
        None => Ok(bundles.iter().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::UserOptions;

    fn bundle(name: &str) -> Bundle {
        Bundle {
            name: name.to_string(),
            files: Vec::new(),
            options: UserOptions::default(),
        }
    }

    fn names(selected: &[&Bundle]) -> Vec<String> {
        selected.iter().map(|b| b.name.clone()).collect()
    }

    #[test]
    fn test_requested_bundle_wins_over_default() {
        let bundles = [bundle("app"), bundle("vendor")];

        let selected = select_bundles(&bundles, Some("vendor"), Some("app")).unwrap();

        assert_eq!(names(&selected), vec!["vendor"]);
    }

    #[test]
    fn test_default_bundle_used_when_none_requested() {
        let bundles = [bundle("app"), bundle("vendor")];

        let selected = select_bundles(&bundles, None, Some("app")).unwrap();

        assert_eq!(names(&selected), vec!["app"]);
    }

    #[test]
    fn test_all_bundles_without_request_or_default() {
        let bundles = [bundle("app"), bundle("vendor")];

        let selected = select_bundles(&bundles, None, None).unwrap();

        assert_eq!(names(&selected), vec!["app", "vendor"]);
    }

    #[test]
    fn test_unknown_bundle_fails() {
        let bundles = [bundle("app")];

        let err = select_bundles(&bundles, Some("docs"), None).unwrap_err();

        assert_eq!(err.to_string(), "Bundle error: Bundle 'docs' not found");
    }

    #[test]
    fn test_no_bundles_fails() {
        assert!(select_bundles(&[], None, None).is_err());
    }
}
