//! Agent requirement validation
//!
//! An agent declares the tool names it needs up front. These helpers compare
//! that list with a catalog and report every absent name at once: absence of
//! a single required tool fails the whole check.

use std::collections::HashSet;

use super::entities::ToolDescriptor;
use super::provider::ProviderError;

/// Required names absent from `available`, in the order they were required.
///
/// Duplicates in `required` are reported once.
pub fn missing_requirements<'a>(
    available: impl IntoIterator<Item = &'a str>,
    required: &[String],
) -> Vec<String> {
    let available: HashSet<&str> = available.into_iter().collect();
    let mut seen = HashSet::new();

    required
        .iter()
        .filter(|name| !available.contains(name.as_str()))
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Fail with [`ProviderError::MissingRequirements`] if anything is absent.
pub fn check_requirements<'a>(
    available: impl IntoIterator<Item = &'a str>,
    required: &[String],
) -> Result<(), ProviderError> {
    let missing = missing_requirements(available, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProviderError::MissingRequirements(missing))
    }
}

/// Pick the descriptors for `required` out of a catalog.
///
/// Result follows the order of `required` with duplicates dropped. An empty
/// requirement list yields an empty selection.
pub fn select_required(
    tools: &[ToolDescriptor],
    required: &[String],
) -> Result<Vec<ToolDescriptor>, ProviderError> {
    check_requirements(tools.iter().map(|t| t.name.as_str()), required)?;

    let mut seen = HashSet::new();
    Ok(required
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .filter_map(|name| tools.iter().find(|t| &t.name == name).cloned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_nothing_missing() {
        let missing = missing_requirements(["a", "b"], &names(&["a"]));
        assert!(missing.is_empty());
    }

    #[test]
    fn test_reports_only_absent_names() {
        let missing = missing_requirements(["a"], &names(&["a", "b"]));
        assert_eq!(missing, vec!["b"]);
    }

    #[test]
    fn test_reports_all_absent_in_required_order() {
        let missing = missing_requirements(["b"], &names(&["z", "b", "a", "z"]));
        assert_eq!(missing, vec!["z", "a"]);
    }

    #[test]
    fn test_check_requirements_error() {
        let err = check_requirements(["a"], &names(&["a", "b", "c"])).unwrap_err();
        assert_eq!(
            err,
            ProviderError::MissingRequirements(vec!["b".into(), "c".into()])
        );
    }

    #[test]
    fn test_select_required_keeps_requested_order() {
        let tools = vec![
            ToolDescriptor::new("a", "first"),
            ToolDescriptor::new("b", "second"),
            ToolDescriptor::new("c", "third"),
        ];

        let selected = select_required(&tools, &names(&["c", "a", "c"])).unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].name, "c");
        assert_eq!(selected[1].description, "first");
    }

    #[test]
    fn test_select_required_empty() {
        let tools = vec![ToolDescriptor::new("a", "first")];
        assert!(select_required(&tools, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_select_required_missing() {
        let tools = vec![ToolDescriptor::new("a", "first")];
        let err = select_required(&tools, &names(&["a", "b"])).unwrap_err();
        assert_eq!(err.missing_tools(), Some(&["b".to_string()][..]));
    }
}
