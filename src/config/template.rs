//! Taxonomy template loading
//!
//! The template is plain text, one directive per line:
//!
//! ```text
//! News,#genre#
//! CNN|CNN HD|CNN International
//! BBC News
//!
//! # comments and blank lines are ignored
//! Sports,#genre#
//! ESPN|ESPN HD
//! ```
//!
//! Anything after the first comma of an alias line is ignored.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};
use crate::models::{AliasGroup, Taxonomy, CATEGORY_MARKER};

/// Parse template text into a taxonomy
pub fn parse_taxonomy(content: &str) -> Taxonomy {
    let mut taxonomy = Taxonomy::new();
    let mut current: Option<usize> = None;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim().trim_start_matches('\u{feff}');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.ends_with(CATEGORY_MARKER) {
            let name = line.split(',').next().unwrap_or_default().trim();
            if name.is_empty() {
                warn!("Template line {}: category marker without a name", line_num + 1);
                current = None;
                continue;
            }
            if taxonomy.category(name).is_some() {
                warn!(
                    "Template line {}: category '{}' declared again, earlier entries discarded",
                    line_num + 1,
                    name
                );
            }
            current = Some(taxonomy.begin_category(name));
            continue;
        }

        let Some(category) = current else {
            debug!("Template line {}: entry outside any category: {}", line_num + 1, line);
            continue;
        };

        let aliases = line.split(',').next().unwrap_or_default();
        match AliasGroup::parse(aliases) {
            Some(group) => taxonomy.push_group(category, group),
            None => debug!("Template line {}: no usable alias in '{}'", line_num + 1, line),
        }
    }

    taxonomy
}

/// Read and parse the taxonomy file
pub async fn load_taxonomy<P: AsRef<Path>>(path: P) -> AppResult<Taxonomy> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::template(path, e.to_string()))?;

    let taxonomy = parse_taxonomy(&content);
    if taxonomy.is_empty() {
        return Err(AppError::template(path, "no categories declared"));
    }

    info!(
        "Loaded template {}: {} categories, {} alias groups",
        path.display(),
        taxonomy.categories().len(),
        taxonomy.group_count()
    );
    Ok(taxonomy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "\
# national channels
央视频道,#genre#
CCTV1|CCTV-1|CCTV1综合
CCTV2|CCTV-2,ignored trailing text

News,#genre#
CNN|CNN HD
  BBC News  
";

    #[test]
    fn test_parse_taxonomy_order() {
        let taxonomy = parse_taxonomy(TEMPLATE);
        let categories = taxonomy.categories();

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "央视频道");
        assert_eq!(categories[1].name, "News");

        let primaries: Vec<_> = categories[0].groups.iter().map(|g| g.primary_name()).collect();
        assert_eq!(primaries, vec!["CCTV1", "CCTV2"]);
        assert_eq!(categories[0].groups[1].variants(), &["CCTV2", "CCTV-2"]);
        assert_eq!(categories[1].groups[1].primary_name(), "BBC News");
    }

    #[test]
    fn test_entries_before_category_are_ignored() {
        let taxonomy = parse_taxonomy("Orphan\nMovies,#genre#\nHBO\n");
        assert_eq!(taxonomy.group_count(), 1);
        assert_eq!(taxonomy.categories()[0].groups[0].primary_name(), "HBO");
    }

    #[test]
    fn test_repeated_category_resets() {
        let taxonomy = parse_taxonomy("A,#genre#\nX\nB,#genre#\nY\nA,#genre#\nZ\n");
        let categories = taxonomy.categories();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "A");
        assert_eq!(categories[0].groups.len(), 1);
        assert_eq!(categories[0].groups[0].primary_name(), "Z");
    }

    #[tokio::test]
    async fn test_load_missing_template() {
        let err = load_taxonomy("/definitely/not/here.txt").await.unwrap_err();
        assert!(matches!(err, AppError::Template { .. }));
    }

    #[tokio::test]
    async fn test_load_template_without_categories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.txt");
        std::fs::write(&path, "# nothing here\n").unwrap();

        let err = load_taxonomy(&path).await.unwrap_err();
        assert!(err.to_string().contains("no categories"));
    }
}
