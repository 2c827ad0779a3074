//! README generation from a placeholder template.
//!
//! Placeholders use the `${NAME}` (or bare `$NAME`) form and `$$` produces a literal
//! dollar sign. Substitution is forgiving: placeholders without a value are left in
//! the output as written.

use crate::core::layout::PICTURES_DIR;
use crate::utils::error::Result;
use crate::utils::text::read_text_flexible;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const DEFAULT_README_TEMPLATE: &str = include_str!("../../templates/README.template.md");
pub const TEMPLATE_FILE: &str = "README.template.md";
pub const README_FILE: &str = "README.md";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:(\$)|\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("placeholder pattern is valid")
});

pub fn substitute(template: &str, vars: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                return "$".to_string();
            }
            let name = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
            match vars.get(name) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Header prefers the isometric render and falls back to the top view.
pub fn readme_variables(pictures_dir: &Path, project: &str) -> HashMap<&'static str, String> {
    let iso = format!("{project}_iso.png");
    let top = format!("{project}_top.png");
    let header = if pictures_dir.join(&iso).exists() {
        iso
    } else {
        top.clone()
    };

    HashMap::from([
        ("PROJECT_NAME", project.to_string()),
        ("HEADER_IMAGE", header.clone()),
        ("PCBLAYOUT_PDF", format!("{project}_board_prints.pdf")),
        ("SCHEMATIC_PDF", format!("{project}_schematic.pdf")),
        ("PICTURE_FRONT", top),
        ("PICTURE_BACK", format!("{project}_bottom.png")),
        ("PICTURE_SIDE", format!("{project}_side.png")),
        ("EXTRA_IMAGE", header),
    ])
}

/// Writes `README.md` under `root` unless one already exists.
///
/// A `README.template.md` next to it takes precedence over the built-in template.
pub fn render_readme_if_missing(root: &Path, project: &str) -> Result<PathBuf> {
    let out_path = root.join(README_FILE);
    if out_path.exists() {
        tracing::info!("README.md already exists, leaving it untouched");
        return Ok(out_path);
    }
    tracing::info!("Generating README.md");

    let template_path = root.join(TEMPLATE_FILE);
    let template = if template_path.exists() {
        read_text_flexible(&template_path)?
    } else {
        DEFAULT_README_TEMPLATE.to_string()
    };

    let vars = readme_variables(&root.join(PICTURES_DIR), project);
    std::fs::write(&out_path, substitute(&template, &vars))?;
    tracing::info!("Wrote {}", out_path.display());
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_substitute_braced_and_bare() {
        let vars = HashMap::from([("NAME", "board".to_string())]);
        assert_eq!(substitute("# ${NAME} / $NAME", &vars), "# board / board");
    }

    #[test]
    fn test_substitute_leaves_unknown_and_escapes() {
        let vars = HashMap::from([("NAME", "board".to_string())]);
        assert_eq!(
            substitute("${MISSING} costs $$5 and $ alone, ${NAME}", &vars),
            "${MISSING} costs $5 and $ alone, board"
        );
    }

    #[test]
    fn test_default_template_is_fully_substituted() {
        let temp_dir = TempDir::new().unwrap();
        let vars = readme_variables(temp_dir.path(), "board");
        let rendered = substitute(DEFAULT_README_TEMPLATE, &vars);
        assert!(!rendered.contains("${"));
        assert!(rendered.starts_with("# board\n"));
        assert!(rendered.contains("./PICTURES/board_top.png"));
        assert!(rendered.contains("./DOCUMENTATION/board_board_prints.pdf"));
    }

    #[test]
    fn test_header_prefers_iso_render() {
        let temp_dir = TempDir::new().unwrap();
        let vars = readme_variables(temp_dir.path(), "board");
        assert_eq!(vars["HEADER_IMAGE"], "board_top.png");

        fs::write(temp_dir.path().join("board_iso.png"), b"png").unwrap();
        let vars = readme_variables(temp_dir.path(), "board");
        assert_eq!(vars["HEADER_IMAGE"], "board_iso.png");
        assert_eq!(vars["EXTRA_IMAGE"], "board_iso.png");
    }

    #[test]
    fn test_existing_readme_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let readme = temp_dir.path().join(README_FILE);
        fs::write(&readme, "hand written").unwrap();

        render_readme_if_missing(temp_dir.path(), "board").unwrap();
        assert_eq!(fs::read_to_string(&readme).unwrap(), "hand written");
    }

    #[test]
    fn test_custom_template_in_utf16() {
        let temp_dir = TempDir::new().unwrap();
        let mut data = vec![0xFF, 0xFE];
        for unit in "Board: ${PROJECT_NAME}\n".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        fs::write(temp_dir.path().join(TEMPLATE_FILE), data).unwrap();

        let path = render_readme_if_missing(temp_dir.path(), "motion").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "Board: motion\n");
    }
}
