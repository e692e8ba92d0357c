//! Stylesheet render target

use lumen_theme::{RenderTarget, StyleVariables};
use std::cell::RefCell;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Default)]
struct Sheet {
    variables: StyleVariables,
    dark: bool,
    rendered: String,
}

/// Renders applied themes as a `:root` stylesheet
///
/// Clones share the same sheet, so the CLI keeps a handle after moving one
/// into the store. When a path is set the file is rewritten atomically on
/// every invalidation.
#[derive(Clone, Debug, Default)]
pub struct CssTarget {
    path: Option<PathBuf>,
    sheet: Rc<RefCell<Sheet>>,
}

impl CssTarget {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            sheet: Rc::default(),
        }
    }

    /// Stylesheet as of the last invalidation
    pub fn css(&self) -> String {
        self.sheet.borrow().rendered.clone()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Render variables and the dark flag as CSS
pub fn render_css(variables: &StyleVariables, dark: bool) -> String {
    let scheme = if dark { "dark" } else { "light" };
    let mut css = String::new();
    let _ = writeln!(css, ":root[data-theme=\"{scheme}\"] {{");
    let _ = writeln!(css, "  color-scheme: {scheme};");
    for (name, value) in variables {
        let _ = writeln!(css, "  {name}: {value};");
    }
    css.push_str("}\n");
    css
}

fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = path.with_extension("css.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

impl RenderTarget for CssTarget {
    fn apply_variables(&mut self, variables: &StyleVariables) {
        let mut sheet = self.sheet.borrow_mut();
        sheet
            .variables
            .extend(variables.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    fn set_dark_flag(&mut self, dark: bool) {
        self.sheet.borrow_mut().dark = dark;
    }

    fn invalidate(&mut self) {
        let css = {
            let mut sheet = self.sheet.borrow_mut();
            sheet.rendered = render_css(&sheet.variables, sheet.dark);
            sheet.rendered.clone()
        };

        if let Some(path) = &self.path {
            match write_atomic(path, &css) {
                Ok(()) => tracing::debug!(path = %path.display(), "stylesheet written"),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "failed to write stylesheet")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> StyleVariables {
        [("--primary", "#1f6feb"), ("--background", "#ffffff")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_sorted_with_scheme() {
        let css = render_css(&vars(), true);
        assert_eq!(
            css,
            ":root[data-theme=\"dark\"] {\n  color-scheme: dark;\n  --background: #ffffff;\n  --primary: #1f6feb;\n}\n"
        );
    }

    #[test]
    fn test_invalidate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.css");
        let mut target = CssTarget::new(Some(path.clone()));
        let handle = target.clone();

        target.apply_variables(&vars());
        target.set_dark_flag(false);
        assert!(handle.css().is_empty());
        target.invalidate();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, handle.css());
        assert!(written.starts_with(":root[data-theme=\"light\"]"));
        assert!(!dir.path().join("theme.css.tmp").exists());
    }
}
