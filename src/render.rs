/*!
 * Document rendering.
 *
 * Turns assembled rows into a typeset document. The only backend writes a
 * LaTeX `longtable` meant for `lualatex` with `polyglossia`, one image column
 * followed by one column per language.
 */

use regex::{Captures, Regex};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::app_config::{LanguageSet, RenderConfig};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::images::destination_path;
use crate::rows::{ImageAsset, Row};

/// A backend that turns rows into document text
pub trait DocumentRenderer {
    fn render(&self, rows: &[Row], languages: &LanguageSet, config: &RenderConfig) -> Result<String, AppError>;
}

/// LaTeX `longtable` renderer
#[derive(Debug)]
pub struct LatexRenderer {
    /// Where images live (used for unresolved rows)
    destination_dir: PathBuf,
    /// Directory of the output document; image references are relative to it
    document_dir: PathBuf,
    special_chars: Regex,
}

impl LatexRenderer {
    pub fn new(destination_dir: impl Into<PathBuf>, document_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let special_chars = Regex::new(r"[\\&%$#_{}~^]")
            .map_err(|e| AppError::Render(format!("Invalid escape pattern: {}", e)))?;

        Ok(Self {
            destination_dir: destination_dir.into(),
            document_dir: document_dir.into(),
            special_chars,
        })
    }

    /// Renderer for a document written to `output_file`
    pub fn for_output(destination_dir: impl Into<PathBuf>, output_file: &Path) -> Result<Self, AppError> {
        let document_dir = match output_file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::new(destination_dir, document_dir)
    }

    /// Escape LaTeX special characters in free text
    pub fn escape(&self, text: &str) -> String {
        self.special_chars
            .replace_all(text, |caps: &Captures| match &caps[0] {
                "\\" => r"\textbackslash{}".to_string(),
                "~" => r"\textasciitilde{}".to_string(),
                "^" => r"\textasciicircum{}".to_string(),
                other => format!("\\{}", other),
            })
            .into_owned()
    }

    /// Path the document uses to include the row's image
    ///
    /// Unresolved rows still point at the expected `<item>.jpg` so the file can
    /// be dropped in later without re-rendering.
    pub fn image_reference(&self, row: &Row) -> String {
        let path = match &row.image {
            ImageAsset::Resolved(path) => path.clone(),
            ImageAsset::Unresolved => destination_path(&row.item, &self.destination_dir),
        };

        FileManager::relative_to(&path, &self.document_dir)
            .to_string_lossy()
            .replace('\\', "/")
    }

    fn preamble(&self, config: &RenderConfig) -> String {
        let mut out = String::new();
        out.push_str("\\documentclass{article}\n");
        out.push_str("\\usepackage{graphicx}\n");
        out.push_str("\\usepackage{longtable}\n");
        out.push_str("\\usepackage{polyglossia}\n");
        let _ = writeln!(out, "\\setdefaultlanguage{{{}}}", config.main_language);
        for language in &config.other_languages {
            let _ = writeln!(out, "\\setotherlanguage{{{}}}", language);
        }
        let _ = writeln!(out, "\\setmainfont{{{}}}", config.main_font);
        if let Some(font) = &config.arabic_font {
            let _ = writeln!(out, "\\newfontfamily\\arabicfont[Script=Arabic]{{{}}}", font);
        }
        out
    }

    fn header_row(&self, languages: &LanguageSet, config: &RenderConfig) -> String {
        let mut cells = vec![format!("\\textbf{{{}}}", self.escape(&config.image_label))];
        cells.extend(
            languages
                .iter()
                .map(|entry| format!("\\textbf{{{}}}", self.escape(&entry.display_label()))),
        );
        format!("{} \\\\ \\hline\n", cells.join(" & "))
    }

    /// One table line for a row
    pub fn render_row(&self, row: &Row, languages: &LanguageSet, config: &RenderConfig) -> String {
        let mut cells = vec![format!(
            "\\includegraphics[width={},height={}]{{{}}}",
            config.image_width,
            config.image_height,
            self.image_reference(row)
        )];
        cells.extend(languages.iter().map(|entry| {
            let text = row.translations.get(&entry.code).unwrap_or(row.item.as_str());
            self.escape(text)
        }));
        format!("{} \\\\ \\hline\n", cells.join(" & "))
    }
}

impl DocumentRenderer for LatexRenderer {
    fn render(&self, rows: &[Row], languages: &LanguageSet, config: &RenderConfig) -> Result<String, AppError> {
        if languages.is_empty() {
            return Err(AppError::Render("No languages to render".to_string()));
        }

        let column_spec = format!("|{}", "c|".repeat(languages.len() + 1));

        let mut out = self.preamble(config);
        out.push_str("\n\\begin{document}\n");
        let _ = writeln!(out, "\\section*{{{}}}", self.escape(&config.title));
        out.push('\n');
        let _ = writeln!(out, "\\begin{{longtable}}{{{}}}", column_spec);
        out.push_str("\\hline\n");
        out.push_str(&self.header_row(languages, config));

        for row in rows {
            out.push_str(&self.render_row(row, languages, config));
        }

        out.push_str("\\end{longtable}\n");
        out.push_str("\n\\end{document}\n");
        Ok(out)
    }
}
