/// One-shot command-line inspection.
///
/// Indexes a workspace the same way the server does, inspects the given
/// files (or every `.php` file under the given directories), and reports
/// each missing import with a 1-based `line:column`.  With `fix` enabled,
/// problems that have exactly one candidate are fixed in place.
use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::Backend;
use crate::config::AnnotationConfig;
use crate::error::IndexError;
use crate::fix::{apply_edits, build_import_edits};
use crate::index::ProjectIndex;
use crate::inspection::{Problem, inspect_file};
use crate::parser::parse_php_file;
use crate::workspace::{collect_php_files, file_uri, index_workspace, read_php_file};

/// A problem located in a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProblem {
    pub path: PathBuf,
    /// 1-based.
    pub line: u32,
    /// 1-based, in characters.
    pub column: u32,
    pub tag: String,
    pub message: String,
    pub choices: Vec<String>,
}

impl fmt::Display for FileProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} {}",
            self.path.display(),
            self.line,
            self.column,
            self.message,
            self.tag
        )?;
        if self.choices.is_empty() {
            write!(f, " (no candidates)")
        } else {
            write!(f, " (candidates: {})", self.choices.join(", "))
        }
    }
}

#[derive(Debug, Default)]
pub struct CheckReport {
    /// Problems left after fixing, in file order.
    pub problems: Vec<FileProblem>,
    /// Number of tags fixed.
    pub fixed: usize,
    /// Number of files inspected.
    pub files: usize,
}

/// Inspect `targets` inside `workspace`.
///
/// Unreadable targets are logged and skipped; failing to write a fixed
/// file is an error.
pub fn run_check(
    workspace: &Path,
    targets: &[PathBuf],
    fix: bool,
) -> Result<CheckReport, IndexError> {
    let config = match AnnotationConfig::load_from_workspace(workspace) {
        Ok(Some(config)) => config,
        Ok(None) => AnnotationConfig::default(),
        Err(err) => {
            tracing::warn!("PHPantom: {}", err);
            AnnotationConfig::default()
        }
    };

    let index = RwLock::new(ProjectIndex::new());
    let indexed = index_workspace(workspace, &index);
    tracing::info!(indexed, "workspace indexed");

    // Targets outside the index roots still contribute their own classes.
    let mut sources = Vec::new();
    for path in expand_targets(targets) {
        match read_php_file(&path) {
            Ok(content) => {
                index
                    .write()
                    .update_file(&file_uri(&path), &parse_php_file(&content));
                sources.push((path, content));
            }
            Err(err) => tracing::warn!("{}", err),
        }
    }

    let mut report = CheckReport::default();
    let index = index.read();
    for (path, original) in sources {
        report.files += 1;
        let mut content = original;
        if fix {
            let (fixed_content, fixed) = fix_single_candidates(&content, &*index, &config);
            if fixed > 0 {
                std::fs::write(&path, &fixed_content).map_err(|source| IndexError::Write {
                    path: path.clone(),
                    source,
                })?;
                tracing::info!(path = %path.display(), fixed, "imports added");
                report.fixed += fixed;
                content = fixed_content;
            }
        }

        let parsed = parse_php_file(&content);
        for problem in inspect_file(&parsed, &*index, &config) {
            report.problems.push(locate(&path, &content, problem));
        }
    }

    Ok(report)
}

/// Files named directly plus the `.php` files below named directories.
fn expand_targets(targets: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for target in targets {
        if target.is_dir() {
            files.extend(collect_php_files(target));
        } else {
            files.push(target.clone());
        }
    }
    files.dedup();
    files
}

/// Apply the import fix to every problem with a single candidate.
///
/// Edits shift offsets, so the file is re-parsed after each fix.  A fix is
/// kept only when re-inspecting shows one problem fewer.  Returns the new
/// text and the number of fixes kept.
pub fn fix_single_candidates(
    content: &str,
    index: &ProjectIndex,
    config: &AnnotationConfig,
) -> (String, usize) {
    let mut current = content.to_string();
    let mut fixed = 0;
    let mut skipped = 0;

    loop {
        let parsed = parse_php_file(&current);
        let problems = inspect_file(&parsed, index, config);
        let remaining = problems.len();

        // Problems whose fix was rejected stay at the front.
        let Some(problem) = problems
            .into_iter()
            .filter(|p| p.choices.len() == 1)
            .nth(skipped)
        else {
            break;
        };

        let edits = build_import_edits(&current, &parsed, &problem.tag, &problem.choices[0]);
        if edits.is_empty() {
            skipped += 1;
            continue;
        }

        let candidate = apply_edits(&current, &edits);
        let after = inspect_file(&parse_php_file(&candidate), index, config).len();
        if after >= remaining {
            tracing::debug!(tag = %problem.tag.raw_name, "fix left the problem in place");
            skipped += 1;
            continue;
        }
        current = candidate;
        fixed += 1;
    }

    (current, fixed)
}

fn locate(path: &Path, content: &str, problem: Problem) -> FileProblem {
    let position = Backend::offset_to_position(content, problem.tag.span.start);
    FileProblem {
        path: path.to_path_buf(),
        line: position.line + 1,
        column: position.character + 1,
        tag: problem.tag.raw_name,
        message: problem.message.to_string(),
        choices: problem.choices,
    }
}
