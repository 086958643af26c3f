//! Finding the Python files to lint.
//!
//! Include and exclude filters are regexes searched in a path relative to
//! the project root, written with `/` separators and a leading `/`.
//! Directories get a trailing `/`, so `/build/` only prunes directories.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use archives_core::{AnalyzerConfig, ArchivesError, Result};
use ignore::WalkBuilder;
use regex::Regex;
use tracing::{debug, warn};

/// Walks source paths and selects Python files.
#[derive(Debug, Clone)]
pub struct Discovery {
    include: Regex,
    exclude: Regex,
    extend_exclude: Vec<glob::Pattern>,
    respect_gitignore: bool,
}

impl Discovery {
    /// Compiles the filters in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchivesError::InvalidPattern`] for a bad include or
    /// exclude regex and [`ArchivesError::InvalidGlob`] for a bad
    /// `extend_exclude` glob.
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        let extend_exclude = config
            .extend_exclude
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|e| ArchivesError::InvalidGlob {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            include: compile(&config.include)?,
            exclude: compile(&config.exclude)?,
            extend_exclude,
            respect_gitignore: config.respect_gitignore,
        })
    }

    /// Expands `sources` into a sorted, de-duplicated list of files.
    ///
    /// Directories are walked and filtered. Files named explicitly are kept
    /// whatever their extension. Paths that do not exist are logged and
    /// skipped.
    #[must_use]
    pub fn discover<P: AsRef<Path>>(&self, sources: &[P]) -> Vec<PathBuf> {
        let root = find_project_root(sources);
        debug!("Project root: {}", root.display());

        let mut files = BTreeSet::new();
        for source in sources {
            let source = source.as_ref();
            if source.is_dir() {
                files.extend(self.walk(source, &root));
            } else if source.is_file() {
                files.insert(source.to_path_buf());
            } else {
                warn!("Invalid path: {}", source.display());
            }
        }
        files.into_iter().collect()
    }

    fn walk(&self, dir: &Path, root: &Path) -> Vec<PathBuf> {
        let filter = PathFilter {
            root: root.to_path_buf(),
            exclude: self.exclude.clone(),
            extend_exclude: self.extend_exclude.clone(),
        };

        let mut builder = WalkBuilder::new(dir);
        builder
            .hidden(false)
            .require_git(false)
            .parents(self.respect_gitignore)
            .ignore(self.respect_gitignore)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                entry.depth() == 0 || !filter.is_excluded(entry.path(), is_dir)
            });

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let normalized = normalize(root, entry.path(), false);
            if self.include.is_match(&normalized) {
                files.push(entry.into_path());
            } else {
                debug!("Not included: {}", normalized);
            }
        }
        files
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ArchivesError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Exclude filters, owned so the walker can run them per entry.
#[derive(Debug, Clone)]
struct PathFilter {
    root: PathBuf,
    exclude: Regex,
    extend_exclude: Vec<glob::Pattern>,
}

impl PathFilter {
    fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        let normalized = normalize(&self.root, path, is_dir);
        if self.exclude.find(&normalized).is_some_and(|m| !m.as_str().is_empty()) {
            debug!("Excluding: {}", normalized);
            return true;
        }
        let relative = normalized.trim_start_matches('/').trim_end_matches('/');
        if self.extend_exclude.iter().any(|glob| glob.matches(relative)) {
            debug!("Excluding by glob: {}", normalized);
            return true;
        }
        false
    }
}

/// `/`-prefixed, `/`-separated form of `path` relative to `root`.
fn normalize(root: &Path, path: &Path, is_dir: bool) -> String {
    let absolute = absolute(path);
    let relative = absolute.strip_prefix(root).unwrap_or(&absolute);
    let mut normalized = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            normalized.push('/');
            normalized.push_str(&part.to_string_lossy());
        }
    }
    if normalized.is_empty() || is_dir {
        normalized.push('/');
    }
    normalized
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Finds the project root for `sources`.
///
/// Starting from the lowest of the sources (or its parent, for a file),
/// returns the nearest ancestor containing `.git`, else the filesystem
/// root.
#[must_use]
pub fn find_project_root<P: AsRef<Path>>(sources: &[P]) -> PathBuf {
    let Some(base) = sources.iter().map(|s| absolute(s.as_ref())).min() else {
        return absolute(Path::new("/"));
    };
    let start = if base.is_dir() {
        base.as_path()
    } else {
        base.parent().unwrap_or(&base)
    };

    let mut last = start;
    for dir in start.ancestors() {
        if dir.join(".git").exists() {
            return dir.to_path_buf();
        }
        last = dir;
    }
    last.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join(".git")).unwrap();
        for file in [
            "app.py",
            "types.pyi",
            "README.md",
            "pkg/__init__.py",
            "pkg/core.py",
            "pkg/migrations/0001.py",
            "build/gen.py",
            ".venv/lib/site.py",
            ".hidden/tool.py",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x = 1\n").unwrap();
        }
        dir
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn default_filters() {
        let dir = project();
        let discovery = Discovery::new(&AnalyzerConfig::default()).unwrap();
        let files = discovery.discover(&[dir.path()]);
        assert_eq!(
            relative(dir.path(), &files),
            [
                ".hidden/tool.py",
                "app.py",
                "pkg/__init__.py",
                "pkg/core.py",
                "pkg/migrations/0001.py",
                "types.pyi",
            ]
        );
    }

    #[test]
    fn extend_exclude_globs() {
        let dir = project();
        let config = AnalyzerConfig {
            extend_exclude: vec!["**/migrations/**".to_string(), ".hidden".to_string()],
            ..AnalyzerConfig::default()
        };
        let files = Discovery::new(&config).unwrap().discover(&[dir.path()]);
        let names = relative(dir.path(), &files);
        assert!(!names.iter().any(|n| n.contains("migrations")));
        assert!(!names.iter().any(|n| n.starts_with(".hidden")));
        assert!(names.contains(&"pkg/core.py".to_string()));
    }

    #[test]
    fn custom_include_and_exclude() {
        let dir = project();
        let config = AnalyzerConfig {
            include: r"\.pyi$".to_string(),
            exclude: r"/pkg/".to_string(),
            ..AnalyzerConfig::default()
        };
        let files = Discovery::new(&config).unwrap().discover(&[dir.path()]);
        assert_eq!(relative(dir.path(), &files), ["types.pyi"]);
    }

    #[test]
    fn explicit_files_bypass_filters() {
        let dir = project();
        let readme = dir.path().join("README.md");
        let built = dir.path().join("build/gen.py");
        let discovery = Discovery::new(&AnalyzerConfig::default()).unwrap();
        let files = discovery.discover(&[&readme, &built, &readme]);
        assert_eq!(files, [readme, built]);
    }

    #[test]
    fn respects_gitignore() {
        let dir = project();
        fs::write(dir.path().join(".gitignore"), "pkg/core.py\n").unwrap();

        let files = Discovery::new(&AnalyzerConfig::default())
            .unwrap()
            .discover(&[dir.path()]);
        assert!(!relative(dir.path(), &files).contains(&"pkg/core.py".to_string()));

        let config = AnalyzerConfig {
            respect_gitignore: false,
            ..AnalyzerConfig::default()
        };
        let files = Discovery::new(&config).unwrap().discover(&[dir.path()]);
        assert!(relative(dir.path(), &files).contains(&"pkg/core.py".to_string()));
    }

    #[test]
    fn missing_paths_are_skipped() {
        let dir = project();
        let files = Discovery::new(&AnalyzerConfig::default())
            .unwrap()
            .discover(&[dir.path().join("nope")]);
        assert!(files.is_empty());
    }

    #[test]
    fn invalid_patterns() {
        let config = AnalyzerConfig {
            include: "(".to_string(),
            ..AnalyzerConfig::default()
        };
        assert!(matches!(
            Discovery::new(&config),
            Err(ArchivesError::InvalidPattern { .. })
        ));

        let config = AnalyzerConfig {
            extend_exclude: vec!["[".to_string()],
            ..AnalyzerConfig::default()
        };
        assert!(matches!(
            Discovery::new(&config),
            Err(ArchivesError::InvalidGlob { .. })
        ));
    }

    #[test]
    fn project_root_is_nearest_git_ancestor() {
        let dir = project();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(find_project_root(&[dir.path().join("pkg/core.py")]), root);
        assert_eq!(find_project_root(&[dir.path().join("pkg")]), root);
        assert_eq!(find_project_root(&[dir.path()]), root);
    }

    #[test]
    fn normalized_paths() {
        let root = Path::new("/proj");
        assert_eq!(normalize(root, Path::new("/proj/a/b.py"), false), "/a/b.py");
        assert_eq!(normalize(root, Path::new("/proj/build"), true), "/build/");
        assert_eq!(normalize(root, Path::new("/proj"), true), "/");
    }
}
