use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Keeps asset writes and deletions inside the project tree.
#[derive(Debug, Clone)]
pub struct ProjectGuard {
    /// Canonical project root
    project_root: PathBuf,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside project: {path} (project: {project})")]
    OutsideProject { path: PathBuf, project: PathBuf },

    #[error("Refusing to operate on the project root itself: {0}")]
    ProjectRoot(PathBuf),

    #[error("Failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl ProjectGuard {
    /// The project root must exist; it is canonicalized to resolve symlinks.
    pub fn new(project_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        Ok(Self {
            project_root: project_root.as_ref().canonicalize()?,
        })
    }

    /// Check that `path` (which may not exist yet) lies strictly inside the project.
    ///
    /// Components are resolved one at a time: every prefix that exists is
    /// canonicalized, so symlinks and `..` that escape the tree are caught
    /// before anything is created.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        };

        let mut resolved = PathBuf::new();
        for component in absolute.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                }
                other => {
                    resolved.push(other);
                    if resolved.exists() {
                        resolved = resolved.canonicalize()?;
                    }
                }
            }
        }

        if resolved == self.project_root {
            return Err(SafetyError::ProjectRoot(resolved));
        }
        if !resolved.starts_with(&self.project_root) {
            return Err(SafetyError::OutsideProject {
                path: resolved,
                project: self.project_root.clone(),
            });
        }

        Ok(resolved)
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_validate_path_inside_project() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = ProjectGuard::new(temp_dir.path()).unwrap();

        let dir = temp_dir.path().join("android/app");
        fs::create_dir_all(&dir).unwrap();

        assert!(guard.validate_path(&dir).is_ok());
    }

    #[test]
    fn test_validate_missing_path_inside_project() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = ProjectGuard::new(temp_dir.path()).unwrap();

        let resolved = guard.validate_path("ios/app/Images.xcassets").unwrap();
        assert!(resolved.ends_with("ios/app/Images.xcassets"));
        assert!(!resolved.exists());
    }

    #[test]
    fn test_validate_path_outside_project() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path().join("project");
        fs::create_dir_all(&project).unwrap();
        let guard = ProjectGuard::new(&project).unwrap();

        let outside = temp_dir.path().join("elsewhere/res");
        let result = guard.validate_path(&outside);
        assert!(matches!(result, Err(SafetyError::OutsideProject { .. })));
    }

    #[test]
    fn test_validate_parent_components() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path().join("project");
        fs::create_dir_all(&project).unwrap();
        let guard = ProjectGuard::new(&project).unwrap();

        let result = guard.validate_path("missing/../../escape");
        assert!(matches!(result, Err(SafetyError::OutsideProject { .. })));
    }

    #[test]
    fn test_validate_parent_components_inside_project() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path().join("project");
        fs::create_dir_all(project.join("android")).unwrap();
        let guard = ProjectGuard::new(&project).unwrap();

        let resolved = guard
            .validate_path(temp_dir.path().join("conf/../project/android/app"))
            .unwrap();
        assert_eq!(resolved, guard.project_root().join("android/app"));
    }

    #[test]
    fn test_validate_project_root_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = ProjectGuard::new(temp_dir.path()).unwrap();

        let result = guard.validate_path(temp_dir.path());
        assert!(matches!(result, Err(SafetyError::ProjectRoot(_))));
    }

    #[test]
    #[cfg(unix)]
    fn test_validate_symlink_escape() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path().join("project");
        let outside = temp_dir.path().join("outside");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&outside).unwrap();
        symlink(&outside, project.join("link")).unwrap();

        let guard = ProjectGuard::new(&project).unwrap();
        let result = guard.validate_path("link/Images.xcassets");

        assert!(matches!(result, Err(SafetyError::OutsideProject { .. })));
    }
}
