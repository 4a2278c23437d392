use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppResult;
use crate::services::HookInstaller;

pub const LARGE_FILE_HOOK_FILENAME: &str = "large-file-hook.sh";
const PRE_COMMIT_FILENAME: &str = "pre-commit";
const SHEBANG: &str = "#!/bin/bash\n";

/// Installs a local pre-commit hook that refuses staged files above a size limit.
pub struct GitHookInstaller {
    limit_mb: u64,
}

impl GitHookInstaller {
    pub fn new(limit_mb: u64) -> Self {
        Self { limit_mb }
    }

    fn hooks_dir(root: &Path) -> PathBuf {
        root.join(".git").join("hooks")
    }

    fn large_file_hook_content(&self) -> String {
        format!(
            r#"#!/bin/bash
# Rejects commits that stage files larger than {limit} MB.
limit=$(({limit} * 1024 * 1024))
status=0
while IFS= read -r -d '' file; do
    [ -f "$file" ] || continue
    size=$(wc -c < "$file")
    if [ "$size" -gt "$limit" ]; then
        echo "error: $file is larger than {limit} MB" >&2
        status=1
    fi
done < <(git diff --cached --name-only --diff-filter=ACM -z)
exit $status
"#,
            limit = self.limit_mb
        )
    }

    fn write_large_file_hook(&self, path: &Path) -> AppResult<()> {
        fs::write(path, self.large_file_hook_content())?;
        make_executable(path)
    }
}

impl HookInstaller for GitHookInstaller {
    fn ensure_hook_installed(&self, root: &Path) -> AppResult<()> {
        let dir = Self::hooks_dir(root);
        fs::create_dir_all(&dir)?;

        let pre_commit = dir.join(PRE_COMMIT_FILENAME);
        let mut content = match fs::read_to_string(&pre_commit) {
            Ok(existing) => existing,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => SHEBANG.to_string(),
            Err(err) => return Err(err.into()),
        };
        let large_file_hook = dir.join(LARGE_FILE_HOOK_FILENAME);
        if content.contains(LARGE_FILE_HOOK_FILENAME) {
            if !large_file_hook.exists() {
                debug!(path = %large_file_hook.display(), "large file hook missing, restoring");
                self.write_large_file_hook(&large_file_hook)?;
            }
            return Ok(());
        }

        self.write_large_file_hook(&large_file_hook)?;

        if !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str("\n# Large file commit guard added by sprout\n");
        content.push_str(&format!("bash \"{}\"\n", large_file_hook.display()));
        fs::write(&pre_commit, content)?;
        make_executable(&pre_commit)?;
        debug!(path = %pre_commit.display(), "pre-commit hook installed");
        Ok(())
    }

    /// Rewrites the large-file script when it is outdated or missing from an
    /// existing hooks directory. Repositories without a hooks directory are left alone.
    fn refresh_large_file_hook(&self, root: &Path) -> AppResult<()> {
        let dir = Self::hooks_dir(root);
        let path = dir.join(LARGE_FILE_HOOK_FILENAME);
        let expected = self.large_file_hook_content();
        match fs::read_to_string(&path) {
            Ok(current) if current == expected => Ok(()),
            Ok(_) => {
                debug!(path = %path.display(), "large file hook outdated, rewriting");
                self.write_large_file_hook(&path)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if !dir.is_dir() {
                    return Ok(());
                }
                debug!(path = %path.display(), "large file hook missing, restoring");
                self.write_large_file_hook(&path)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> AppResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> AppResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(root: &Path, name: &str) -> String {
        fs::read_to_string(GitHookInstaller::hooks_dir(root).join(name)).unwrap()
    }

    #[test]
    fn installs_pre_commit_and_large_file_hook() {
        let repo = tempfile::tempdir().unwrap();
        let installer = GitHookInstaller::new(50);

        installer.ensure_hook_installed(repo.path()).unwrap();

        let pre_commit = read(repo.path(), PRE_COMMIT_FILENAME);
        assert!(pre_commit.starts_with(SHEBANG));
        assert!(pre_commit.contains(LARGE_FILE_HOOK_FILENAME));
        assert!(read(repo.path(), LARGE_FILE_HOOK_FILENAME).contains("larger than 50 MB"));
    }

    #[test]
    fn installing_twice_changes_nothing() {
        let repo = tempfile::tempdir().unwrap();
        let installer = GitHookInstaller::new(100);

        installer.ensure_hook_installed(repo.path()).unwrap();
        let first = read(repo.path(), PRE_COMMIT_FILENAME);
        installer.ensure_hook_installed(repo.path()).unwrap();

        assert_eq!(read(repo.path(), PRE_COMMIT_FILENAME), first);
    }

    #[test]
    fn keeps_existing_pre_commit_lines() {
        let repo = tempfile::tempdir().unwrap();
        let dir = GitHookInstaller::hooks_dir(repo.path());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PRE_COMMIT_FILENAME), "#!/bin/sh\ncargo fmt --check").unwrap();

        GitHookInstaller::new(100)
            .ensure_hook_installed(repo.path())
            .unwrap();

        let pre_commit = read(repo.path(), PRE_COMMIT_FILENAME);
        assert!(pre_commit.starts_with("#!/bin/sh\ncargo fmt --check\n"));
        assert!(pre_commit.contains(LARGE_FILE_HOOK_FILENAME));
    }

    #[test]
    fn reinstall_restores_deleted_large_file_script() {
        let repo = tempfile::tempdir().unwrap();
        let installer = GitHookInstaller::new(100);
        installer.ensure_hook_installed(repo.path()).unwrap();
        let script = GitHookInstaller::hooks_dir(repo.path()).join(LARGE_FILE_HOOK_FILENAME);
        fs::remove_file(&script).unwrap();

        installer.ensure_hook_installed(repo.path()).unwrap();

        assert!(read(repo.path(), PRE_COMMIT_FILENAME).contains(LARGE_FILE_HOOK_FILENAME));
        assert!(read(repo.path(), LARGE_FILE_HOOK_FILENAME).contains("larger than 100 MB"));
    }

    #[test]
    fn refresh_restores_missing_script_in_existing_hooks_dir() {
        let repo = tempfile::tempdir().unwrap();
        let installer = GitHookInstaller::new(20);
        installer.ensure_hook_installed(repo.path()).unwrap();
        fs::remove_file(GitHookInstaller::hooks_dir(repo.path()).join(LARGE_FILE_HOOK_FILENAME))
            .unwrap();

        installer.refresh_large_file_hook(repo.path()).unwrap();

        assert!(read(repo.path(), LARGE_FILE_HOOK_FILENAME).contains("larger than 20 MB"));
    }

    #[test]
    fn refresh_rewrites_outdated_script() {
        let repo = tempfile::tempdir().unwrap();
        GitHookInstaller::new(100)
            .ensure_hook_installed(repo.path())
            .unwrap();

        GitHookInstaller::new(10)
            .refresh_large_file_hook(repo.path())
            .unwrap();
        assert!(read(repo.path(), LARGE_FILE_HOOK_FILENAME).contains("larger than 10 MB"));

        let empty = tempfile::tempdir().unwrap();
        GitHookInstaller::new(10)
            .refresh_large_file_hook(empty.path())
            .unwrap();
        assert!(!GitHookInstaller::hooks_dir(empty.path()).exists());
    }
}
