use std::path::Path;

use crate::error::AppResult;

pub trait HookInstaller: Send + Sync {
    fn ensure_hook_installed(&self, root: &Path) -> AppResult<()>;
    fn refresh_large_file_hook(&self, root: &Path) -> AppResult<()>;
}
