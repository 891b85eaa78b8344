//! Default exclude patterns
//!
//! Merged into every `IngestionOptions` built through `IngestionOptions::new`.
//! Entries ending in `/` are directory patterns, everything else is a name glob.

pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    // Version control
    ".git/",
    ".svn/",
    ".hg/",
    ".cvs/",
    ".DS_Store",
    // Dependencies and build output
    "node_modules/",
    "bower_components/",
    "vendor/",
    "target/",
    "build/",
    "dist/",
    "bin/",
    "obj/",
    "pkg/",
    // Python
    "__pycache__/",
    "*.pyc",
    "*.pyo",
    "*.pyd",
    ".pytest_cache/",
    ".tox/",
    ".mypy_cache/",
    ".ruff_cache/",
    "*.egg-info/",
    "venv/",
    ".venv/",
    "env/",
    "ENV/",
    "pip-wheel-metadata/",
    // JavaScript / Node
    "package-lock.json",
    "yarn.lock",
    ".npm/",
    ".yarn/",
    "*.log",
    "coverage/",
    ".env",
    ".next/",
    "*.lock",
    "*.lockb",
    // IDEs and editors
    ".idea/",
    ".vscode/",
    ".vs/",
    "*.sublime-project",
    "*.sublime-workspace",
    "*.suo",
    "*.user",
    "*.userosscache",
    "*.sln.docstates",
    // Other
    "Thumbs.db",
    "desktop.ini",
    "terraform.tfstate*",
    ".terraform/",
    "*.tfvars",
    "crash.dump",
    // Our own output
    "digest.txt",
    "pathdigest_digest.txt",
];
