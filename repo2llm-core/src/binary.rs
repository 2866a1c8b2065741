//! Extension-based binary classification.
//!
//! Decisions are made on the file name alone: a case-sensitive suffix match against
//! [`BINARY_SUFFIXES`], plus an exact match against [`BINARY_FILE_NAMES`]. No content is
//! inspected, so binary files with unregistered names reach the decoder and come out
//! through the Latin-1 fallback.

/// Suffixes whose files are never decoded.
pub const BINARY_SUFFIXES: &[&str] = &[
    // Compiled executables and libraries
    ".exe", ".dll", ".so", ".a", ".lib", ".dylib", ".o", ".obj",
    // Compressed archives
    ".zip", ".tar", ".tar.gz", ".tgz", ".rar", ".7z", ".bz2", ".gz", ".xz", ".z", ".lz",
    ".lzma", ".lzo", ".rz", ".sz", ".dz",
    // Office documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".ods", ".odp",
    // Media
    ".png", ".jpg", ".jpeg", ".gif", ".mp3", ".mp4", ".wav", ".flac", ".ogg", ".avi", ".mkv",
    ".mov", ".webm", ".wmv", ".m4a", ".aac",
    // VM and container images
    ".iso", ".vmdk", ".qcow2", ".vdi", ".vhd", ".vhdx", ".ova", ".ovf",
    // Databases
    ".db", ".sqlite", ".mdb", ".accdb", ".frm", ".ibd", ".dbf",
    // JVM
    ".jar", ".class", ".war", ".ear", ".jpi",
    // Python bytecode and packages
    ".pyc", ".pyo", ".pyd", ".egg", ".whl",
    // Packages and misc blobs
    ".deb", ".rpm", ".apk", ".msi", ".dmg", ".pkg", ".bin", ".dat", ".data", ".dump", ".img",
    ".toast", ".vcd", ".crx", ".xpi", ".lockb", ".svg",
    // Fonts
    ".eot", ".otf", ".ttf", ".woff", ".woff2",
    // Icons and cursors
    ".ico", ".icns", ".cur",
    ".cab", ".dmp", ".msp", ".msm",
    // Keys and certificates
    ".keystore", ".jks", ".truststore", ".cer", ".crt", ".der", ".p7b", ".p7c", ".p12", ".pfx",
    ".pem", ".csr", ".key", ".pub", ".sig", ".pgp", ".gpg",
    ".nupkg", ".snupkg", ".appx", ".msix", ".msu",
    ".snap", ".flatpak", ".appimage",
    ".ko", ".sys", ".elf",
    ".swf", ".fla", ".swc",
    // Debug symbols and build leftovers
    ".rlib", ".pdb", ".idb", ".dbg",
    ".sdf", ".bak", ".tmp", ".temp", ".log", ".tlog", ".ilk",
    ".bpl", ".dcu", ".dcp", ".dcpil", ".drc",
    ".aps", ".res", ".rsrc", ".rc", ".resx",
    // Settings files
    ".prefs", ".properties", ".ini", ".cfg", ".config", ".conf",
    // Housekeeping
    ".DS_Store", ".localized", ".svn", ".git", ".gitignore", ".gitkeep",
];

/// Whole file names treated as binary regardless of suffix.
pub const BINARY_FILE_NAMES: &[&str] = &["package-lock.json"];

/// Classifier over the built-in tables plus caller-supplied suffixes.
#[derive(Debug, Clone, Default)]
pub struct BinaryClassifier {
    extra_suffixes: Vec<String>,
}

impl BinaryClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register additional suffixes (exact, case-sensitive).
    pub fn with_extra_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_suffixes
            .extend(suffixes.into_iter().map(Into::into));
        self
    }

    pub fn is_binary(&self, filename: &str) -> bool {
        is_binary(filename)
            || self
                .extra_suffixes
                .iter()
                .any(|suffix| filename.ends_with(suffix.as_str()))
    }
}

/// Classify a file name against the built-in tables.
pub fn is_binary(filename: &str) -> bool {
    BINARY_FILE_NAMES.contains(&filename)
        || BINARY_SUFFIXES
            .iter()
            .any(|suffix| filename.ends_with(suffix))
}
