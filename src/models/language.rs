//! File extension -> language tag table.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    TypeScript,
    JavaScript,
    Html,
    Css,
    Scss,
    Json,
    Markdown,
    Python,
    Java,
    Cpp,
    C,
    Go,
    Rust,
    Php,
    Ruby,
    Sql,
    Xml,
    Yaml,
    PlainText,
}

impl LanguageId {
    /// Matches case-insensitively; `None` for extensions outside the table.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ts" | "tsx" => Some(Self::TypeScript),
            "js" | "jsx" => Some(Self::JavaScript),
            "html" => Some(Self::Html),
            "css" => Some(Self::Css),
            "scss" => Some(Self::Scss),
            "json" => Some(Self::Json),
            "md" => Some(Self::Markdown),
            "py" => Some(Self::Python),
            "java" => Some(Self::Java),
            "cpp" => Some(Self::Cpp),
            "c" => Some(Self::C),
            "go" => Some(Self::Go),
            "rs" => Some(Self::Rust),
            "php" => Some(Self::Php),
            "rb" => Some(Self::Ruby),
            "sql" => Some(Self::Sql),
            "xml" => Some(Self::Xml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Names without a `.` have no extension and map to plain text.
    pub fn from_file_name(name: &str) -> Self {
        name.rsplit_once('.')
            .and_then(|(_, ext)| Self::from_extension(ext))
            .unwrap_or(Self::PlainText)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Html => "html",
            Self::Css => "css",
            Self::Scss => "scss",
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Python => "python",
            Self::Java => "java",
            Self::Cpp => "cpp",
            Self::C => "c",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Php => "php",
            Self::Ruby => "ruby",
            Self::Sql => "sql",
            Self::Xml => "xml",
            Self::Yaml => "yaml",
            Self::PlainText => "plaintext",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/language.rs"]
mod tests;
