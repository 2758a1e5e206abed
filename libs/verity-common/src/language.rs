use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages a challenge may target
///
/// The set is closed: adding a language means adding a variant here and
/// deciding its [`ExecutionMode`]. Callers never branch on the language name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    Cpp,
    C,
    Go,
    Rust,
}

/// Where a language's submissions are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Child process on this host, under a hard kill timeout
    Local,
    /// Delegated to the external execution service
    Remote,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Java,
        Language::Cpp,
        Language::C,
        Language::Go,
        Language::Rust,
    ];

    pub fn execution_mode(&self) -> ExecutionMode {
        match self {
            Language::JavaScript => ExecutionMode::Local,
            _ => ExecutionMode::Remote,
        }
    }
}

/// Case-insensitive, accepting common aliases ("js", "py", "c++", "golang")
impl FromStr for Language {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "javascript" | "js" | "node" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "python" | "py" | "python3" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "cpp" | "c++" => Ok(Language::Cpp),
            "c" => Ok(Language::C),
            "go" | "golang" => Ok(Language::Go),
            "rust" => Ok(Language::Rust),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Go => "go",
            Language::Rust => "rust",
        };
        write!(f, "{}", s)
    }
}
