// src/categorize.rs

use crate::model::FileCategory;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Heuristics table used to classify paths
///
/// Rules are checked in order: test, build, documentation, application.
/// Anything left over is `Other`. Entries are compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRules {
    /// Directory names that mark everything below them as test code
    pub test_directories: Vec<String>,
    /// Substrings of a file name that mark it as a test (`.spec.`, `_test.`)
    pub test_name_markers: Vec<String>,
    pub test_name_prefixes: Vec<String>,
    pub build_file_names: Vec<String>,
    pub build_extensions: Vec<String>,
    pub documentation_file_names: Vec<String>,
    pub documentation_extensions: Vec<String>,
    pub application_extensions: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            test_directories: strings(&[
                "test", "tests", "__tests__", "spec", "specs", "testing", "__mocks__", "e2e",
            ]),
            test_name_markers: strings(&[
                ".test.", ".spec.", "_test.", "_spec.", "-test.", "-spec.", ".tests.",
            ]),
            test_name_prefixes: strings(&["test_"]),
            build_file_names: strings(&[
                "makefile", "cmakelists.txt", "cargo.toml", "cargo.lock", "build.rs",
                "package.json", "package-lock.json", "yarn.lock", "pnpm-lock.yaml",
                "pom.xml", "build.gradle", "settings.gradle", "gradle.properties",
                "build.sbt", "build.xml", "dockerfile", "docker-compose.yml",
                "docker-compose.yaml", "go.mod", "go.sum", "gemfile", "gemfile.lock",
                "rakefile", "requirements.txt", "setup.py", "setup.cfg", "pyproject.toml",
                "tsconfig.json", "webpack.config.js", "rollup.config.js", "vite.config.js",
                "vite.config.ts", "babel.config.js", "jenkinsfile", "meson.build",
                "justfile", ".gitignore", ".travis.yml", ".gitlab-ci.yml",
            ]),
            build_extensions: strings(&[
                "gradle", "cmake", "mk", "make", "bazel", "bzl", "nix", "csproj", "sln",
                "vcxproj", "lock",
            ]),
            documentation_file_names: strings(&[
                "readme", "license", "licence", "changelog", "contributing", "authors",
                "notice", "copying", "history",
            ]),
            documentation_extensions: strings(&[
                "md", "markdown", "rst", "txt", "adoc", "asciidoc", "org", "tex", "pdf",
                "rtf", "doc", "docx",
            ]),
            application_extensions: strings(&[
                "rs", "c", "h", "cc", "cpp", "cxx", "hpp", "hh", "cs", "java", "kt", "kts",
                "scala", "groovy", "go", "py", "rb", "php", "js", "mjs", "cjs", "jsx", "ts",
                "tsx", "vue", "svelte", "swift", "m", "mm", "dart", "lua", "pl", "r", "ex",
                "exs", "erl", "hs", "clj", "elm", "fs", "zig", "jl", "sql", "sh", "bash",
                "zsh", "ps1", "html", "htm", "css", "scss", "sass", "less",
            ]),
        }
    }
}

fn contains(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(value))
}

impl CategoryRules {
    pub fn categorize(&self, path: &str) -> FileCategory {
        let lower = path.to_lowercase();
        let mut segments: Vec<&str> = lower.split('/').filter(|s| !s.is_empty()).collect();
        let Some(file_name) = segments.pop() else {
            return FileCategory::Other;
        };
        let extension = extension_of(file_name);

        let in_test_dir = segments.iter().any(|dir| contains(&self.test_directories, dir));
        let test_name = self
            .test_name_markers
            .iter()
            .any(|marker| file_name.contains(marker.to_lowercase().as_str()))
            || self
                .test_name_prefixes
                .iter()
                .any(|prefix| file_name.starts_with(prefix.to_lowercase().as_str()));
        if in_test_dir || test_name {
            return FileCategory::Test;
        }

        if contains(&self.build_file_names, file_name)
            || extension.is_some_and(|ext| contains(&self.build_extensions, ext))
        {
            return FileCategory::Build;
        }

        let doc_by_name = extension.is_none() && contains(&self.documentation_file_names, file_name);
        if doc_by_name || extension.is_some_and(|ext| contains(&self.documentation_extensions, ext)) {
            return FileCategory::Documentation;
        }

        if extension.is_some_and(|ext| contains(&self.application_extensions, ext)) {
            return FileCategory::Application;
        }

        FileCategory::Other
    }
}

fn extension_of(file_name: &str) -> Option<&str> {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

fn default_rules() -> &'static CategoryRules {
    static RULES: OnceLock<CategoryRules> = OnceLock::new();
    RULES.get_or_init(CategoryRules::default)
}

/// Classifies `path` with the built-in rules table
pub fn categorize(path: &str) -> FileCategory {
    default_rules().categorize(path)
}

/// Language name derived from a path's extension or well-known file name
pub fn language_for(path: &str) -> &'static str {
    let file_name = path.rsplit('/').next().unwrap_or(path).to_lowercase();
    match file_name.as_str() {
        "makefile" | "gnumakefile" => return "Makefile",
        "dockerfile" => return "Dockerfile",
        "cmakelists.txt" => return "CMake",
        _ => {}
    }

    match extension_of(&file_name).unwrap_or("") {
        "rs" => "Rust",
        "c" | "h" => "C",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => "C++",
        "cs" => "C#",
        "java" => "Java",
        "kt" | "kts" => "Kotlin",
        "scala" => "Scala",
        "groovy" | "gradle" => "Groovy",
        "go" => "Go",
        "py" => "Python",
        "rb" => "Ruby",
        "php" => "PHP",
        "js" | "mjs" | "cjs" | "jsx" => "JavaScript",
        "ts" | "tsx" => "TypeScript",
        "vue" => "Vue",
        "svelte" => "Svelte",
        "swift" => "Swift",
        "m" | "mm" => "Objective-C",
        "dart" => "Dart",
        "lua" => "Lua",
        "pl" => "Perl",
        "r" => "R",
        "ex" | "exs" => "Elixir",
        "erl" => "Erlang",
        "hs" => "Haskell",
        "clj" => "Clojure",
        "elm" => "Elm",
        "fs" => "F#",
        "zig" => "Zig",
        "jl" => "Julia",
        "sql" => "SQL",
        "sh" | "bash" | "zsh" => "Shell",
        "ps1" => "PowerShell",
        "html" | "htm" => "HTML",
        "css" => "CSS",
        "scss" | "sass" => "Sass",
        "less" => "Less",
        "md" | "markdown" => "Markdown",
        "rst" => "reStructuredText",
        "json" => "JSON",
        "yml" | "yaml" => "YAML",
        "toml" => "TOML",
        "xml" => "XML",
        "cmake" => "CMake",
        "nix" => "Nix",
        _ => "Other",
    }
}
