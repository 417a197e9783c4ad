//! Language profile registry.
//!
//! A static mapping from language name to file extension, container image,
//! run command, and descriptive metadata. Pure data; the only behavior is a
//! case-insensitive lookup and command templating for a script path.

/// How a materialized script is started inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCommand {
    /// Single interpreter binary invoked as `<interpreter> <script>`.
    Interpreter(&'static str),
    /// Shell one-liner with `{file}` substituted by the script path.
    /// Used for compile-then-run languages.
    Shell(&'static str),
}

#[derive(Debug, Clone)]
pub struct LanguageProfile {
    pub name: &'static str,
    pub file_extension: &'static str,
    pub image: &'static str,
    pub command: RunCommand,
    /// Languages whose toolchain dictates the source file name (Java).
    pub fixed_file_name: Option<&'static str>,
    pub strengths: &'static [&'static str],
    pub best_for: &'static [&'static str],
}

impl LanguageProfile {
    /// Argv to run `script_path` inside the container.
    pub fn run_argv(&self, script_path: &str) -> Vec<String> {
        match self.command {
            RunCommand::Interpreter(bin) => vec![bin.to_string(), script_path.to_string()],
            RunCommand::Shell(template) => vec![
                "sh".to_string(),
                "-c".to_string(),
                template.replace("{file}", script_path),
            ],
        }
    }

    /// File name for the materialized source; `stem` is used unless the
    /// toolchain requires a fixed name.
    pub fn script_file_name(&self, stem: &str) -> String {
        match self.fixed_file_name {
            Some(fixed) => fixed.to_string(),
            None => format!("{}.{}", stem, self.file_extension),
        }
    }
}

static PROFILES: &[LanguageProfile] = &[
    LanguageProfile {
        name: "Python",
        file_extension: "py",
        image: "python:3.9-slim",
        command: RunCommand::Interpreter("python"),
        fixed_file_name: None,
        strengths: &["General purpose", "Data science", "Rapid prototyping"],
        best_for: &["Dynamic programming", "Graph algorithms", "General DSA"],
    },
    LanguageProfile {
        name: "JavaScript",
        file_extension: "js",
        image: "node:18-slim",
        command: RunCommand::Interpreter("node"),
        fixed_file_name: None,
        strengths: &["Web development", "Asynchronous programming", "JSON handling"],
        best_for: &["Tree traversals", "String processing"],
    },
    LanguageProfile {
        name: "C++",
        file_extension: "cpp",
        image: "gcc:13",
        command: RunCommand::Shell("g++ -O2 -o /tmp/program {file} && /tmp/program"),
        fixed_file_name: None,
        strengths: &["High performance", "Memory control", "Competitive programming"],
        best_for: &["Performance-critical algorithms", "Mathematical computations"],
    },
    LanguageProfile {
        name: "Java",
        file_extension: "java",
        // Public-class naming forces the source file to be Main.java.
        image: "openjdk:17-slim",
        command: RunCommand::Shell("javac {file} && java -cp /app Main"),
        fixed_file_name: Some("Main.java"),
        strengths: &["Object-oriented", "Performance", "Enterprise"],
        best_for: &["Large-scale algorithms", "Data structures"],
    },
    LanguageProfile {
        name: "R",
        file_extension: "R",
        image: "r-base:4.3.1",
        command: RunCommand::Interpreter("Rscript"),
        fixed_file_name: None,
        strengths: &["Statistical computing", "Data analysis", "Mathematical modeling"],
        best_for: &["Statistical algorithms", "Mathematical optimization"],
    },
];

/// Case-insensitive profile lookup. Accepts a few common aliases.
pub fn profile(name: &str) -> Option<&'static LanguageProfile> {
    let canonical = match name.to_lowercase().as_str() {
        "python" | "python3" | "py" => "Python",
        "javascript" | "js" | "node" | "nodejs" => "JavaScript",
        "c++" | "cpp" => "C++",
        "java" => "Java",
        "r" => "R",
        _ => return None,
    };
    PROFILES.iter().find(|p| p.name == canonical)
}

pub fn supported_languages() -> Vec<&'static str> {
    PROFILES.iter().map(|p| p.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(profile("python").unwrap().name, "Python");
        assert_eq!(profile("PYTHON").unwrap().name, "Python");
        assert_eq!(profile("Cpp").unwrap().name, "C++");
        assert!(profile("cobol").is_none());
    }

    #[test]
    fn test_interpreter_argv() {
        let p = profile("Python").unwrap();
        assert_eq!(
            p.run_argv("/app/script.py"),
            vec!["python".to_string(), "/app/script.py".to_string()]
        );
    }

    #[test]
    fn test_shell_argv_substitutes_file() {
        let p = profile("C++").unwrap();
        let argv = p.run_argv("/app/script.cpp");
        assert_eq!(argv[0], "sh");
        assert_eq!(argv[1], "-c");
        assert!(argv[2].contains("/app/script.cpp"));
        assert!(!argv[2].contains("{file}"));
    }

    #[test]
    fn test_java_uses_fixed_file_name() {
        let p = profile("Java").unwrap();
        assert_eq!(p.script_file_name("script_abc"), "Main.java");
        let py = profile("Python").unwrap();
        assert_eq!(py.script_file_name("script_abc"), "script_abc.py");
    }
}
