/// Submission Sanitizer - Denylist Veto
///
/// Coarse regex filter over the raw submission text, applied before anything
/// is executed. A pass means "no obvious misuse", nothing more: the real
/// boundary is the child process the local executor runs code in.
///
/// Rules about JavaScript host objects and module loading only apply to
/// JavaScript and TypeScript; `self.` or `document` are ordinary identifiers
/// elsewhere.
///
/// A veto is fatal to the whole grading run.
use crate::error::UnsafeSubmission;
use lazy_static::lazy_static;
use regex::Regex;
use verity_common::language::Language;

struct Rule {
    name: &'static str,
    pattern: Regex,
    javascript_only: bool,
}

impl Rule {
    fn applies_to(&self, language: Language) -> bool {
        !self.javascript_only || matches!(language, Language::JavaScript | Language::TypeScript)
    }
}

fn rule(name: &'static str, pattern: &str) -> Rule {
    Rule {
        name,
        pattern: Regex::new(pattern).expect("valid denylist pattern"),
        javascript_only: false,
    }
}

fn js_rule(name: &'static str, pattern: &str) -> Rule {
    Rule {
        javascript_only: true,
        ..rule(name, pattern)
    }
}

lazy_static! {
    static ref DENYLIST: Vec<Rule> = vec![
        // dynamic evaluation and function construction
        rule("eval", r"\beval\s*\("),
        rule("Function constructor", r"\bFunction\s*\("),
        rule("constructor chain", r"constructor\s*\.\s*constructor"),
        rule("constructor lookup", r#"\[\s*['"`]constructor['"`]\s*\]"#),
        rule("string timer", r#"\bset(Timeout|Interval)\s*\(\s*['"`]"#),
        // network
        rule("fetch", r"\bfetch\s*\("),
        rule("XMLHttpRequest", r"\bXMLHttpRequest\b"),
        rule("WebSocket", r"\bWebSocket\b"),
        rule("sendBeacon", r"\bsendBeacon\b"),
        // module loading
        js_rule("require", r"\brequire\s*\("),
        js_rule("dynamic import", r"\bimport\s*\("),
        js_rule("static import", r#"(?m)^\s*import\s[^;\n]*\bfrom\s*['"]"#),
        js_rule("importScripts", r"\bimportScripts\b"),
        // host objects
        js_rule("process", r"\bprocess\s*[.\[]"),
        js_rule("globalThis", r"\bglobalThis\b"),
        js_rule("global", r"\bglobal\s*[.\[]"),
        js_rule("window", r"\bwindow\b"),
        js_rule("self", r"\bself\s*[.\[]"),
        js_rule("document", r"\bdocument\b"),
        js_rule("localStorage", r"\blocalStorage\b"),
        js_rule("sessionStorage", r"\bsessionStorage\b"),
        js_rule("indexedDB", r"\bindexedDB\b"),
        rule("child_process", r"\bchild_process\b"),
    ];
}

/// Reject `source` if it matches any denylisted construct for `language` or
/// exceeds `max_bytes`
pub fn check(source: &str, language: Language, max_bytes: usize) -> Result<(), UnsafeSubmission> {
    if source.len() > max_bytes {
        return Err(UnsafeSubmission {
            rule: "size limit".to_string(),
            snippet: format!("{} bytes (limit {})", source.len(), max_bytes),
        });
    }

    for rule in DENYLIST.iter().filter(|r| r.applies_to(language)) {
        if let Some(found) = rule.pattern.find(source) {
            return Err(UnsafeSubmission {
                rule: rule.name.to_string(),
                snippet: found.as_str().trim().to_string(),
            });
        }
    }

    Ok(())
}
