use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref BEGIN_ENVIRONMENT_REGEX: Regex = Regex::new(r"\\begin\{([^}]+)\}").unwrap();
    static ref END_ENVIRONMENT_REGEX: Regex = Regex::new(r"\\end\{([^}]+)\}").unwrap();
    static ref EMPTY_SQRT_REGEX: Regex = Regex::new(r"\\sqrt\{\s*\}").unwrap();
}

fn count_environments(regex: &Regex, text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for captures in regex.captures_iter(text) {
        *counts.entry(captures[1].to_owned()).or_insert(0) += 1;
    }
    counts
}

/// Cheap LaTeX sanity checks on authored question text.
/// Returns one human readable finding per problem.
pub fn check(text: &str) -> Vec<String> {
    let mut findings = Vec::new();

    let mut dollars = 0;
    let mut depth: i64 = 0;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            // Escaped characters never count
            '\\' => {
                chars.next();
            }
            '$' => dollars += 1,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    findings.push("unmatched closing brace".to_owned());
                    depth = 0;
                }
            }
            _ => (),
        }
    }

    if dollars % 2 != 0 {
        findings.push("unmatched $ delimiter".to_owned());
    }
    if depth > 0 {
        findings.push(format!("{} unclosed brace(s)", depth));
    }

    let begins = count_environments(&BEGIN_ENVIRONMENT_REGEX, text);
    let ends = count_environments(&END_ENVIRONMENT_REGEX, text);
    for environment in begins.keys().chain(ends.keys()).unique().sorted() {
        let opened = begins.get(environment).copied().unwrap_or(0);
        let closed = ends.get(environment).copied().unwrap_or(0);
        if opened != closed {
            findings.push(format!(
                "environment `{}` opened {} time(s) but closed {} time(s)",
                environment, opened, closed
            ));
        }
    }

    if EMPTY_SQRT_REGEX.is_match(text) {
        findings.push(r"empty \sqrt{}".to_owned());
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_text() {
        let text = r"Compute $\frac{a}{b}$ where \begin{center}x\end{center} costs \$5.";
        assert!(check(text).is_empty());
    }

    #[test]
    fn flags_unmatched_dollars() {
        assert_eq!(check("Solve $x + 1 = 2"), vec!["unmatched $ delimiter"]);
    }

    #[test]
    fn flags_braces() {
        assert_eq!(check(r"\textbf{bold"), vec!["1 unclosed brace(s)"]);
        assert_eq!(check("oops}"), vec!["unmatched closing brace"]);
        assert!(check(r"literal \{ brace").is_empty());
    }

    #[test]
    fn flags_unbalanced_environments() {
        let findings = check(r"\begin{tabular}{cc} a & b \\ \begin{center}\end{center}");
        assert_eq!(
            findings,
            vec!["environment `tabular` opened 1 time(s) but closed 0 time(s)"]
        );
    }

    #[test]
    fn flags_empty_square_root() {
        assert_eq!(check(r"$\sqrt{}$"), vec![r"empty \sqrt{}"]);
    }
}
