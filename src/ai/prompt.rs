//! Reusable prompts sent to the model on top of the system
//! instruction.

/// Prefix for the bug report request. The code is appended verbatim
/// after a blank line.
const BUG_REPORT_PROMPT: &str =
    "Analyze the following {language} code and generate a bug report along with suggestions for improvement:";

/// Build a standalone bug report request for `code`. It doesn't refer
/// back to any earlier reply.
pub fn bug_report_prompt(language: &str, code: &str) -> String {
    format!(
        "{}\n\n{}",
        BUG_REPORT_PROMPT.replace("{language}", language),
        code
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bug_report_prompt() {
        let prompt = bug_report_prompt("Python", "print(1)");
        assert_eq!(
            prompt,
            "Analyze the following Python code and generate a bug report along with suggestions for improvement:\n\nprint(1)"
        );
    }

    #[test]
    fn test_bug_report_prompt_keeps_code_verbatim() {
        let code = "def f(x):\n    return {language} + x\n";
        let prompt = bug_report_prompt("Rust", code);
        assert!(prompt.starts_with("Analyze the following Rust code"));
        assert!(prompt.ends_with(code));
    }
}
