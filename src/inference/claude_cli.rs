//! Claude CLI連携モジュール
//!
//! `claude -p <prompt> --output-format text` を同期実行して応答を得る。
//! システム指示はプロンプト先頭に連結する。
//! Windowsでは cmd /c 経由になるため、改行をスペースに置換し `"` をエスケープする。

use chd_mapper_common::{CompletionClient, InferenceError};
use std::process::Command;

pub struct ClaudeCliClient {
    verbose: bool,
}

impl ClaudeCliClient {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl CompletionClient for ClaudeCliClient {
    fn complete(&self, system_instruction: &str, user_prompt: &str) -> Result<String, InferenceError> {
        let prompt = combine_prompt(system_instruction, user_prompt);

        if self.verbose {
            println!("  プロンプト長: {} chars", prompt.len());
        }

        let response = run_claude_cli(&prompt)?;

        if self.verbose {
            let preview: String = response.chars().take(500).collect();
            println!("  レスポンス: {}", preview);
        }

        Ok(response)
    }
}

fn combine_prompt(system_instruction: &str, user_prompt: &str) -> String {
    format!("{}\n\n{}", system_instruction, user_prompt)
}

/// cmd経由で渡せる1行の引数に変換
#[cfg_attr(not(windows), allow(dead_code))]
fn escape_for_cmd(prompt: &str) -> String {
    prompt
        .replace("\r\n", " ")
        .replace('\n', " ")
        .replace('"', "\\\"")
}

fn run_claude_cli(prompt: &str) -> Result<String, InferenceError> {
    // Windowsではcmd /c経由
    #[cfg(windows)]
    let escaped = escape_for_cmd(prompt);
    #[cfg(windows)]
    let output = Command::new("cmd")
        .args(["/c", "claude", "-p", &escaped, "--output-format", "text"])
        .output()
        .map_err(|e| InferenceError::Transport(format!("Claude CLI実行エラー: {}", e)))?;

    #[cfg(not(windows))]
    let output = Command::new("claude")
        .args(["-p", prompt, "--output-format", "text"])
        .output()
        .map_err(|e| InferenceError::Transport(format!("Claude CLI実行エラー: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(InferenceError::Transport(format!(
            "Claude CLI failed (code {:?}): {}",
            output.status.code(),
            stderr
        )));
    }

    let response = String::from_utf8_lossy(&output.stdout).to_string();
    if response.trim().is_empty() {
        return Err(InferenceError::EmptyResponse);
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_prompt() {
        let prompt = combine_prompt("SYSTEM", "USER");
        assert_eq!(prompt, "SYSTEM\n\nUSER");
    }

    #[test]
    fn test_escape_for_cmd_single_line() {
        let prompt = combine_prompt("SYSTEM", "### Report:\r\n\"\"\"Overriding aorta.\"\"\"\nend");
        let escaped = escape_for_cmd(&prompt);
        assert!(!escaped.contains('\n'));
        assert!(!escaped.contains('\r'));
        assert_eq!(
            escaped,
            r#"SYSTEM  ### Report: \"\"\"Overriding aorta.\"\"\" end"#
        );
    }
}
