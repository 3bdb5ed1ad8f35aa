//! `mx tokens`

use crate::config::config;
use crate::error::CliError;
use clap::{Args, ValueEnum};
use mx_config::OptionStyleConfig;
use mx_core::options::{OptionStyle, Options, Token, TokenKind};
use mx_core::printf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StyleArg {
    Unix,
    Dos,
    Both,
}

impl From<StyleArg> for OptionStyleConfig {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Unix => OptionStyleConfig::Unix,
            StyleArg::Dos => OptionStyleConfig::Dos,
            StyleArg::Both => OptionStyleConfig::Both,
        }
    }
}

#[derive(Debug, Args)]
pub struct TokensArgs {
    /// Syntax to recognize (default from config)
    #[arg(long, value_enum)]
    pub style: Option<StyleArg>,

    /// Arguments to tokenize; put them after `--`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// One output line per token
pub fn render(token: &Token<'_>) -> String {
    match token.kind {
        TokenKind::Positional => format!("positional {}", token.value),
        TokenKind::Short => format!("short      {}", token.key),
        TokenKind::Long => format!("long       {}", token.key),
        TokenKind::Pair => format!("pair       {} = {}", token.key, token.value),
        TokenKind::Dash => "dash".to_string(),
        TokenKind::DoubleDash => "double-dash".to_string(),
    }
}

pub fn run(args: &TokensArgs) -> Result<(), CliError> {
    let style: OptionStyle = match args.style {
        Some(arg) => OptionStyleConfig::from(arg).into(),
        None => config().option_style.into(),
    };
    for token in Options::new(args.args.as_slice(), style) {
        printf!(mx_core::stdout(), "{}\n", render(&token));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lines() {
        let args = ["-xv", "--out=a", "/in:b", "file"];
        let lines: Vec<String> = Options::new(&args, OptionStyle::all())
            .map(|t| render(&t))
            .collect();
        assert_eq!(
            lines,
            vec![
                "short      xv",
                "pair       out = a",
                "pair       in = b",
                "positional file",
            ]
        );
    }
}
