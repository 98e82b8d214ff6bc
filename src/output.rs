//! Human vs machine output for the CLI

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

/// Success envelope printed in JSON mode
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    pub status: &'static str,
    pub command: &'a str,
    pub data: T,
}

pub fn envelope<T: Serialize>(command: &str, data: T) -> anyhow::Result<String> {
    let body = Envelope { status: "ok", command, data };
    Ok(serde_json::to_string_pretty(&body)?)
}

/// Print `data` wrapped in the success envelope. No-op in human mode.
pub fn emit_success<T: Serialize>(mode: OutputMode, command: &str, data: T) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        println!("{}", envelope(command, data)?);
    }
    Ok(())
}
