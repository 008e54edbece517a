use anyhow::Result;
use serde::Serialize;

use crate::output::config::{OutputConfig, OutputFormat};
use crate::output::types::{Envelope, Meta};
use crate::output::Emitter;

use super::config;

fn output_config() -> OutputConfig {
    let mut cfg = OutputConfig::from_env();
    if config::json_mode() {
        cfg.format = OutputFormat::Json;
    }
    cfg
}

/// True when stdout is reserved for envelopes and human output must stay off it.
pub fn json_output() -> bool {
    output_config().format == OutputFormat::Json
}

fn emitter() -> Emitter {
    Emitter::from_config(output_config())
}

pub fn print_plan<T: Serialize>(op: &'static str, plan: &T, meta: Option<Meta>) -> Result<()> {
    let env = Envelope::plan(op, plan, meta)?;
    emitter().emit(&env)?;
    Ok(())
}

pub fn print_result<T: Serialize>(op: &'static str, result: &T, meta: Option<Meta>) -> Result<()> {
    let env = Envelope::result(op, result, meta)?;
    emitter().emit(&env)?;
    Ok(())
}
