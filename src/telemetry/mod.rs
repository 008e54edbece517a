pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

pub fn chunk() -> LogCtx<ops::chunk::Chunk> { LogCtx::new(config::logs_are_json()) }
pub fn summarize() -> LogCtx<ops::summarize::Summarize> { LogCtx::new(config::logs_are_json()) }
pub fn ask() -> LogCtx<ops::ask::Ask> { LogCtx::new(config::logs_are_json()) }
