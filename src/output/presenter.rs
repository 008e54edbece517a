use std::io::{self, Write};

use serde::Serialize;

use super::config::{OutputConfig, OutputFormat};
use super::types::{Body, Envelope};

pub trait Presenter: Send + Sync {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()>;
}

pub struct JsonPresenter {
    pub pretty: bool,
}

impl Presenter for JsonPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, env, self.pretty)?;
        writeln!(w)
    }
}

/// Text mode: commands print their own human output, so only `pretty` shows the body.
pub struct TextPresenter {
    pub pretty: bool,
}

impl Presenter for TextPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        if !self.pretty {
            return Ok(());
        }
        let (label, body) = match &env.body {
            Body::Plan(v) => ("Plan", v),
            Body::Result(v) => ("Result", v),
        };
        writeln!(w, "{label}: {}", env.op)?;
        write_json(w, body, true)?;
        writeln!(w)
    }
}

pub struct Emitter {
    presenter: Box<dyn Presenter>,
}

impl Emitter {
    pub fn from_config(cfg: OutputConfig) -> Self {
        let presenter: Box<dyn Presenter> = match cfg.format {
            OutputFormat::Json => Box::new(JsonPresenter { pretty: cfg.pretty }),
            OutputFormat::Text => Box::new(TextPresenter { pretty: cfg.pretty }),
        };
        Emitter { presenter }
    }

    pub fn emit(&self, env: &Envelope) -> io::Result<()> {
        let mut out = io::stdout();
        self.emit_to(env, &mut out)?;
        out.flush()
    }

    pub fn emit_to(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        self.presenter.emit(env, w)
    }
}

fn write_json<T: Serialize + ?Sized>(w: &mut dyn Write, value: &T, pretty: bool) -> io::Result<()> {
    let written = if pretty {
        serde_json::to_writer_pretty(&mut *w, value)
    } else {
        serde_json::to_writer(&mut *w, value)
    };
    written.map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(cfg: OutputConfig, env: &Envelope) -> String {
        let mut buf: Vec<u8> = Vec::new();
        Emitter::from_config(cfg).emit_to(env, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn json_presenter_writes_one_line() {
        let env = Envelope::result("summarize", &json!({"levels": 1}), None).unwrap();
        let out = render(OutputConfig { format: OutputFormat::Json, pretty: false }, &env);
        assert_eq!(out.lines().count(), 1);
        let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["op"], "summarize");
        assert_eq!(v["result"]["levels"], 1);
    }

    #[test]
    fn compact_text_presenter_stays_quiet() {
        let env = Envelope::plan("chunk", &json!({"chunks": 2}), None).unwrap();
        assert!(render(OutputConfig { format: OutputFormat::Text, pretty: false }, &env).is_empty());
        let pretty = render(OutputConfig { format: OutputFormat::Text, pretty: true }, &env);
        assert!(pretty.starts_with("Plan: chunk"));
    }
}
