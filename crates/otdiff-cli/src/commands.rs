use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use tracing::debug;

use otdiff_compose::{ComposedOp, Edit, EditAction, SequenceAdapter, TextUnicode};
use otdiff_core::{
    apply_flat, compute_diff, DiffConfig, DiffOptions, Encoding, FlatOp, SimilarCharDiff,
};
use otdiff_types::{json_equal, Value};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let (before, after) = read_documents(&cli.before, &cli.after)?;
    let config = diff_config(&cli);
    debug!(?config, encoding = ?cli.encoding, "diffing");
    let engine = config.char_diff();

    let rendered = match cli.encoding {
        EncodingKind::Flat => {
            let options = with_engine(DiffOptions::flat(), engine.as_ref());
            let ops = compute_diff(&before, &after, &options)?;
            if cli.verify {
                verify(&after, &apply_flat(&before, &ops)?)?;
            }
            render_flat(&ops, cli.format)?
        }
        EncodingKind::Composed => {
            let options = with_engine(
                DiffOptions::composed(SequenceAdapter, TextUnicode),
                engine.as_ref(),
            );
            let op = compute_diff(&before, &after, &options)?;
            if cli.verify {
                verify(&after, &otdiff_compose::apply(&before, &op)?)?;
            }
            render_composed(&op, cli.format)?
        }
    };
    println!("{rendered}");
    Ok(())
}

fn diff_config(cli: &Cli) -> DiffConfig {
    let mut config = if cli.no_strings {
        DiffConfig::whole_values()
    } else {
        DiffConfig::default()
    };
    config.char_diff.algorithm = cli.algorithm.into();
    config
}

fn with_engine<'a, E: Encoding>(
    options: DiffOptions<'static, E>,
    engine: Option<&'a SimilarCharDiff>,
) -> DiffOptions<'a, E> {
    match engine {
        Some(engine) => options.with_char_diff(engine),
        None => options,
    }
}

fn read_documents(before: &Path, after: &Path) -> anyhow::Result<(Value, Value)> {
    if is_stdin(before) && is_stdin(after) {
        bail!("only one document can be read from stdin");
    }
    Ok((read_document(before)?, read_document(after)?))
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_document(path: &Path) -> anyhow::Result<Value> {
    let text = if is_stdin(path) {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        text
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn verify(after: &Value, replayed: &Value) -> anyhow::Result<()> {
    if !json_equal(after, replayed) {
        bail!("verification failed: the operations do not reproduce the target document");
    }
    eprintln!("{} Operations reproduce the target document", "✓".green().bold());
    Ok(())
}

fn render_flat(ops: &[FlatOp], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(ops)?),
        OutputFormat::Text if ops.is_empty() => Ok("No changes.".to_string()),
        OutputFormat::Text => Ok(ops.iter().map(flat_line).collect::<Vec<_>>().join("\n")),
    }
}

fn render_composed(op: &ComposedOp, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(op)?),
        OutputFormat::Text if op.is_empty() => Ok("No changes.".to_string()),
        OutputFormat::Text => Ok(op.edits().iter().map(edit_line).collect::<Vec<_>>().join("\n")),
    }
}

fn flat_line(op: &FlatOp) -> String {
    let mut line = op.p.to_string().bold().to_string();
    let fields = [
        ("od", op.od.as_ref().map(Value::to_string)),
        ("ld", op.ld.as_ref().map(Value::to_string)),
        ("sd", op.sd.as_ref().map(|s| format!("{s:?}"))),
    ];
    for (name, payload) in fields {
        if let Some(payload) = payload {
            line.push_str(&format!(" {} {}", name.red(), payload));
        }
    }
    let fields = [
        ("oi", op.oi.as_ref().map(Value::to_string)),
        ("li", op.li.as_ref().map(Value::to_string)),
        ("si", op.si.as_ref().map(|s| format!("{s:?}"))),
    ];
    for (name, payload) in fields {
        if let Some(payload) = payload {
            line.push_str(&format!(" {} {}", name.green(), payload));
        }
    }
    line
}

fn edit_line(edit: &Edit) -> String {
    let path = edit.p.to_string().bold();
    match &edit.action {
        EditAction::Insert(value) => format!("{path} {} {value}", "insert".green()),
        EditAction::Remove(value) => format!("{path} {} {value}", "remove".red()),
        EditAction::Replace { old, new } => {
            format!("{path} {} {old} -> {new}", "replace".yellow())
        }
        EditAction::Text { edit_type, payload } => {
            format!("{path} {} {payload}", edit_type.as_str().cyan())
        }
    }
}
