//! Align two content streams and extract fields from the bands.
//!
//! Each input is one page content stream dumped from a PDF, either raw or
//! still Flate-compressed.
//!
//! Usage:
//!   align_pair <a> <b> [--fields map.json] [--backoff N] [--ops Tj,TJ]
//!              [--min-len N] [--keep-non-text] [--shape] [--deadline-ms N]
//!              [--json] [--dump]
//!
//! Set `RUST_LOG=debug` to trace resynchronisation points.

use pdf_template_diff::config::{AlignConfig, LengthFilterPolicy, MatchMode};
use pdf_template_diff::decoders::looks_like_zlib;
use pdf_template_diff::document::{DocumentModel, MemoryDocument, PageContent};
use pdf_template_diff::extractors::FieldMap;
use pdf_template_diff::pipeline::PairPipeline;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

const USAGE: &str = "usage: align_pair <a> <b> [--fields map.json] [--backoff N] [--ops Tj,TJ] \
                     [--min-len N] [--keep-non-text] [--shape] [--deadline-ms N] [--json] [--dump]";

struct Options {
    a: PathBuf,
    b: PathBuf,
    fields: Option<PathBuf>,
    config: AlignConfig,
    json: bool,
    dump: bool,
}

fn parse_number(flag: &str, value: Option<&String>) -> Result<usize, String> {
    let value = value.ok_or_else(|| format!("{} needs a value", flag))?;
    value
        .parse()
        .map_err(|_| format!("{} expects a number, got '{}'", flag, value))
}

impl Options {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut inputs = Vec::new();
        let mut fields = None;
        let mut config = AlignConfig::new().with_page(0);
        let mut json = false;
        let mut dump = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--fields" => {
                    i += 1;
                    let path = args.get(i).ok_or("--fields needs a path")?;
                    fields = Some(PathBuf::from(path));
                },
                "--backoff" => {
                    i += 1;
                    config = config.with_backoff(parse_number("--backoff", args.get(i))?);
                },
                "--ops" => {
                    i += 1;
                    let ops = args.get(i).ok_or("--ops needs a comma-separated list")?;
                    config = config.with_operators(ops.split(',').map(str::trim).filter(|s| !s.is_empty()));
                },
                "--min-len" => {
                    i += 1;
                    config = config.with_min_text_len(parse_number("--min-len", args.get(i))?);
                },
                "--deadline-ms" => {
                    i += 1;
                    let ms = parse_number("--deadline-ms", args.get(i))?;
                    config = config.with_scan_deadline(Duration::from_millis(ms as u64));
                },
                "--keep-non-text" => config = config.with_length_filter(LengthFilterPolicy::KeepNonText),
                "--shape" => config = config.with_match_mode(MatchMode::Shape),
                "--json" => json = true,
                "--dump" => dump = true,
                "--help" | "-h" => return Err(USAGE.to_string()),
                flag if flag.starts_with("--") => return Err(format!("unknown option {}\n{}", flag, USAGE)),
                path => inputs.push(PathBuf::from(path)),
            }
            i += 1;
        }

        let mut inputs = inputs.into_iter();
        match (inputs.next(), inputs.next(), inputs.next()) {
            (Some(a), Some(b), None) => Ok(Self {
                a,
                b,
                fields,
                config,
                json,
                dump,
            }),
            _ => Err(USAGE.to_string()),
        }
    }
}

/// One-page document over a dumped content stream.
fn load_stream(path: &Path) -> Result<MemoryDocument, String> {
    let data = std::fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let filters = if looks_like_zlib(&data) {
        vec!["FlateDecode".to_string()]
    } else {
        Vec::new()
    };
    let mut doc = MemoryDocument::new();
    let id = doc.add_stream(data, filters);
    doc.add_page(vec![id]);
    Ok(doc)
}

fn label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn dump(doc: &dyn DocumentModel, name: &str, options: &Options) -> Result<(), String> {
    let content = PageContent::load(doc, 0).map_err(|e| format!("{}: {}", name, e))?;
    println!("== {} ==", name);
    for inv in content.invocations(&options.config.extractor_config()) {
        println!("{:>5}: {}", inv.index, inv.render());
    }
    Ok(())
}

fn run(options: &Options) -> Result<(), String> {
    let doc_a = load_stream(&options.a)?;
    let doc_b = load_stream(&options.b)?;
    let (name_a, name_b) = (label(&options.a), label(&options.b));

    if options.dump {
        dump(&doc_a, &name_a, options)?;
        dump(&doc_b, &name_b, options)?;
    }

    let fields = match &options.fields {
        Some(path) => FieldMap::from_path(path).map_err(|e| e.to_string())?,
        None => FieldMap::new(),
    };

    let pipeline = PairPipeline::new(options.config.clone()).with_fields(fields);
    let report = pipeline.run(&doc_a, &doc_b).map_err(|e| e.to_string())?;

    if options.json {
        let output = report.fields_json(true).map_err(|e| e.to_string())?;
        let alignment = serde_json::to_value(&report.alignment).map_err(|e| e.to_string())?;
        let mut root = serde_json::Map::new();
        root.insert("alignment".to_string(), alignment);
        root.insert("fields".to_string(), output);
        let text = serde_json::to_string_pretty(&root).map_err(|e| e.to_string())?;
        println!("{}", text);
        return Ok(());
    }

    print!("{}", report.render_alignment(&name_a, &name_b));
    if options.fields.is_some() {
        for (side, fields) in [(&name_a, &report.fields_a), (&name_b, &report.fields_b)] {
            println!("fields {}:", side);
            for (field, output) in fields {
                println!("  {} = {:?} [{}]", field, output.value, output.source);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let options = match Options::from_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        },
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        },
    }
}
