//! Command line driver for the wcc compiler.
//!
//! Reads a source file, runs the core pipeline, writes the WASM module
//! and the JS/HTML host scaffolding next to it, and can optionally run
//! the module in-process with the bundled `libc` host functions.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use wcc_core::preprocessor::Preprocessor;
use wcc_core::stdlib::Stdlib;
use wcc_core::{compile_wasm, compile_wasm_with, CompilationArtifact, CompileError};

const INDEX_HTML: &str = include_str!("../templates/index.html");
const BROWSER_JS: &str = include_str!("../templates/browser.js");
const SERVER_JS: &str = include_str!("../templates/server.js");

#[derive(Parser, Debug)]
#[command(name = "wcc", about = "Compiles wcc source files to WebAssembly")]
struct Cli {
    /// Source file to compile
    input: Option<String>,

    #[arg(
        short,
        long,
        default_value = "output.wasm",
        help = "Name/path of the output binary"
    )]
    output: String,

    #[arg(
        short = 's',
        long = "server",
        help = "Generate the server-targeted JS loader instead of the browser one"
    )]
    server: bool,

    #[arg(
        long,
        value_name = "PATH",
        help = "Path to a standard library root (defaults to the bundled headers)"
    )]
    stdlib: Option<String>,

    #[arg(long, help = "Run the compiled module and print what main() returned")]
    run: bool,

    #[arg(short = 'v', long = "version", help = "Print the version and exit")]
    version: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = execute(cli) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<()> {
    if cli.version {
        println!("wcc {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let input = cli.input.as_deref().context("missing input file")?;
    let source =
        fs::read_to_string(input).with_context(|| format!("could not read source file {input}"))?;

    let artifact = compile(&cli, &source)?;

    write_output(&cli.output, &artifact.wasm)?;
    write_host_files(&cli)?;

    if cli.run {
        let result = run_wasm(&artifact)?;
        println!("main() returned {result}");
    }

    Ok(())
}

fn compile(cli: &Cli, source: &str) -> Result<CompilationArtifact> {
    let result = match &cli.stdlib {
        Some(root) => {
            let stdlib = Stdlib::from_root(root)
                .with_context(|| format!("could not load stdlib root {root}"))?;
            compile_wasm_with(Preprocessor::with_stdlib(stdlib), source)
        }
        None => compile_wasm(source),
    };

    match result {
        Ok(artifact) => Ok(artifact),
        Err(CompileError::Parse(errors)) => {
            let mut rendered = String::from("errors encountered while compiling:");
            for error in &errors {
                rendered.push_str(&format!("\n  {error}"));
            }
            anyhow::bail!(rendered)
        }
        Err(err) => Err(err.into()),
    }
}

fn write_output(path: &str, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = PathBuf::from(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("failed to write output file {path}"))?;
    Ok(())
}

/// Writes the JS loader (and for browser targets the HTML page) next to
/// the output binary.
fn write_host_files(cli: &Cli) -> Result<()> {
    let output = PathBuf::from(&cli.output);
    let dir = output.parent().map(Path::to_path_buf).unwrap_or_default();
    let binary_name = output
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| cli.output.clone());

    let template = if cli.server { SERVER_JS } else { BROWSER_JS };
    let js = template.replace("{{binary}}", &binary_name);
    let js_path = dir.join("index.js");
    fs::write(&js_path, js).with_context(|| format!("failed to write {js_path:?}"))?;

    if !cli.server {
        let html_path = dir.join("index.html");
        fs::write(&html_path, INDEX_HTML)
            .with_context(|| format!("failed to write {html_path:?}"))?;
    }

    Ok(())
}

/// Instantiates the module with the bundled `libc` host functions and
/// invokes `main`, rendering its return value.
fn run_wasm(artifact: &CompilationArtifact) -> Result<String> {
    let engine = wasmi::Engine::default();
    let module =
        wasmi::Module::new(&engine, &artifact.wasm).context("failed to compile wasm artifact")?;
    let mut linker = wasmi::Linker::new(&engine);
    link_libc(&mut linker, artifact)?;
    let mut store = wasmi::Store::new(&engine, ());
    let instance = linker
        .instantiate(&mut store, &module)
        .context("failed to instantiate module")?
        .start(&mut store)
        .context("failed to instantiate module")?;

    if let Ok(main) = instance.get_typed_func::<(), i32>(&store, "main") {
        let value = main.call(&mut store, ()).context("failed to execute main")?;
        return Ok(value.to_string());
    }
    let main = instance
        .get_typed_func::<(), f32>(&store, "main")
        .context("exported main function missing or has an unsupported type")?;
    let value = main.call(&mut store, ()).context("failed to execute main")?;
    Ok(value.to_string())
}

/// Host implementations of the bundled stdlib externs.
fn link_libc(linker: &mut wasmi::Linker<()>, artifact: &CompilationArtifact) -> Result<()> {
    for external in &artifact.externals {
        let name = external.name.as_str();
        let linked = match name {
            "putchar" => linker.func_wrap("libc", "putchar", |c: i32| {
                print!("{}", (c as u8) as char);
            }),
            "fabsf" => linker.func_wrap("libc", "fabsf", |x: f32| -> f32 { x.abs() }),
            "fmodf" => linker.func_wrap("libc", "fmodf", |x: f32, y: f32| -> f32 { x % y }),
            "remainderf" => {
                linker.func_wrap("libc", "remainderf", |x: f32, y: f32| -> f32 { x % y })
            }
            "expf" => linker.func_wrap("libc", "expf", |x: f32| -> f32 { x.exp() }),
            "exp2f" => linker.func_wrap("libc", "exp2f", |x: f32| -> f32 { x.exp2() }),
            "expm1f" => linker.func_wrap("libc", "expm1f", |x: f32| -> f32 { x.exp_m1() }),
            "logf" => linker.func_wrap("libc", "logf", |x: f32| -> f32 { x.ln() }),
            "log10f" => linker.func_wrap("libc", "log10f", |x: f32| -> f32 { x.log10() }),
            "log2f" => linker.func_wrap("libc", "log2f", |x: f32| -> f32 { x.log2() }),
            "log1pf" => linker.func_wrap("libc", "log1pf", |x: f32| -> f32 { x.ln_1p() }),
            other => anyhow::bail!("no host implementation for external function '{other}'"),
        };
        linked.with_context(|| format!("failed to link external function {name}"))?;
    }
    Ok(())
}
