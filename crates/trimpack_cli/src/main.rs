mod args;
mod types;

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
  time::Instant,
};

use ansi_term::Colour;
use args::{EnhanceArgs, InputArgs, OutputArgs};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use trimpack::{
  analyze_bundle_with, normalize_options, pack_workspace_dependencies, AnalyzeOptions, Bundler,
  DirectoryPackager, EntrySource, StaticArtifactLoader, ValidationResult,
};
use trimpack_fs::OsFileSystem;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Commands {
  #[clap(flatten)]
  input: InputArgs,

  #[clap(flatten)]
  output: OutputArgs,

  #[clap(flatten)]
  enhance: EnhanceArgs,
}

fn init_tracing() {
  let filter = EnvFilter::try_from_env("TRIMPACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(path: Option<&Path>) -> Result<AnalyzeOptions, String> {
  let Some(path) = path else {
    return Ok(AnalyzeOptions::default());
  };
  let source = std::fs::read_to_string(path)
    .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
  serde_json::from_str(&source).map_err(|err| format!("Invalid config {}: {err}", path.display()))
}

fn print_result(result: &ValidationResult, out_dir: &Path) {
  let dim = Colour::White.dimmed();
  let color = Colour::Cyan;

  let left = result.resolved_dependency_files.keys().map(String::len).max().unwrap_or_default();
  for (package, file) in &result.resolved_dependency_files {
    let file = file.strip_prefix(out_dir).unwrap_or(file);
    println!(
      "{}{:left$} {}{}",
      color.paint(package),
      "",
      dim.paint("│ <DIR>/"),
      file.display(),
      left = left - package.len()
    );
  }

  for package in &result.demoted_external_packages {
    println!("{} {} is left external", Colour::Yellow.paint("Demoted:"), package);
  }
  for artifact in &result.invalid_artifacts {
    println!("{} {}", Colour::Yellow.paint("Invalid:"), dim.paint(artifact));
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  init_tracing();

  let args = Commands::parse();
  let InputArgs { entries, main, cwd, platform, config } = args.input;

  let mut raw_options = match load_config(config.as_deref()) {
    Ok(options) => options,
    Err(error) => {
      println!("{} {}", Colour::Red.paint("Error:"), error);
      return ExitCode::FAILURE;
    }
  };
  raw_options.cwd = cwd.or(raw_options.cwd);
  raw_options.platform = platform.map(Into::into).or(raw_options.platform);
  if !args.enhance.external.is_empty() {
    raw_options.external.get_or_insert_with(Vec::new).extend(args.enhance.external);
  }
  if !args.enhance.transpile.is_empty() {
    raw_options.transpile_packages.get_or_insert_with(Vec::new).extend(args.enhance.transpile);
  }
  if args.enhance.dev {
    raw_options.dev = Some(true);
  }

  let Some(main_entry) = main.or_else(|| entries.first().cloned()) else {
    println!("{} No entry given", Colour::Red.paint("Error:"));
    return ExitCode::FAILURE;
  };
  let entries = if entries.is_empty() { vec![main_entry.clone()] } else { entries };
  let entries = entries.into_iter().map(EntrySource::Path).collect::<Vec<_>>();

  let start = Instant::now();
  let options = match normalize_options(raw_options) {
    Ok(options) => options,
    Err(errors) => {
      for error in &*errors {
        println!("{} {:#}", Colour::Red.paint("Error:"), error);
      }
      return ExitCode::FAILURE;
    }
  };
  let out_dir: PathBuf = options.cwd.join(&args.output.out_dir);
  let loader = StaticArtifactLoader::from_options(&options);

  let result = analyze_bundle_with(
    &entries,
    &main_entry,
    &out_dir,
    &options,
    &Bundler::new(),
    &loader,
  )
  .await;
  let result = match result {
    Ok(result) => result,
    Err(errors) => {
      for error in &*errors {
        println!("{} {:#}", Colour::Red.paint("Error:"), error);
      }
      return ExitCode::FAILURE;
    }
  };

  if !args.output.silent {
    print_result(&result, &out_dir);
  }

  if let Some(destination) = args.output.pack_workspace {
    let demoted = result
      .demoted_external_packages
      .iter()
      .filter(|package| result.workspace_map.contains_key(*package))
      .collect::<Vec<_>>();
    let packager = DirectoryPackager::new(OsFileSystem);
    let destination = options.cwd.join(destination);
    match pack_workspace_dependencies(&packager, &demoted, &result.workspace_map, &destination)
      .await
    {
      Ok(packed) => {
        if !args.output.silent {
          for (package, location) in packed {
            println!("{} {} -> {}", Colour::Cyan.paint("Packed:"), package, location.display());
          }
        }
      }
      Err(errors) => {
        for error in &*errors {
          println!("{} {:#}", Colour::Red.paint("Error:"), error);
        }
        return ExitCode::FAILURE;
      }
    }
  }

  let elapsed = format!("{:.2} ms", start.elapsed().as_secs_f64() * 1000.0);
  println!("\n{} Finished in {}", Colour::Green.paint("✔"), Colour::White.bold().paint(elapsed));
  ExitCode::SUCCESS
}
