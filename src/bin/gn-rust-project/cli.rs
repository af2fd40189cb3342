use std::path::PathBuf;

use anyhow::Context as _;
use clap::builder::{PathBufValueParser, Styles};
use clap::{Arg, ArgAction, ArgMatches, Command};
use gn_rust_project::core::BuildGraph;
use gn_rust_project::ops::{self, RustProjectOptions};
use gn_rust_project::util::style;
use gn_rust_project::util::{CliResult, GlobalContext};

pub fn main(gctx: &mut GlobalContext) -> CliResult {
    let args = cli().try_get_matches()?;

    let verbose = args.get_flag("verbose");
    let quiet = args.get_flag("quiet");
    let color = args.get_one::<String>("color").map(String::as_str);
    let config = args.get_one::<PathBuf>("config").cloned();
    gctx.configure(verbose, quiet, color, config)?;

    exec(gctx, &args)
}

fn exec(gctx: &GlobalContext, args: &ArgMatches) -> CliResult {
    let Some(graph_path) = args.get_one::<PathBuf>("graph") else {
        return Err(anyhow::format_err!("no build graph given").into());
    };
    let graph_path = gctx.cwd().join(graph_path);
    let graph = BuildGraph::load(&graph_path)?;
    gctx.shell().verbose(|shell| {
        shell.status(
            "Loaded",
            format!(
                "{} ({} targets)",
                graph_path.display(),
                graph.resolved_targets().count()
            ),
        )
    })?;

    let options = RustProjectOptions {
        output: args.get_one::<String>("output").cloned(),
        root: args.get_one::<PathBuf>("root").cloned(),
        build_dir: args.get_one::<String>("build-dir").cloned(),
    };
    let outcome = ops::write_rust_project(gctx, &graph, &options)
        .with_context(|| format!("failed to generate rust-project for `{}`", graph_path.display()))?;

    let status = if outcome.changed { "Generated" } else { "Fresh" };
    gctx.shell().status(
        status,
        format!("{} ({} crates)", outcome.path.display(), outcome.crates),
    )?;
    Ok(())
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help).action(ArgAction::Set)
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .action(ArgAction::SetTrue)
}

pub fn cli() -> Command {
    let styles = Styles::styled()
        .header(style::HEADER)
        .usage(style::USAGE)
        .literal(style::LITERAL)
        .placeholder(style::PLACEHOLDER)
        .error(style::ERROR)
        .valid(style::GOOD)
        .invalid(style::WARN);

    Command::new("gn-rust-project")
        .about("Generate rust-project.json from a resolved GN build graph")
        .version(env!("CARGO_PKG_VERSION"))
        .styles(styles)
        .arg(
            Arg::new("graph")
                .value_name("GRAPH")
                .help("Path to the build graph snapshot (JSON)")
                .required(true)
                .value_parser(PathBufValueParser::new()),
        )
        .arg(
            opt("output", "Output file, relative to the build directory")
                .short('o')
                .value_name("FILE"),
        )
        .arg(
            opt("root", "Absolute path of the source root")
                .value_name("DIR")
                .value_parser(PathBufValueParser::new()),
        )
        .arg(opt("build-dir", "Build directory, as a `//`-path").value_name("DIR"))
        .arg(
            opt("config", "Read settings from this config file")
                .value_name("PATH")
                .value_parser(PathBufValueParser::new()),
        )
        .arg(flag("verbose", "Use verbose output").short('v'))
        .arg(flag("quiet", "Do not print status messages").short('q'))
        .arg(
            opt("color", "Coloring")
                .value_name("WHEN")
                .value_parser(["auto", "always", "never"]),
        )
        .after_help(
            "Settings not given on the command line are read from GN_RUST_PROJECT_* \
             environment variables, then from gn-rust-project.toml.\n",
        )
}

#[test]
fn verify_cli() {
    cli().debug_assert();
}
