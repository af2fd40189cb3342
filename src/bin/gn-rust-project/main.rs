use gn_rust_project::util::{GlobalContext, Shell};

mod cli;

fn main() {
    setup_logger();

    let mut gctx = match GlobalContext::default() {
        Ok(gctx) => gctx,
        Err(e) => {
            let mut shell = Shell::new();
            gn_rust_project::exit_with_error(e.into(), &mut shell)
        }
    };

    let result = cli::main(&mut gctx);
    if let Err(e) = result {
        gn_rust_project::exit_with_error(e, &mut gctx.shell())
    }
}

fn setup_logger() {
    let env = tracing_subscriber::EnvFilter::from_env("GN_RUST_PROJECT_LOG");

    tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::Uptime::default())
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .with_writer(std::io::stderr)
        .with_env_filter(env)
        .init();
}
