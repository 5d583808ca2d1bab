mod cli;
mod commands;

use cli::{CheckParams, TargetsParams, TranspileParams, TypesParams, build_cli};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("transpile", m)) => {
            let params = TranspileParams::from_matches(m);
            commands::transpile::run(params.into());
        }
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("types", m)) => {
            let params = TypesParams::from_matches(m);
            commands::types::run(params.into());
        }
        Some(("targets", m)) => {
            let params = TargetsParams::from_matches(m);
            commands::targets::run(params.color.should_colorize());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
