use anyhow::Result;
use skillmine_store::RelationStore;

use crate::args::{Cli, Commands};
use crate::handlers;

pub fn run(cli: Cli) -> Result<()> {
    let store = RelationStore::new(&cli.output_dir);

    match cli.command {
        Commands::Extract(args) => handlers::extract::handle(&store, &args),
        Commands::Analyze => handlers::analyze::handle(&store),
        Commands::Classify => handlers::classify::handle(&store),
        Commands::Report => handlers::report::handle(&store),
        Commands::Run(args) => handlers::run::handle(&store, &args),
    }
}
