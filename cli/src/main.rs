mod commands;
mod terminal;

use commands::{CommandLine, Commands, edit, list, test};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command_line = CommandLine::parse_args();

    logging::init(command_line.verbose);

    match command_line.command {
        Commands::Test {
            file,
            mode,
            devices,
            concurrency,
        } => test::run(file, mode, devices, concurrency).await,
        Commands::List { file } => list::run(&file),
        Commands::Add { file, entry } => edit::add(&file, entry),
        Commands::Remove { file, names } => edit::remove(&file, &names),
    }
}
