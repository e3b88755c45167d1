use clap::Parser;
use hog_cli::cli::dispatcher::Dispatcher;
use hog_cli::cli::main_types::Cli;
use hog_cli::display::{print_error, OutputMode};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Output mode is bound once here and threaded through the call chain.
    let output = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let config_path = cli.config_dir.as_ref().map(|dir| dir.join("config.json"));

    let dispatcher = Dispatcher::new(cli.account, cli.project, config_path, output);

    // Sole catch point: print the classified error and exit non-zero.
    if let Err(err) = dispatcher.dispatch(cli.command).await {
        print_error(output, &err);
        std::process::exit(1);
    }
}
