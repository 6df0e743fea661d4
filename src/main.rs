use clap::Parser;
use querygate::cli::{
    classify, gateways, handle_completions, handle_config_init, query, Cli, Commands,
    ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => querygate::cli::serve::run_serve(args).await,
        Commands::Query(args) => {
            query::init_stderr_tracing();
            query::handle_query(&args).await.map(|output| println!("{}", output))
        }
        Commands::Classify(args) => {
            classify::handle_classify(&args).map(|output| println!("{}", output))
        }
        Commands::Gateways(args) => {
            query::init_stderr_tracing();
            gateways::handle_gateways(&args)
                .await
                .map(|output| println!("{}", output))
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        if let Some(failed) = e.downcast_ref::<query::QueryFailed>() {
            println!("{}", failed.output);
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
