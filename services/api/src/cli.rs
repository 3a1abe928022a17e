use crate::demo::{run_demo, run_predict, run_score, DemoArgs, PredictArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Risk Assessment",
    about = "Score small-business loan applications from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score an uploaded CSV file and print the risk summary
    Score(ScoreArgs),
    /// Run the pre-trained classifier over an uploaded CSV file
    Predict(PredictArgs),
    /// Walk through upload, scoring, reporting and history with built-in data
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Predict(args) => run_predict(args),
        Command::Demo(args) => run_demo(args),
    }
}
