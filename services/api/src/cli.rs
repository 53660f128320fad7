use crate::nearby::{run_nearby, NearbyArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use parkmap::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "parkmap",
    about = "Serve the park search API or explore nearby listings from the command line",
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
    /// Locate a reference point and list the listings around it
    Nearby(NearbyArgs),
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
        Command::Nearby(args) => run_nearby(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["parkmap"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn nearby_accepts_coordinates_and_selection() {
        let cli = Cli::try_parse_from([
            "parkmap", "nearby", "--lat", "35.68", "--lng", "139.76", "--radius-km", "20",
            "--select", "yoyogi",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Nearby(args)) => {
                assert_eq!(args.lat, Some(35.68));
                assert_eq!(args.radius_km, Some(20.0));
                assert_eq!(args.select.as_deref(), Some("yoyogi"));
            }
            other => panic!("expected nearby command, got {other:?}"),
        }
    }

    #[test]
    fn nearby_rejects_half_a_coordinate_and_mixed_inputs() {
        assert!(Cli::try_parse_from(["parkmap", "nearby", "--lat", "35.0"]).is_err());
        assert!(Cli::try_parse_from([
            "parkmap", "nearby", "--lat", "35.0", "--lng", "139.0", "--place", "Ueno"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["parkmap", "nearby", "--lat", "91", "--lng", "0"]).is_err());
    }
}
