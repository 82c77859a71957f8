use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use albumshuffle::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the backend server
    Serve,

    /// Log in with Spotify through the browser
    Login,

    /// End the session and forget the local queue
    Logout,

    /// Step through the shuffled albums
    Player(PlayerOptions),

    /// Print the current access token
    Token(TokenOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct PlayerOptions {
    #[command(subcommand)]
    pub command: Option<PlayerSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PlayerSubcommand {
    /// Show the current album and the ones after it (default)
    Show(ShowOpts),

    /// Move to the next album
    Next,

    /// Move to the previous album
    Prev,

    /// Fetch the library again and reshuffle
    Reload,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowOpts {
    /// Number of albums to list
    #[clap(long, short, default_value_t = cli::DEFAULT_WINDOW)]
    pub count: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct TokenOptions {
    /// Keep refreshing until Ctrl-C
    #[clap(long)]
    pub watch: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve().await,
        Command::Login => cli::login().await,
        Command::Logout => cli::logout().await,
        Command::Player(opt) => match opt.command {
            Some(PlayerSubcommand::Show(s)) => cli::show(s.count).await,
            Some(PlayerSubcommand::Next) => cli::next().await,
            Some(PlayerSubcommand::Prev) => cli::prev().await,
            Some(PlayerSubcommand::Reload) => cli::reload().await,
            None => cli::show(cli::DEFAULT_WINDOW).await,
        },
        Command::Token(opt) => cli::token(opt.watch).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
