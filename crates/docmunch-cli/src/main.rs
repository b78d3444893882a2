use clap::Parser;

fn main() -> miette::Result<()> {
    docmunch_cli::Cli::parse().run()
}
