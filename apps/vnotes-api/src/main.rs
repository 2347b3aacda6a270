use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = vnotes_api::Args::parse();

	vnotes_api::run(args).await
}
