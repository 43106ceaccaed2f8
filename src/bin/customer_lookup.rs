use clap::Parser;

use erpsync::config::{load_config, locate_config, CardServiceConfig};
use erpsync::soap::SoapClient;

const CARD_OPERATION: &str = "GetCard";
const CARD_PARAMETER: &str = "CodeTO";

#[derive(Parser)]
#[command(name = "customer-lookup")]
#[command(about = "Print the ERP card of one customer")]
#[command(version)]
struct Args {
    /// External customer identifier
    #[arg(value_name = "CODE")]
    code: String,
}

fn main() {
    let args = Args::parse();
    erpsync::logging::init("warn");

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config: CardServiceConfig = load_config(&locate_config()?)?;

    let client = SoapClient::new(
        &config.wsdl_main,
        &config.login_main,
        &config.password_main,
        &config.namespace_main,
        config.request_timeout(),
    )?;

    let result = client.call(CARD_OPERATION, CARD_PARAMETER, &args.code)?;
    println!("{}", result);
    Ok(())
}
