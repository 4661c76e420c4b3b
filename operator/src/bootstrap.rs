use log::info;
use operator::{
    config::{AppConfig, Flow},
    flows,
};
use operator_sdk::{Client, ConfigBuilder};

fn load_config() -> anyhow::Result<AppConfig> {
    dotenv::dotenv()
        .map_err(|err| {
            eprintln!(".env file error: {}", err);
            err
        })
        .ok();

    AppConfig::fetch()
}

pub async fn bootstrap() -> anyhow::Result<()> {
    let app_config = load_config()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(app_config.log_config.log_level.as_str()),
    )
    .init();

    let sdk_config = ConfigBuilder::default().from_env().build()?;
    info!(
        "operator {} on chain {} via {}",
        sdk_config.wallet_private_key, sdk_config.chain_id, sdk_config.rpc_url
    );
    let client = Client::new(sdk_config.clone()).await?;

    let flow = &app_config.flow_config;
    let receipt = match flow.flow {
        Flow::ReportMissedSleep => {
            let receipt = flows::report_missed_sleep(&client, &sdk_config, flow).await?;
            println!("Transaction sent. Hash: {}", receipt.tx_hash);
            receipt
        }
        Flow::Nominate => {
            let (request_id, receipt) = flows::nominate(&client, flow).await?;
            println!("Decision request: {request_id}");
            println!("Nomination sent. Hash: {}", receipt.tx_hash);
            receipt
        }
    };

    if flow.wait_for_receipt {
        flows::confirm(&client, &receipt).await?;
    }

    Ok(())
}
