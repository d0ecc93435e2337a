use common::{BalanceOperation, BalanceProvider, BalanceRequest};
use defi_interface::aggregator::DefiAggregator;

#[tokio::main]
async fn main() {
    env_logger::init();

    let rpc_url = std::env::var("RPC_URL").expect("Missing RPC_URL environment variable");
    let wallet = std::env::args()
        .nth(1)
        .expect("Usage: main <wallet-pubkey> [currency]");
    let currency = std::env::args().nth(2);

    let mut aggregator = DefiAggregator::new(&rpc_url);
    if let Err(e) = aggregator.load_prices().await {
        eprintln!("Warning: could not load market prices: {e}");
    }

    let request = BalanceRequest::new(
        wallet.as_str(),
        BalanceProvider::All,
        BalanceOperation::All,
        currency.as_deref(),
    );

    match aggregator.get_balances(&request).await {
        Ok(balances) => aggregator.print_balances(&balances),
        Err(e) => eprintln!("Error fetching balances: {e}"),
    }
}
